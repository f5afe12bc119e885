//! Admin session flag.
//!
//! The credential check is a hardcoded placeholder, not a security boundary:
//! no hashing, no expiry, no rate limiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::constant_time_compare;
use crate::local::{keys, LocalStorage};

/// Placeholder admin username.
pub const ADMIN_USERNAME: &str = "admin";
/// Placeholder admin password.
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct SessionStore {
    storage: Arc<LocalStorage>,
    logged_in: AtomicBool,
}

impl SessionStore {
    /// Restore the flag persisted by a previous session, if any.
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        let persisted = storage.get(keys::ADMIN_LOGGED_IN).as_deref() == Some("true");
        Self {
            storage,
            logged_in: AtomicBool::new(persisted),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::Acquire)
    }

    /// Check the credentials; on success set and persist the flag.
    /// A failed attempt leaves the current flag as it was.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_compare(username, ADMIN_USERNAME);
        let password_ok = constant_time_compare(password, ADMIN_PASSWORD);
        if !(user_ok & password_ok) {
            warn!("Rejected admin login attempt");
            return false;
        }

        self.logged_in.store(true, Ordering::Release);
        if let Err(e) = self.storage.set(keys::ADMIN_LOGGED_IN, "true").await {
            warn!("Could not persist admin session: {}", e);
        }
        info!("Admin logged in");
        true
    }

    pub async fn logout(&self) {
        self.logged_in.store(false, Ordering::Release);
        if let Err(e) = self.storage.remove(keys::ADMIN_LOGGED_IN).await {
            warn!("Could not clear persisted admin session: {}", e);
        }
        info!("Admin logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_login_persists_across_sessions_until_logout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");

        let session = SessionStore::new(Arc::new(LocalStorage::open(&path).await));
        assert!(!session.is_logged_in());
        assert!(session.login("admin", "admin123").await);
        assert!(session.is_logged_in());

        let next_session = SessionStore::new(Arc::new(LocalStorage::open(&path).await));
        assert!(next_session.is_logged_in());

        next_session.logout().await;
        assert!(!next_session.is_logged_in());

        let after_logout = SessionStore::new(Arc::new(LocalStorage::open(&path).await));
        assert!(!after_logout.is_logged_in());
    }

    #[tokio::test]
    async fn test_wrong_credentials_leave_flag_unchanged() {
        let session = SessionStore::new(Arc::new(LocalStorage::in_memory()));

        assert!(!session.login("admin", "wrong").await);
        assert!(!session.login("root", "admin123").await);
        assert!(!session.is_logged_in());

        assert!(session.login("admin", "admin123").await);
        assert!(!session.login("admin", "").await);
        assert!(session.is_logged_in());
    }
}
