//! Resource stores.
//!
//! Each store owns the in-memory copy of one collection. Loads never fail:
//! a gateway error keeps the previous state (or the local fallback snapshot
//! when nothing was loaded yet). Mutations are write-through: the gateway is
//! called first and memory changes only once it has confirmed.

mod projects;
mod quote_requests;
mod session;
mod settings;

pub use projects::ProjectsStore;
pub use quote_requests::QuoteRequestsStore;
pub use session::SessionStore;
pub use settings::SettingsStore;

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::local::LocalStorage;

/// Loading/loaded bookkeeping shared by the resource stores.
#[derive(Debug)]
struct LoadFlags {
    loading: AtomicBool,
    loaded: AtomicBool,
}

impl LoadFlags {
    /// Stores start in the loading state until their first load completes.
    fn new() -> Self {
        Self {
            loading: AtomicBool::new(true),
            loaded: AtomicBool::new(false),
        }
    }

    fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn has_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    fn mark_loaded(&self) {
        self.loaded.store(true, Ordering::Release);
    }

    fn finish(&self) {
        self.loading.store(false, Ordering::Release);
    }
}

/// Refresh a fallback snapshot. Failures are logged, never surfaced.
///
/// Callers release their collection lock first; the file write can be slow.
async fn cache_snapshot<T>(storage: &LocalStorage, key: &str, value: &T)
where
    T: Serialize + Sync + ?Sized,
{
    if let Err(e) = storage.set_json(key, value).await {
        tracing::warn!("Failed to refresh local snapshot '{}': {}", key, e);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Gateway doubles shared by the store and facade tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::errors::AppError;
    use crate::gateway::{
        init_database, Gateway, ProjectRecord, QuoteRequestRecord, SettingsRecord, SqliteGateway,
    };
    use crate::models::{NewProject, NewQuoteRequest, QuoteStatus, SiteSettings};

    /// A gateway whose every call fails, as when the table service is down.
    pub struct UnreachableGateway;

    fn down() -> AppError {
        AppError::Persistence("connection refused".to_string())
    }

    #[async_trait]
    impl Gateway for UnreachableGateway {
        async fn fetch_settings(&self) -> Result<Option<SettingsRecord>, AppError> {
            Err(down())
        }
        async fn insert_settings(&self, _: &SiteSettings) -> Result<SettingsRecord, AppError> {
            Err(down())
        }
        async fn update_settings(
            &self,
            _: &str,
            _: &SiteSettings,
        ) -> Result<SettingsRecord, AppError> {
            Err(down())
        }
        async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
            Err(down())
        }
        async fn get_project(&self, _: &str) -> Result<Option<ProjectRecord>, AppError> {
            Err(down())
        }
        async fn insert_project(&self, _: &NewProject) -> Result<ProjectRecord, AppError> {
            Err(down())
        }
        async fn update_project(&self, _: &str, _: &NewProject) -> Result<ProjectRecord, AppError> {
            Err(down())
        }
        async fn delete_project(&self, _: &str) -> Result<(), AppError> {
            Err(down())
        }
        async fn list_quote_requests(&self) -> Result<Vec<QuoteRequestRecord>, AppError> {
            Err(down())
        }
        async fn get_quote_request(&self, _: &str) -> Result<Option<QuoteRequestRecord>, AppError> {
            Err(down())
        }
        async fn insert_quote_request(
            &self,
            _: &NewQuoteRequest,
            _: QuoteStatus,
        ) -> Result<QuoteRequestRecord, AppError> {
            Err(down())
        }
        async fn update_quote_request_status(
            &self,
            _: &str,
            _: QuoteStatus,
        ) -> Result<QuoteRequestRecord, AppError> {
            Err(down())
        }
    }

    /// Delegates to `inner`, but the first `failures` settings fetches fail.
    pub struct FlakySettingsGateway {
        inner: Arc<dyn Gateway>,
        failures: AtomicUsize,
    }

    impl FlakySettingsGateway {
        pub fn new(inner: Arc<dyn Gateway>, failures: usize) -> Self {
            Self {
                inner,
                failures: AtomicUsize::new(failures),
            }
        }
    }

    #[async_trait]
    impl Gateway for FlakySettingsGateway {
        async fn fetch_settings(&self) -> Result<Option<SettingsRecord>, AppError> {
            let failing = self
                .failures
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(down());
            }
            self.inner.fetch_settings().await
        }
        async fn insert_settings(&self, s: &SiteSettings) -> Result<SettingsRecord, AppError> {
            self.inner.insert_settings(s).await
        }
        async fn update_settings(
            &self,
            id: &str,
            s: &SiteSettings,
        ) -> Result<SettingsRecord, AppError> {
            self.inner.update_settings(id, s).await
        }
        async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
            self.inner.list_projects().await
        }
        async fn get_project(&self, id: &str) -> Result<Option<ProjectRecord>, AppError> {
            self.inner.get_project(id).await
        }
        async fn insert_project(&self, p: &NewProject) -> Result<ProjectRecord, AppError> {
            self.inner.insert_project(p).await
        }
        async fn update_project(&self, id: &str, p: &NewProject) -> Result<ProjectRecord, AppError> {
            self.inner.update_project(id, p).await
        }
        async fn delete_project(&self, id: &str) -> Result<(), AppError> {
            self.inner.delete_project(id).await
        }
        async fn list_quote_requests(&self) -> Result<Vec<QuoteRequestRecord>, AppError> {
            self.inner.list_quote_requests().await
        }
        async fn get_quote_request(&self, id: &str) -> Result<Option<QuoteRequestRecord>, AppError> {
            self.inner.get_quote_request(id).await
        }
        async fn insert_quote_request(
            &self,
            r: &NewQuoteRequest,
            status: QuoteStatus,
        ) -> Result<QuoteRequestRecord, AppError> {
            self.inner.insert_quote_request(r, status).await
        }
        async fn update_quote_request_status(
            &self,
            id: &str,
            status: QuoteStatus,
        ) -> Result<QuoteRequestRecord, AppError> {
            self.inner.update_quote_request_status(id, status).await
        }
    }

    /// A fresh SQLite gateway in a temporary directory.
    pub async fn sqlite_gateway() -> (Arc<dyn Gateway>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("store.sqlite"))
            .await
            .expect("Failed to init DB");
        (Arc::new(SqliteGateway::new(pool)), temp_dir)
    }
}
