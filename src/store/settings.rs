//! Site settings store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::{cache_snapshot, LoadFlags};
use crate::errors::AppError;
use crate::gateway::Gateway;
use crate::local::{keys, LocalStorage};
use crate::models::{SiteSettings, SiteSettingsPatch};

/// Owner of the singleton site settings.
pub struct SettingsStore {
    gateway: Arc<dyn Gateway>,
    storage: Arc<LocalStorage>,
    settings: RwLock<SiteSettings>,
    flags: LoadFlags,
}

impl SettingsStore {
    pub fn new(gateway: Arc<dyn Gateway>, storage: Arc<LocalStorage>) -> Self {
        Self {
            gateway,
            storage,
            settings: RwLock::new(SiteSettings::default()),
            flags: LoadFlags::new(),
        }
    }

    pub async fn current(&self) -> SiteSettings {
        self.settings.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.flags.is_loading()
    }

    /// Fetch the settings row. An empty table keeps the built-in defaults.
    pub async fn load(&self) {
        match self.gateway.fetch_settings().await {
            Ok(Some(record)) => {
                let settings = SiteSettings::from(record);
                *self.settings.write().await = settings.clone();
                self.flags.mark_loaded();
                info!("Loaded site settings");
                cache_snapshot(&self.storage, keys::SITE_SETTINGS, &settings).await;
            }
            Ok(None) => {
                self.flags.mark_loaded();
                info!("No site settings row, using defaults");
            }
            Err(e) => {
                error!("Error loading site settings: {}", e);
                self.restore_snapshot().await;
            }
        }
        self.flags.finish();
    }

    async fn restore_snapshot(&self) {
        if self.flags.has_loaded() {
            return;
        }
        if let Some(cached) = self.storage.get_json::<SiteSettings>(keys::SITE_SETTINGS) {
            warn!("Using locally cached site settings");
            *self.settings.write().await = cached;
        }
    }

    /// Merge `patch` over the current settings and write the full record.
    ///
    /// Memory only changes once the gateway has accepted the merged record.
    /// Without a known row id the existing row is looked up first; a new
    /// singleton row is inserted only when the table is empty.
    pub async fn update(&self, patch: &SiteSettingsPatch) -> Result<SiteSettings, AppError> {
        let base = self
            .with_row_id(self.current().await)
            .await
            .inspect_err(|e| error!("Error resolving site settings row: {}", e))?;
        let merged = base.merged(patch);

        let written = match merged.id.as_deref() {
            Some(id) => self.gateway.update_settings(id, &merged).await,
            None => self.gateway.insert_settings(&merged).await,
        }
        .inspect_err(|e| error!("Error updating site settings: {}", e))?;

        let committed = SiteSettings::from(written);
        *self.settings.write().await = committed.clone();
        info!("Site settings updated");
        cache_snapshot(&self.storage, keys::SITE_SETTINGS, &committed).await;

        Ok(committed)
    }

    /// Settings to merge into: `current` if it knows its row, else the stored row.
    async fn with_row_id(&self, current: SiteSettings) -> Result<SiteSettings, AppError> {
        if current.id.is_some() {
            return Ok(current);
        }
        match self.gateway.fetch_settings().await? {
            Some(record) => {
                warn!("Site settings were not loaded, merging into stored row {}", record.id);
                Ok(SiteSettings::from(record))
            }
            None => Ok(current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{init_database, SqliteGateway};
    use crate::store::test_support::{sqlite_gateway, FlakySettingsGateway, UnreachableGateway};
    use tempfile::TempDir;

    async fn settings_rows(pool: &sqlx::SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM site_settings")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_table_keeps_defaults() {
        let (gateway, _dir) = sqlite_gateway().await;
        let store = SettingsStore::new(gateway, Arc::new(LocalStorage::in_memory()));
        assert!(store.is_loading());

        store.load().await;

        assert!(!store.is_loading());
        assert_eq!(store.current().await, SiteSettings::default());
    }

    #[tokio::test]
    async fn test_update_survives_fresh_load() {
        let (gateway, _dir) = sqlite_gateway().await;
        let store = SettingsStore::new(gateway.clone(), Arc::new(LocalStorage::in_memory()));
        store.load().await;

        let patch = SiteSettingsPatch {
            phone: Some("+33 4 00 00 00 00".to_string()),
            city: Some("Lyon".to_string()),
            ..Default::default()
        };
        let updated = store.update(&patch).await.unwrap();
        assert!(updated.id.is_some());

        let second_patch = SiteSettingsPatch {
            email: Some("devis@ubg.fr".to_string()),
            ..Default::default()
        };
        store.update(&second_patch).await.unwrap();

        let fresh = SettingsStore::new(gateway, Arc::new(LocalStorage::in_memory()));
        fresh.load().await;
        let reloaded = fresh.current().await;

        assert_eq!(reloaded.phone, "+33 4 00 00 00 00");
        assert_eq!(reloaded.city, "Lyon");
        assert_eq!(reloaded.email, "devis@ubg.fr");
        assert_eq!(reloaded.company_name, SiteSettings::default().company_name);
        assert_eq!(reloaded.id, updated.id);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_memory_unchanged() {
        let store = SettingsStore::new(
            Arc::new(UnreachableGateway),
            Arc::new(LocalStorage::in_memory()),
        );
        store.load().await;
        let before = store.current().await;

        let patch = SiteSettingsPatch {
            company_name: Some("Autre".to_string()),
            ..Default::default()
        };
        let err = store.update(&patch).await.unwrap_err();

        assert!(err.is_persistence_failure());
        assert_eq!(store.current().await, before);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_uses_cached_snapshot() {
        let storage = Arc::new(LocalStorage::in_memory());
        let cached = SiteSettings {
            city: "Marseille".to_string(),
            ..SiteSettings::default()
        };
        storage.set_json(keys::SITE_SETTINGS, &cached).await.unwrap();

        let store = SettingsStore::new(Arc::new(UnreachableGateway), storage);
        store.load().await;

        assert!(!store.is_loading());
        assert_eq!(store.current().await.city, "Marseille");
    }

    #[tokio::test]
    async fn test_update_after_failed_load_targets_existing_row() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("settings.sqlite"))
            .await
            .unwrap();
        let sqlite: Arc<dyn Gateway> = Arc::new(SqliteGateway::new(pool.clone()));
        let existing = sqlite
            .insert_settings(&SiteSettings {
                company_name: "Existing".to_string(),
                ..SiteSettings::default()
            })
            .await
            .unwrap();

        let gateway: Arc<dyn Gateway> = Arc::new(FlakySettingsGateway::new(sqlite.clone(), 1));
        let store = SettingsStore::new(gateway, Arc::new(LocalStorage::in_memory()));
        store.load().await;
        assert_eq!(store.current().await.id, None);

        let patch = SiteSettingsPatch {
            city: Some("Lyon".to_string()),
            ..Default::default()
        };
        let updated = store.update(&patch).await.unwrap();

        assert_eq!(updated.id.as_deref(), Some(existing.id.as_str()));
        assert_eq!(updated.company_name, "Existing");
        assert_eq!(settings_rows(&pool).await, 1);

        let fresh = SettingsStore::new(sqlite, Arc::new(LocalStorage::in_memory()));
        fresh.load().await;
        assert_eq!(fresh.current().await, updated);
        assert_eq!(fresh.current().await.city, "Lyon");
    }

    #[tokio::test]
    async fn test_first_update_on_empty_table_inserts_one_row() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("settings.sqlite"))
            .await
            .unwrap();
        let store = SettingsStore::new(
            Arc::new(SqliteGateway::new(pool.clone())),
            Arc::new(LocalStorage::in_memory()),
        );
        store.load().await;

        let patch = SiteSettingsPatch {
            phone: Some("+33 2 00 00 00 00".to_string()),
            ..Default::default()
        };
        store.update(&patch).await.unwrap();
        store.update(&patch).await.unwrap();

        assert_eq!(settings_rows(&pool).await, 1);
    }
}
