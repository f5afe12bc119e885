//! Quote request store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::{cache_snapshot, LoadFlags};
use crate::errors::AppError;
use crate::gateway::Gateway;
use crate::local::{keys, LocalStorage};
use crate::models::{NewQuoteRequest, QuoteRequest, QuoteStatus};

/// Owner of the quote request collection, newest first.
pub struct QuoteRequestsStore {
    gateway: Arc<dyn Gateway>,
    storage: Arc<LocalStorage>,
    requests: RwLock<Vec<QuoteRequest>>,
    flags: LoadFlags,
}

impl QuoteRequestsStore {
    pub fn new(gateway: Arc<dyn Gateway>, storage: Arc<LocalStorage>) -> Self {
        Self {
            gateway,
            storage,
            requests: RwLock::new(Vec::new()),
            flags: LoadFlags::new(),
        }
    }

    pub async fn all(&self) -> Vec<QuoteRequest> {
        self.requests.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.flags.is_loading()
    }

    pub async fn load(&self) {
        match self.fetch().await {
            Ok(fetched) => {
                *self.requests.write().await = fetched.clone();
                self.flags.mark_loaded();
                info!("Loaded {} quote requests", fetched.len());
                cache_snapshot(&self.storage, keys::QUOTE_REQUESTS, &fetched).await;
            }
            Err(e) => {
                error!("Error loading quote requests: {}", e);
                if !self.flags.has_loaded() {
                    if let Some(cached) = self
                        .storage
                        .get_json::<Vec<QuoteRequest>>(keys::QUOTE_REQUESTS)
                    {
                        warn!("Using {} locally cached quote requests", cached.len());
                        *self.requests.write().await = cached;
                    }
                }
            }
        }
        self.flags.finish();
    }

    async fn fetch(&self) -> Result<Vec<QuoteRequest>, AppError> {
        let records = self.gateway.list_quote_requests().await?;
        Ok(records
            .into_iter()
            .filter_map(|record| match QuoteRequest::try_from(record) {
                Ok(request) => Some(request),
                Err(e) => {
                    warn!("Skipping quote request row: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Submit a request. It is always stored as pending with a gateway timestamp.
    pub async fn add(&self, request: NewQuoteRequest) -> Result<QuoteRequest, AppError> {
        let record = self
            .gateway
            .insert_quote_request(&request, QuoteStatus::Pending)
            .await
            .inspect_err(|e| error!("Error adding quote request: {}", e))?;
        let created = QuoteRequest::try_from(record)?;

        let snapshot = {
            let mut requests = self.requests.write().await;
            requests.insert(0, created.clone());
            requests.clone()
        };
        cache_snapshot(&self.storage, keys::QUOTE_REQUESTS, &snapshot).await;
        info!("Received quote request {}", created.id);

        Ok(created)
    }

    /// Set the status of a request. Only the status of the in-memory entry changes;
    /// any transition is accepted.
    pub async fn update_status(
        &self,
        id: &str,
        status: QuoteStatus,
    ) -> Result<QuoteRequest, AppError> {
        let record = self
            .gateway
            .update_quote_request_status(id, status)
            .await
            .inspect_err(|e| error!("Error updating quote request status {}: {}", id, e))?;

        let (updated, snapshot) = {
            let mut requests = self.requests.write().await;
            let updated = match requests.iter_mut().find(|r| r.id == id) {
                Some(entry) => {
                    entry.status = status;
                    entry.clone()
                }
                None => QuoteRequest::try_from(record)?,
            };
            (updated, requests.clone())
        };
        cache_snapshot(&self.storage, keys::QUOTE_REQUESTS, &snapshot).await;
        info!("Quote request {} is now {}", id, status.as_str());

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{sqlite_gateway, UnreachableGateway};

    fn new_request(nom: &str) -> NewQuoteRequest {
        NewQuoteRequest {
            nom: nom.to_string(),
            prenom: "Camille".to_string(),
            email: "camille@example.fr".to_string(),
            telephone: "0611223344".to_string(),
            adresse: "5 place du Marché".to_string(),
            ville: "Créteil".to_string(),
            code_postal: "94000".to_string(),
            type_projet: "extension".to_string(),
            surface: "40".to_string(),
            budget: "50k-100k".to_string(),
            delai: "6 mois".to_string(),
            description: "Extension de maison".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_is_pending_and_prepended() {
        let (gateway, _dir) = sqlite_gateway().await;
        let store = QuoteRequestsStore::new(gateway, Arc::new(LocalStorage::in_memory()));
        store.load().await;

        store.add(new_request("Bernard")).await.unwrap();
        let latest = store.add(new_request("Petit")).await.unwrap();

        assert_eq!(latest.status, QuoteStatus::Pending);
        assert!(!latest.date_created.is_empty());
        assert_eq!(latest.budget, "50k-100k");
        assert_eq!(store.all().await[0], latest);
    }

    #[tokio::test]
    async fn test_status_update_changes_only_status() {
        let (gateway, _dir) = sqlite_gateway().await;
        let store = QuoteRequestsStore::new(gateway.clone(), Arc::new(LocalStorage::in_memory()));
        store.load().await;
        let created = store.add(new_request("Bernard")).await.unwrap();

        let updated = store
            .update_status(&created.id, QuoteStatus::Confirmed)
            .await
            .unwrap();

        assert_eq!(
            updated,
            QuoteRequest {
                status: QuoteStatus::Confirmed,
                ..created.clone()
            }
        );
        assert_eq!(store.all().await, vec![updated.clone()]);

        // Any transition is accepted, including going back to pending.
        let reverted = store
            .update_status(&created.id, QuoteStatus::Pending)
            .await
            .unwrap();
        assert_eq!(reverted, created);

        let fresh = QuoteRequestsStore::new(gateway, Arc::new(LocalStorage::in_memory()));
        fresh.load().await;
        assert_eq!(fresh.all().await, vec![created]);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found_and_memory_unchanged() {
        let (gateway, _dir) = sqlite_gateway().await;
        let store = QuoteRequestsStore::new(gateway, Arc::new(LocalStorage::in_memory()));
        store.load().await;
        store.add(new_request("Bernard")).await.unwrap();
        let before = store.all().await;

        let err = store
            .update_status("missing", QuoteStatus::Responded)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.all().await, before);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_loads_empty() {
        let store = QuoteRequestsStore::new(
            Arc::new(UnreachableGateway),
            Arc::new(LocalStorage::in_memory()),
        );
        store.load().await;

        assert!(store.all().await.is_empty());
        assert!(!store.is_loading());

        let err = store.add(new_request("Bernard")).await.unwrap_err();
        assert!(err.is_persistence_failure());
        assert!(store.all().await.is_empty());
    }
}
