//! The admin context: one facade over the session and resource stores.
//!
//! Built once at startup and handed to every page handler. Reads return owned
//! snapshots; every mutation goes through the owning store.

use std::sync::Arc;

use serde::Serialize;

use crate::errors::AppError;
use crate::gateway::Gateway;
use crate::local::LocalStorage;
use crate::models::{
    NewProject, NewQuoteRequest, Project, QuoteRequest, QuoteStatus, SiteSettings,
    SiteSettingsPatch,
};
use crate::store::{ProjectsStore, QuoteRequestsStore, SessionStore, SettingsStore};

/// Everything a page needs to render, read in one go.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub is_logged_in: bool,
    pub settings: SiteSettings,
    pub projects: Vec<Project>,
    /// Only present for an admin session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_requests: Option<Vec<QuoteRequest>>,
    pub loading: bool,
}

pub struct AdminContext {
    session: SessionStore,
    settings: SettingsStore,
    projects: ProjectsStore,
    quote_requests: QuoteRequestsStore,
}

impl AdminContext {
    /// Build the stores without loading anything; `loading()` is true until `load_all`.
    pub fn new(gateway: Arc<dyn Gateway>, storage: Arc<LocalStorage>) -> Self {
        Self {
            session: SessionStore::new(storage.clone()),
            settings: SettingsStore::new(gateway.clone(), storage.clone()),
            projects: ProjectsStore::new(gateway.clone(), storage.clone()),
            quote_requests: QuoteRequestsStore::new(gateway, storage),
        }
    }

    /// Build the stores and run the initial loads.
    pub async fn init(gateway: Arc<dyn Gateway>, storage: Arc<LocalStorage>) -> Self {
        let context = Self::new(gateway, storage);
        context.load_all().await;
        context
    }

    /// Load the three resources concurrently. Never fails.
    pub async fn load_all(&self) {
        tokio::join!(
            self.settings.load(),
            self.projects.load(),
            self.quote_requests.load()
        );
    }

    // ==================== READ MODEL ====================

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub async fn settings(&self) -> SiteSettings {
        self.settings.current().await
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.projects.all().await
    }

    pub async fn project(&self, id: &str) -> Option<Project> {
        self.projects.get(id).await
    }

    pub async fn quote_requests(&self) -> Vec<QuoteRequest> {
        self.quote_requests.all().await
    }

    /// True while any resource store has not finished its first load.
    pub fn loading(&self) -> bool {
        self.settings.is_loading() || self.projects.is_loading() || self.quote_requests.is_loading()
    }

    /// Read model for pages; quote requests are included only for admins.
    pub async fn snapshot(&self) -> ContextSnapshot {
        let is_logged_in = self.is_logged_in();
        let quote_requests = if is_logged_in {
            Some(self.quote_requests().await)
        } else {
            None
        };

        ContextSnapshot {
            is_logged_in,
            settings: self.settings().await,
            projects: self.projects().await,
            quote_requests,
            loading: self.loading(),
        }
    }

    // ==================== OPERATIONS ====================

    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.session.login(username, password).await
    }

    pub async fn logout(&self) {
        self.session.logout().await;
    }

    pub async fn update_settings(&self, patch: &SiteSettingsPatch) -> Result<SiteSettings, AppError> {
        self.settings.update(patch).await
    }

    pub async fn add_project(&self, project: NewProject) -> Result<Project, AppError> {
        self.projects.add(project).await
    }

    pub async fn update_project(&self, project: Project) -> Result<Project, AppError> {
        self.projects.update(project).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        self.projects.delete(id).await
    }

    pub async fn refresh_projects(&self) {
        self.projects.load().await;
    }

    pub async fn add_quote_request(&self, request: NewQuoteRequest) -> Result<QuoteRequest, AppError> {
        self.quote_requests.add(request).await
    }

    pub async fn update_quote_request_status(
        &self,
        id: &str,
        status: QuoteStatus,
    ) -> Result<QuoteRequest, AppError> {
        self.quote_requests.update_status(id, status).await
    }

    pub async fn refresh_quote_requests(&self) {
        self.quote_requests.load().await;
    }
}
