//! Table-store gateway.
//!
//! The gateway is the only component that talks to persistent storage. It
//! assigns ids and timestamps on the server side and hands back raw records;
//! normalization into the site models happens in the resource stores.

mod rest;
mod sqlite;

pub use rest::RestGateway;
pub use sqlite::{init_database, SqliteGateway};

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{NewProject, NewQuoteRequest, QuoteStatus, SiteSettings};

/// Raw `site_settings` row.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SettingsRecord {
    pub id: String,
    pub company_name: String,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub logo: Option<String>,
}

/// Raw `projects` row. `details` is whatever structured value the store holds.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    pub category: String,
    pub location: Option<String>,
    pub year: Option<String>,
    pub description: String,
    pub image: Option<String>,
    pub details: Option<serde_json::Value>,
}

/// Raw `quote_requests` row.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QuoteRequestRecord {
    pub id: String,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: String,
    pub adresse: String,
    pub ville: String,
    pub code_postal: String,
    pub type_projet: String,
    pub surface: String,
    pub budget: Option<String>,
    pub delai: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: String,
}

/// CRUD boundary over the three site tables.
///
/// Lists are ordered by `created_at` descending. Updates of a missing row
/// fail with [`AppError::NotFound`]; deletes of a missing row succeed.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// The singleton settings row, if one exists.
    async fn fetch_settings(&self) -> Result<Option<SettingsRecord>, AppError>;
    async fn insert_settings(&self, settings: &SiteSettings) -> Result<SettingsRecord, AppError>;
    async fn update_settings(
        &self,
        id: &str,
        settings: &SiteSettings,
    ) -> Result<SettingsRecord, AppError>;

    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError>;
    async fn get_project(&self, id: &str) -> Result<Option<ProjectRecord>, AppError>;
    async fn insert_project(&self, project: &NewProject) -> Result<ProjectRecord, AppError>;
    async fn update_project(
        &self,
        id: &str,
        project: &NewProject,
    ) -> Result<ProjectRecord, AppError>;
    async fn delete_project(&self, id: &str) -> Result<(), AppError>;

    async fn list_quote_requests(&self) -> Result<Vec<QuoteRequestRecord>, AppError>;
    async fn get_quote_request(&self, id: &str) -> Result<Option<QuoteRequestRecord>, AppError>;
    async fn insert_quote_request(
        &self,
        request: &NewQuoteRequest,
        status: QuoteStatus,
    ) -> Result<QuoteRequestRecord, AppError>;
    async fn update_quote_request_status(
        &self,
        id: &str,
        status: QuoteStatus,
    ) -> Result<QuoteRequestRecord, AppError>;
}

/// Server-side timestamp with fixed width so that text ordering is time ordering.
pub(crate) fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
