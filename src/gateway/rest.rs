//! Hosted table service gateway (PostgREST dialect).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{timestamp_now, Gateway, ProjectRecord, QuoteRequestRecord, SettingsRecord};
use crate::errors::AppError;
use crate::models::{NewProject, NewQuoteRequest, QuoteStatus, SiteSettings};

const SETTINGS_TABLE: &str = "site_settings";
const PROJECTS_TABLE: &str = "projects";
const QUOTE_REQUESTS_TABLE: &str = "quote_requests";

/// Gateway over the REST interface of a hosted table service.
#[derive(Clone)]
pub struct RestGateway {
    client: Client,
    base_url: String,
}

impl RestGateway {
    /// Build a client that authenticates every call with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        let invalid = |_: reqwest::header::InvalidHeaderValue| {
            AppError::BadRequest("Table service key is not a valid header".to_string())
        };

        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(api_key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(invalid)?,
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Send a request and decode the row array it answers with.
    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>, AppError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Persistence(format!(
                "Table service returned {}: {}",
                status, body
            )));
        }

        Ok(response.json::<Vec<T>>().await?)
    }

    fn select_all(&self, table: &str) -> RequestBuilder {
        self.client
            .get(self.table_url(table))
            .query(&[("select", "*"), ("order", "created_at.desc")])
    }

    fn select_by_id(&self, table: &str, id: &str) -> RequestBuilder {
        self.client
            .get(self.table_url(table))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))])
    }

    fn insert(&self, table: &str, body: serde_json::Value) -> RequestBuilder {
        self.client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&body)
    }

    fn update_by_id(&self, table: &str, id: &str, body: serde_json::Value) -> RequestBuilder {
        self.client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&body)
    }
}

/// First row of a write response, or `NotFound` when the filter matched nothing.
fn single<T>(rows: Vec<T>, what: &str, id: &str) -> Result<T, AppError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", what, id)))
}

fn settings_body(settings: &SiteSettings) -> serde_json::Value {
    json!({
        "company_name": settings.company_name,
        "phone": settings.phone,
        "whatsapp": settings.whatsapp,
        "email": settings.email,
        "address": settings.address,
        "city": settings.city,
        "postal_code": settings.postal_code,
        "logo": settings.logo,
    })
}

fn project_body(project: &NewProject) -> serde_json::Value {
    json!({
        "title": project.title,
        "category": project.category.as_str(),
        "location": project.location,
        "year": project.year,
        "description": project.description,
        "image": project.image,
        "details": project.details,
    })
}

fn with_updated_at(mut body: serde_json::Value) -> serde_json::Value {
    body["updated_at"] = json!(timestamp_now());
    body
}

#[async_trait]
impl Gateway for RestGateway {
    async fn fetch_settings(&self) -> Result<Option<SettingsRecord>, AppError> {
        let request = self
            .client
            .get(self.table_url(SETTINGS_TABLE))
            .query(&[("select", "*"), ("order", "created_at.asc"), ("limit", "1")]);
        let rows: Vec<SettingsRecord> = self.rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_settings(&self, settings: &SiteSettings) -> Result<SettingsRecord, AppError> {
        let rows = self
            .rows(self.insert(SETTINGS_TABLE, settings_body(settings)))
            .await?;
        single(rows, "Site settings", "(new)")
    }

    async fn update_settings(
        &self,
        id: &str,
        settings: &SiteSettings,
    ) -> Result<SettingsRecord, AppError> {
        let body = with_updated_at(settings_body(settings));
        let rows = self
            .rows(self.update_by_id(SETTINGS_TABLE, id, body))
            .await?;
        single(rows, "Site settings", id)
    }

    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
        self.rows(self.select_all(PROJECTS_TABLE)).await
    }

    async fn get_project(&self, id: &str) -> Result<Option<ProjectRecord>, AppError> {
        let rows: Vec<ProjectRecord> = self.rows(self.select_by_id(PROJECTS_TABLE, id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_project(&self, project: &NewProject) -> Result<ProjectRecord, AppError> {
        let rows = self
            .rows(self.insert(PROJECTS_TABLE, project_body(project)))
            .await?;
        single(rows, "Project", "(new)")
    }

    async fn update_project(
        &self,
        id: &str,
        project: &NewProject,
    ) -> Result<ProjectRecord, AppError> {
        let body = with_updated_at(project_body(project));
        let rows = self
            .rows(self.update_by_id(PROJECTS_TABLE, id, body))
            .await?;
        single(rows, "Project", id)
    }

    async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        let request = self
            .client
            .delete(self.table_url(PROJECTS_TABLE))
            .query(&[("id", format!("eq.{}", id))]);
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Persistence(format!(
                "Table service returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }

    async fn list_quote_requests(&self) -> Result<Vec<QuoteRequestRecord>, AppError> {
        self.rows(self.select_all(QUOTE_REQUESTS_TABLE)).await
    }

    async fn get_quote_request(&self, id: &str) -> Result<Option<QuoteRequestRecord>, AppError> {
        let rows: Vec<QuoteRequestRecord> = self
            .rows(self.select_by_id(QUOTE_REQUESTS_TABLE, id))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_quote_request(
        &self,
        request: &NewQuoteRequest,
        status: QuoteStatus,
    ) -> Result<QuoteRequestRecord, AppError> {
        let body = json!({
            "nom": request.nom,
            "prenom": request.prenom,
            "email": request.email,
            "telephone": request.telephone,
            "adresse": request.adresse,
            "ville": request.ville,
            "code_postal": request.code_postal,
            "type_projet": request.type_projet,
            "surface": request.surface,
            "budget": request.budget,
            "delai": request.delai,
            "description": request.description,
            "status": status.as_str(),
        });
        let rows = self.rows(self.insert(QUOTE_REQUESTS_TABLE, body)).await?;
        single(rows, "Quote request", "(new)")
    }

    async fn update_quote_request_status(
        &self,
        id: &str,
        status: QuoteStatus,
    ) -> Result<QuoteRequestRecord, AppError> {
        let body = with_updated_at(json!({ "status": status.as_str() }));
        let rows = self
            .rows(self.update_by_id(QUOTE_REQUESTS_TABLE, id, body))
            .await?;
        single(rows, "Quote request", id)
    }
}
