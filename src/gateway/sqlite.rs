//! SQLite-backed table store.
//!
//! Mirrors the hosted table service: ids are UUID v4 strings assigned on
//! insert and every row carries `created_at`/`updated_at` text timestamps.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::{timestamp_now, Gateway, ProjectRecord, QuoteRequestRecord, SettingsRecord};
use crate::errors::AppError;
use crate::models::{NewProject, NewQuoteRequest, QuoteStatus, SiteSettings};

const SETTINGS_COLUMNS: &str =
    "id, company_name, phone, whatsapp, email, address, city, postal_code, logo";
const PROJECT_COLUMNS: &str = "id, title, category, location, year, description, image, details";
const QUOTE_REQUEST_COLUMNS: &str = "id, nom, prenom, email, telephone, adresse, ville, code_postal, type_projet, surface, budget, delai, description, status, created_at";

/// Initialize the database connection pool and create the tables.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS site_settings (
            id TEXT PRIMARY KEY,
            company_name TEXT NOT NULL,
            phone TEXT,
            whatsapp TEXT,
            email TEXT,
            address TEXT,
            city TEXT,
            postal_code TEXT,
            logo TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            location TEXT,
            year TEXT,
            description TEXT NOT NULL,
            image TEXT,
            details TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quote_requests (
            id TEXT PRIMARY KEY,
            nom TEXT NOT NULL,
            prenom TEXT NOT NULL,
            email TEXT NOT NULL,
            telephone TEXT NOT NULL,
            adresse TEXT NOT NULL,
            ville TEXT NOT NULL,
            code_postal TEXT NOT NULL,
            type_projet TEXT NOT NULL,
            surface TEXT NOT NULL,
            budget TEXT,
            delai TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_projects_created_at ON projects(created_at);
        CREATE INDEX IF NOT EXISTS idx_quote_requests_created_at ON quote_requests(created_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Gateway over a local SQLite database.
#[derive(Clone)]
pub struct SqliteGateway {
    pool: SqlitePool,
}

impl SqliteGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Gateway for SqliteGateway {
    // ==================== SETTINGS ====================

    async fn fetch_settings(&self) -> Result<Option<SettingsRecord>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM site_settings ORDER BY created_at, rowid LIMIT 1",
            SETTINGS_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(settings_from_row))
    }

    async fn insert_settings(&self, settings: &SiteSettings) -> Result<SettingsRecord, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp_now();

        sqlx::query(
            "INSERT INTO site_settings (id, company_name, phone, whatsapp, email, address, city, postal_code, logo, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&settings.company_name)
        .bind(&settings.phone)
        .bind(&settings.whatsapp)
        .bind(&settings.email)
        .bind(&settings.address)
        .bind(&settings.city)
        .bind(&settings.postal_code)
        .bind(&settings.logo)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(settings_record(id, settings))
    }

    async fn update_settings(
        &self,
        id: &str,
        settings: &SiteSettings,
    ) -> Result<SettingsRecord, AppError> {
        let result = sqlx::query(
            "UPDATE site_settings SET company_name = ?, phone = ?, whatsapp = ?, email = ?, address = ?, city = ?, postal_code = ?, logo = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&settings.company_name)
        .bind(&settings.phone)
        .bind(&settings.whatsapp)
        .bind(&settings.email)
        .bind(&settings.address)
        .bind(&settings.city)
        .bind(&settings.postal_code)
        .bind(&settings.logo)
        .bind(timestamp_now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Site settings {} not found", id)));
        }

        Ok(settings_record(id.to_string(), settings))
    }

    // ==================== PROJECTS ====================

    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM projects ORDER BY created_at DESC, rowid DESC",
            PROJECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    async fn get_project(&self, id: &str) -> Result<Option<ProjectRecord>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM projects WHERE id = ?", PROJECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(project_from_row))
    }

    async fn insert_project(&self, project: &NewProject) -> Result<ProjectRecord, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp_now();
        let details_json = serde_json::to_string(&project.details)?;

        sqlx::query(
            "INSERT INTO projects (id, title, category, location, year, description, image, details, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&project.title)
        .bind(project.category.as_str())
        .bind(&project.location)
        .bind(&project.year)
        .bind(&project.description)
        .bind(&project.image)
        .bind(&details_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_project(&id)
            .await?
            .ok_or_else(|| AppError::Persistence(format!("Inserted project {} vanished", id)))
    }

    async fn update_project(
        &self,
        id: &str,
        project: &NewProject,
    ) -> Result<ProjectRecord, AppError> {
        let details_json = serde_json::to_string(&project.details)?;

        let result = sqlx::query(
            "UPDATE projects SET title = ?, category = ?, location = ?, year = ?, description = ?, image = ?, details = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&project.title)
        .bind(project.category.as_str())
        .bind(&project.location)
        .bind(&project.year)
        .bind(&project.description)
        .bind(&project.image)
        .bind(&details_json)
        .bind(timestamp_now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project {} not found", id)));
        }

        self.get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))
    }

    async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!("Delete of missing project {} ignored", id);
        }

        Ok(())
    }

    // ==================== QUOTE REQUESTS ====================

    async fn list_quote_requests(&self) -> Result<Vec<QuoteRequestRecord>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM quote_requests ORDER BY created_at DESC, rowid DESC",
            QUOTE_REQUEST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(quote_request_from_row).collect())
    }

    async fn get_quote_request(&self, id: &str) -> Result<Option<QuoteRequestRecord>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM quote_requests WHERE id = ?",
            QUOTE_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(quote_request_from_row))
    }

    async fn insert_quote_request(
        &self,
        request: &NewQuoteRequest,
        status: QuoteStatus,
    ) -> Result<QuoteRequestRecord, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp_now();

        sqlx::query(
            r#"INSERT INTO quote_requests
                (id, nom, prenom, email, telephone, adresse, ville, code_postal, type_projet,
                 surface, budget, delai, description, status, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.nom)
        .bind(&request.prenom)
        .bind(&request.email)
        .bind(&request.telephone)
        .bind(&request.adresse)
        .bind(&request.ville)
        .bind(&request.code_postal)
        .bind(&request.type_projet)
        .bind(&request.surface)
        .bind(&request.budget)
        .bind(&request.delai)
        .bind(&request.description)
        .bind(status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_quote_request(&id)
            .await?
            .ok_or_else(|| AppError::Persistence(format!("Inserted quote request {} vanished", id)))
    }

    async fn update_quote_request_status(
        &self,
        id: &str,
        status: QuoteStatus,
    ) -> Result<QuoteRequestRecord, AppError> {
        let result =
            sqlx::query("UPDATE quote_requests SET status = ?, updated_at = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(timestamp_now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Quote request {} not found", id)));
        }

        self.get_quote_request(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quote request {} not found", id)))
    }
}

// Helper functions for row conversion

fn settings_record(id: String, settings: &SiteSettings) -> SettingsRecord {
    SettingsRecord {
        id,
        company_name: settings.company_name.clone(),
        phone: Some(settings.phone.clone()),
        whatsapp: Some(settings.whatsapp.clone()),
        email: Some(settings.email.clone()),
        address: Some(settings.address.clone()),
        city: Some(settings.city.clone()),
        postal_code: Some(settings.postal_code.clone()),
        logo: Some(settings.logo.clone()),
    }
}

fn settings_from_row(row: &SqliteRow) -> SettingsRecord {
    SettingsRecord {
        id: row.get("id"),
        company_name: row.get("company_name"),
        phone: row.get("phone"),
        whatsapp: row.get("whatsapp"),
        email: row.get("email"),
        address: row.get("address"),
        city: row.get("city"),
        postal_code: row.get("postal_code"),
        logo: row.get("logo"),
    }
}

fn project_from_row(row: &SqliteRow) -> ProjectRecord {
    let details_str: Option<String> = row.get("details");
    ProjectRecord {
        id: row.get("id"),
        title: row.get("title"),
        category: row.get("category"),
        location: row.get("location"),
        year: row.get("year"),
        description: row.get("description"),
        image: row.get("image"),
        details: details_str.and_then(|s| serde_json::from_str(&s).ok()),
    }
}

fn quote_request_from_row(row: &SqliteRow) -> QuoteRequestRecord {
    QuoteRequestRecord {
        id: row.get("id"),
        nom: row.get("nom"),
        prenom: row.get("prenom"),
        email: row.get("email"),
        telephone: row.get("telephone"),
        adresse: row.get("adresse"),
        ville: row.get("ville"),
        code_postal: row.get("code_postal"),
        type_projet: row.get("type_projet"),
        surface: row.get("surface"),
        budget: row.get("budget"),
        delai: row.get("delai"),
        description: row.get("description"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}
