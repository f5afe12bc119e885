//! Quote request model matching the frontend QuoteRequest interface.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::gateway::QuoteRequestRecord;

/// Triage state of a quote request.
///
/// The intended workflow is pending → confirmed → responded, but any status
/// may be set at any time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Pending,
    Confirmed,
    Responded,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Confirmed => "confirmed",
            QuoteStatus::Responded => "responded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(QuoteStatus::Pending),
            "confirmed" => Some(QuoteStatus::Confirmed),
            "responded" => Some(QuoteStatus::Responded),
            _ => None,
        }
    }
}

/// A quote request submitted through the public form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
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
    #[serde(default)]
    pub budget: String,
    pub delai: String,
    #[serde(default)]
    pub description: String,
    /// Set once by the gateway at submission
    pub date_created: String,
    pub status: QuoteStatus,
}

impl TryFrom<QuoteRequestRecord> for QuoteRequest {
    type Error = AppError;

    fn try_from(record: QuoteRequestRecord) -> Result<Self, Self::Error> {
        let status = QuoteStatus::from_str(&record.status).ok_or_else(|| {
            AppError::Validation(format!(
                "Quote request {} has unknown status '{}'",
                record.id, record.status
            ))
        })?;

        Ok(Self {
            id: record.id,
            nom: record.nom,
            prenom: record.prenom,
            email: record.email,
            telephone: record.telephone,
            adresse: record.adresse,
            ville: record.ville,
            code_postal: record.code_postal,
            type_projet: record.type_projet,
            surface: record.surface,
            budget: record.budget.unwrap_or_default(),
            delai: record.delai,
            description: record.description.unwrap_or_default(),
            date_created: record.created_at,
            status,
        })
    }
}

/// Request body for submitting a quote request.
///
/// Id, status and creation date are not part of the body; any such fields sent
/// by a client are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuoteRequest {
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub adresse: String,
    #[serde(default)]
    pub ville: String,
    #[serde(default)]
    pub code_postal: String,
    #[serde(default)]
    pub type_projet: String,
    #[serde(default)]
    pub surface: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub delai: String,
    #[serde(default)]
    pub description: String,
}

impl NewQuoteRequest {
    /// Names of required fields left blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("nom", &self.nom),
            ("prenom", &self.prenom),
            ("email", &self.email),
            ("telephone", &self.telephone),
            ("adresse", &self.adresse),
            ("ville", &self.ville),
            ("codePostal", &self.code_postal),
            ("description", &self.description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Request body for changing the status of a quote request.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: QuoteStatus,
}
