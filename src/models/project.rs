//! Project model matching the frontend Project interface.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::gateway::ProjectRecord;

/// Line of work a project belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectCategory {
    GrosOeuvre,
    SecondOeuvre,
    Finition,
    TravauxPublics,
    Geomatique,
}

impl ProjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::GrosOeuvre => "gros-oeuvre",
            ProjectCategory::SecondOeuvre => "second-oeuvre",
            ProjectCategory::Finition => "finition",
            ProjectCategory::TravauxPublics => "travaux-publics",
            ProjectCategory::Geomatique => "geomatique",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "gros-oeuvre" => Some(ProjectCategory::GrosOeuvre),
            "second-oeuvre" => Some(ProjectCategory::SecondOeuvre),
            "finition" => Some(ProjectCategory::Finition),
            "travaux-publics" => Some(ProjectCategory::TravauxPublics),
            "geomatique" => Some(ProjectCategory::Geomatique),
            _ => None,
        }
    }
}

/// A completed project shown in the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub category: ProjectCategory,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub year: String,
    pub description: String,
    /// URL or inline data URI
    #[serde(default)]
    pub image: String,
    /// Display-ordered bullet points
    #[serde(default)]
    pub details: Vec<String>,
}

impl Project {
    /// Drop blank detail entries, keeping the order of the rest.
    pub fn sanitized(mut self) -> Self {
        self.details = without_blank_details(self.details);
        self
    }

    /// The writable fields of this project.
    pub fn fields(&self) -> NewProject {
        NewProject {
            title: self.title.clone(),
            category: self.category,
            location: self.location.clone(),
            year: self.year.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            details: self.details.clone(),
        }
    }
}

impl TryFrom<ProjectRecord> for Project {
    type Error = AppError;

    fn try_from(record: ProjectRecord) -> Result<Self, Self::Error> {
        let category = ProjectCategory::from_str(&record.category).ok_or_else(|| {
            AppError::Validation(format!(
                "Project {} has unknown category '{}'",
                record.id, record.category
            ))
        })?;

        let details = match record.details {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            id: record.id,
            title: record.title,
            category,
            location: record.location.unwrap_or_default(),
            year: record.year.unwrap_or_default(),
            description: record.description,
            image: record.image.unwrap_or_default(),
            details,
        })
    }
}

/// Request body for creating a project; the id is assigned by the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    pub category: ProjectCategory,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub year: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl NewProject {
    /// Drop blank detail entries, keeping the order of the rest.
    pub fn sanitized(mut self) -> Self {
        self.details = without_blank_details(self.details);
        self
    }

    pub fn into_project(self, id: String) -> Project {
        Project {
            id,
            title: self.title,
            category: self.category,
            location: self.location,
            year: self.year,
            description: self.description,
            image: self.image,
            details: self.details,
        }
    }
}

fn without_blank_details(details: Vec<String>) -> Vec<String> {
    details
        .into_iter()
        .filter(|detail| !detail.trim().is_empty())
        .collect()
}
