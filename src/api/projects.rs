//! Project catalogue endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{NewProject, Project};
use crate::AppState;

/// GET /api/projects - All projects, newest first.
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    success(state.context.projects().await)
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    match state.context.project(&id).await {
        Some(project) => success(project),
        None => Err(AppError::NotFound(format!("Project not found: {}", id))),
    }
}

/// POST /api/projects - Create a project.
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<NewProject>,
) -> ApiResult<Project> {
    validate_project(&request)?;
    let project = state.context.add_project(request).await?;
    success(project)
}

/// PUT /api/projects/:id - Replace every field of a project.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<NewProject>,
) -> ApiResult<Project> {
    validate_project(&request)?;
    let project = state.context.update_project(request.into_project(id)).await?;
    success(project)
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.context.delete_project(&id).await?;
    success(())
}

/// POST /api/projects/refresh - Reload the catalogue from the gateway.
pub async fn refresh_projects(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    state.context.refresh_projects().await;
    success(state.context.projects().await)
}

fn validate_project(request: &NewProject) -> Result<(), AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Project title is required".to_string()));
    }
    if request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Project description is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectCategory;

    fn request(title: &str, description: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            category: ProjectCategory::Finition,
            location: String::new(),
            year: String::new(),
            description: description.to_string(),
            image: String::new(),
            details: Vec::new(),
        }
    }

    #[test]
    fn test_title_and_description_required() {
        assert!(validate_project(&request("Salle de bain", "Carrelage")).is_ok());
        assert!(matches!(
            validate_project(&request("  ", "Carrelage")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_project(&request("Salle de bain", "")),
            Err(AppError::Validation(_))
        ));
    }
}
