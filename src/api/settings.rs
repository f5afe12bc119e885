//! Site settings endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::models::{SiteSettings, SiteSettingsPatch};
use crate::AppState;

/// GET /api/settings - Current company settings.
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<SiteSettings> {
    success(state.context.settings().await)
}

/// PUT /api/settings - Merge the given fields into the settings.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SiteSettingsPatch>,
) -> ApiResult<SiteSettings> {
    let settings = state.context.update_settings(&patch).await?;
    success(settings)
}
