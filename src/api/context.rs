//! Aggregate read model.

use axum::extract::State;

use super::{success, ApiResult};
use crate::context::ContextSnapshot;
use crate::AppState;

/// GET /api/context - Everything a page renders from, in one response.
pub async fn get_context(State(state): State<AppState>) -> ApiResult<ContextSnapshot> {
    success(state.context.snapshot().await)
}
