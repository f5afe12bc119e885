//! Quote request endpoints.
//!
//! Submission is public; listing and status changes are admin-only.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{NewQuoteRequest, QuoteRequest, StatusUpdateRequest};
use crate::AppState;

/// POST /api/quote-requests - Submit the public quote form.
pub async fn submit_quote_request(
    State(state): State<AppState>,
    Json(request): Json<NewQuoteRequest>,
) -> ApiResult<QuoteRequest> {
    let missing = request.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let created = state.context.add_quote_request(request).await?;
    success(created)
}

/// GET /api/quote-requests - All requests, newest first.
pub async fn list_quote_requests(State(state): State<AppState>) -> ApiResult<Vec<QuoteRequest>> {
    success(state.context.quote_requests().await)
}

/// PUT /api/quote-requests/:id/status
pub async fn update_quote_request_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<QuoteRequest> {
    let updated = state
        .context
        .update_quote_request_status(&id, request.status)
        .await?;
    success(updated)
}

/// POST /api/quote-requests/refresh
pub async fn refresh_quote_requests(
    State(state): State<AppState>,
) -> ApiResult<Vec<QuoteRequest>> {
    state.context.refresh_quote_requests().await;
    success(state.context.quote_requests().await)
}
