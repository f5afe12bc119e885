//! Admin session endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{LoginRequest, SessionStatus};
use crate::AppState;

/// GET /api/session - Whether the admin session is active.
pub async fn get_session(State(state): State<AppState>) -> ApiResult<SessionStatus> {
    success(SessionStatus {
        is_logged_in: state.context.is_logged_in(),
    })
}

/// POST /api/session/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<SessionStatus> {
    if !state.context.login(&request.username, &request.password).await {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }
    success(SessionStatus { is_logged_in: true })
}

/// POST /api/session/logout
pub async fn logout(State(state): State<AppState>) -> ApiResult<SessionStatus> {
    state.context.logout().await;
    success(SessionStatus {
        is_logged_in: false,
    })
}
