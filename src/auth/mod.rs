//! Admin gate for back-office routes.
//!
//! Implements constant-time comparison for the placeholder credential check.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::AppState;

/// Let the request through only while the admin session flag is set.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.context.is_logged_in() {
        next.run(request).await
    } else {
        AppError::Unauthorized("Admin session required".to_string()).into_response()
    }
}

/// Compare credentials without leaking the position of the first mismatch.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
