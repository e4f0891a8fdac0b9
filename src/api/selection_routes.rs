//! Selection routes.
//!
//! All three operations are keyed by the session token the middleware put
//! in request extensions. Request bodies are validated here, before the
//! service is invoked; the service only re-checks what it owns (existence
//! state machine and sector-id resolution).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Extension;

use super::session::SessionToken;
use super::AppState;
use crate::error::SelectError;
use crate::models::{SelectionRequest, SelectionResponse};

/// GET /api/v1/selections/me
///
/// The current session's saved selection; 204 when none exists yet.
pub async fn get_my_selection(
    State(state): State<AppState>,
    Extension(SessionToken(session_id)): Extension<SessionToken>,
) -> Result<Response, SelectError> {
    match state.selection_service.find_by_session(&session_id).await? {
        Some(selection) => Ok(Json(SelectionResponse::from(selection)).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// POST /api/v1/selections
///
/// Save a new selection for the current session; 409 if one exists.
pub async fn create_selection(
    State(state): State<AppState>,
    Extension(SessionToken(session_id)): Extension<SessionToken>,
    Json(request): Json<SelectionRequest>,
) -> Result<(StatusCode, Json<SelectionResponse>), SelectError> {
    request.validate()?;

    let created = state
        .selection_service
        .create(&session_id, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PUT /api/v1/selections/me
///
/// Replace the current session's selection; 409 if none exists.
pub async fn update_selection(
    State(state): State<AppState>,
    Extension(SessionToken(session_id)): Extension<SessionToken>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, SelectError> {
    request.validate()?;

    let updated = state
        .selection_service
        .update(&session_id, &request)
        .await?;

    Ok(Json(updated.into()))
}
