//! HTTP surface: router assembly and error-to-response mapping.
//!
//! Service errors become RFC-7807-style problem bodies:
//! conflict → 409, bad sector ids / malformed request → 400, anything
//! internal → 500 with the detail withheld.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::error::SelectError;
use crate::service::{SectorService, SelectionService};

pub mod sector_routes;
pub mod selection_routes;
pub mod session;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub sector_service: SectorService,
    pub selection_service: SelectionService,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_check))
        .route("/api/v1/sectors", get(sector_routes::get_sector_tree))
        .route(
            "/api/v1/selections",
            post(selection_routes::create_selection),
        )
        .route(
            "/api/v1/selections/me",
            get(selection_routes::get_my_selection).put(selection_routes::update_selection),
        )
        .layer(axum::middleware::from_fn(session::issue_session_cookie))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// GET /api/v1/health
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "sector-select",
    }))
}

impl IntoResponse for SelectError {
    fn into_response(self) -> Response {
        let (status, title, detail, field_errors) = match self {
            SelectError::Conflict(detail) => {
                warn!("conflict: {detail}");
                (StatusCode::CONFLICT, "Conflict", detail, None)
            }
            SelectError::InvalidArgument(detail) => {
                warn!("invalid argument: {detail}");
                (StatusCode::BAD_REQUEST, "Bad Request", detail, None)
            }
            SelectError::Validation { errors } => (
                StatusCode::BAD_REQUEST,
                "Validation Error",
                "Validation failed".to_string(),
                Some(errors),
            ),
            SelectError::Integrity(detail) => {
                error!("integrity error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
            SelectError::Database(err) => {
                error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "type": "about:blank",
            "title": title,
            "status": status.as_u16(),
            "detail": detail,
        });
        if let Some(errors) = field_errors {
            body["errors"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}
