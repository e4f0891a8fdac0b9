//! Sector catalog routes.

use axum::extract::State;
use axum::response::Json;

use super::AppState;
use crate::error::SelectError;
use crate::models::SectorTreeNode;

/// GET /api/v1/sectors
///
/// The full catalog as a nested tree, siblings name-sorted at every level.
pub async fn get_sector_tree(
    State(state): State<AppState>,
) -> Result<Json<Vec<SectorTreeNode>>, SelectError> {
    let tree = state.sector_service.sector_tree().await?;
    Ok(Json(tree))
}
