//! Sector catalog queries.

use std::sync::Arc;

use crate::catalog::build_sector_tree;
use crate::database::SectorCatalog;
use crate::error::SelectResult;
use crate::models::SectorTreeNode;

/// Read-side service over the sector catalog. Pure: the tree is derived
/// fresh from the current row set on every call.
#[derive(Clone)]
pub struct SectorService {
    catalog: Arc<dyn SectorCatalog>,
}

impl SectorService {
    pub fn new(catalog: Arc<dyn SectorCatalog>) -> Self {
        Self { catalog }
    }

    /// The full sector hierarchy, siblings name-sorted at every level.
    pub async fn sector_tree(&self) -> SelectResult<Vec<SectorTreeNode>> {
        let rows = self.catalog.all_rows().await?;
        build_sector_tree(&rows)
    }
}
