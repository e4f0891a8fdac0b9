//! Postgres-backed sector catalog.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;

use super::SectorCatalog;
use crate::error::SelectResult;
use crate::models::SectorRow;

#[derive(Clone)]
pub struct PgSectorCatalog {
    pool: PgPool,
}

impl PgSectorCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectorCatalog for PgSectorCatalog {
    async fn all_rows(&self) -> SelectResult<Vec<SectorRow>> {
        let rows = sqlx::query_as::<_, SectorRow>("SELECT id, name, parent_id FROM sectors")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn count_existing(&self, ids: &BTreeSet<i64>) -> SelectResult<usize> {
        let ids: Vec<i64> = ids.iter().copied().collect();

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sectors WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as usize)
    }
}
