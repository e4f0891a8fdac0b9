//! Postgres-backed selection store.
//!
//! A selection is one `user_selections` row plus its `user_selection_sectors`
//! link rows; writes touch both inside a single transaction. The unique
//! index on `session_id` is the source of truth for one-selection-per-session
//! and a violation is reported as the same conflict the service's fast-path
//! existence check produces.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::SelectionStore;
use crate::error::{SelectError, SelectResult};
use crate::models::{NewSelection, Selection, SelectionChange};
use crate::service::selection::SELECTION_EXISTS;

#[derive(Clone)]
pub struct PgSelectionStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct SelectionRow {
    id: i64,
    session_id: String,
    name: String,
    agree_to_terms: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SelectionRow {
    fn into_selection(self, sector_ids: BTreeSet<i64>) -> Selection {
        Selection {
            id: self.id,
            session_id: self.session_id,
            name: self.name,
            sector_ids,
            agree_to_terms: self.agree_to_terms,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl PgSelectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn sector_ids_for<'e, E>(executor: E, selection_id: i64) -> SelectResult<BTreeSet<i64>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT sector_id FROM user_selection_sectors WHERE user_selection_id = $1",
        )
        .bind(selection_id)
        .fetch_all(executor)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn replace_sector_links(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        selection_id: i64,
        sector_ids: &BTreeSet<i64>,
    ) -> SelectResult<()> {
        sqlx::query("DELETE FROM user_selection_sectors WHERE user_selection_id = $1")
            .bind(selection_id)
            .execute(&mut **tx)
            .await?;

        let ids: Vec<i64> = sector_ids.iter().copied().collect();
        sqlx::query(
            "INSERT INTO user_selection_sectors (user_selection_id, sector_id) \
             SELECT $1, unnest($2::bigint[])",
        )
        .bind(selection_id)
        .bind(&ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SelectionStore for PgSelectionStore {
    async fn find_by_session(&self, session_id: &str) -> SelectResult<Option<Selection>> {
        let row = sqlx::query_as::<_, SelectionRow>(
            "SELECT id, session_id, name, agree_to_terms, created_at, updated_at \
             FROM user_selections WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let sector_ids = Self::sector_ids_for(&self.pool, row.id).await?;
        Ok(Some(row.into_selection(sector_ids)))
    }

    async fn insert(&self, new_selection: NewSelection) -> SelectResult<Selection> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SelectionRow>(
            "INSERT INTO user_selections (session_id, name, agree_to_terms, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, session_id, name, agree_to_terms, created_at, updated_at",
        )
        .bind(&new_selection.session_id)
        .bind(&new_selection.name)
        .bind(new_selection.agree_to_terms)
        .bind(new_selection.created_at)
        .bind(new_selection.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        Self::replace_sector_links(&mut tx, row.id, &new_selection.sector_ids).await?;

        tx.commit().await?;
        debug!(selection_id = row.id, "inserted selection row");

        Ok(row.into_selection(new_selection.sector_ids))
    }

    async fn update(&self, id: i64, change: SelectionChange) -> SelectResult<Selection> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SelectionRow>(
            "UPDATE user_selections SET name = $2, agree_to_terms = $3, updated_at = $4 \
             WHERE id = $1 \
             RETURNING id, session_id, name, agree_to_terms, created_at, updated_at",
        )
        .bind(id)
        .bind(&change.name)
        .bind(change.agree_to_terms)
        .bind(change.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_sector_links(&mut tx, id, &change.sector_ids).await?;

        tx.commit().await?;
        debug!(selection_id = id, "updated selection row");

        Ok(row.into_selection(change.sector_ids))
    }
}

/// A concurrent duplicate insert loses the race on the `session_id` unique
/// index; report it exactly like the explicit duplicate-detection path.
fn map_unique_violation(err: sqlx::Error) -> SelectError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            SelectError::Conflict(SELECTION_EXISTS.to_string())
        }
        _ => SelectError::Database(err),
    }
}
