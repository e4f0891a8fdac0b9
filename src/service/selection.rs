//! Session-scoped selection management.
//!
//! Per session the state machine is `NONE --create--> EXISTS` and
//! `EXISTS --update--> EXISTS`; the two illegal transitions (create on
//! EXISTS, update on NONE) are conflicts. Both write paths validate the
//! referenced sector ids against the catalog before touching the store and
//! fail whole rather than persisting a partial set.
//!
//! Request-shape validation (non-blank name, non-empty id set, terms
//! accepted) is a precondition owned by the API boundary; it has already
//! happened by the time these methods run.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::database::{SectorCatalog, SelectionStore};
use crate::error::{SelectError, SelectResult};
use crate::models::{NewSelection, Selection, SelectionChange, SelectionRequest};

pub(crate) const SELECTION_EXISTS: &str =
    "a selection already exists for this session; use update instead";
pub(crate) const SELECTION_MISSING: &str =
    "no selection found for this session; use create instead";
pub(crate) const INVALID_SECTOR_IDS: &str = "one or more sector ids are invalid";

#[derive(Clone)]
pub struct SelectionService {
    selections: Arc<dyn SelectionStore>,
    sectors: Arc<dyn SectorCatalog>,
}

impl SelectionService {
    pub fn new(selections: Arc<dyn SelectionStore>, sectors: Arc<dyn SectorCatalog>) -> Self {
        Self {
            selections,
            sectors,
        }
    }

    /// The session's saved selection, if any. Absence is not an error.
    pub async fn find_by_session(&self, session_id: &str) -> SelectResult<Option<Selection>> {
        self.selections.find_by_session(session_id).await
    }

    /// Create the session's selection. Fails with a conflict if one already
    /// exists — checked up front as a fast path, and again by the store's
    /// uniqueness constraint should a concurrent create win the race.
    pub async fn create(
        &self,
        session_id: &str,
        request: &SelectionRequest,
    ) -> SelectResult<Selection> {
        if self.selections.find_by_session(session_id).await?.is_some() {
            warn!(session_id, "create rejected: selection already exists");
            return Err(SelectError::Conflict(SELECTION_EXISTS.to_string()));
        }

        self.resolve_sector_ids(&request.sector_ids).await?;

        let now = Utc::now();
        let created = self
            .selections
            .insert(NewSelection {
                session_id: session_id.to_string(),
                name: request.name.clone(),
                sector_ids: request.sector_ids.clone(),
                agree_to_terms: request.agree_to_terms,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(
            session_id,
            selection_id = created.id,
            sectors = created.sector_ids.len(),
            "created selection"
        );
        Ok(created)
    }

    /// Replace the session's existing selection in full. Identity and
    /// `created_at` are preserved; `updated_at` advances.
    pub async fn update(
        &self,
        session_id: &str,
        request: &SelectionRequest,
    ) -> SelectResult<Selection> {
        let existing = self
            .selections
            .find_by_session(session_id)
            .await?
            .ok_or_else(|| {
                warn!(session_id, "update rejected: no selection exists");
                SelectError::Conflict(SELECTION_MISSING.to_string())
            })?;

        self.resolve_sector_ids(&request.sector_ids).await?;

        let updated = self
            .selections
            .update(
                existing.id,
                SelectionChange {
                    name: request.name.clone(),
                    sector_ids: request.sector_ids.clone(),
                    agree_to_terms: request.agree_to_terms,
                    updated_at: Utc::now(),
                },
            )
            .await?;

        info!(
            session_id,
            selection_id = updated.id,
            sectors = updated.sector_ids.len(),
            "updated selection"
        );
        Ok(updated)
    }

    /// Batch referential check: every requested id must exist in the
    /// catalog. The ids arrive deduplicated (they are a set), so comparing
    /// counts is exact — any miss makes the counts differ and the whole
    /// operation fails.
    async fn resolve_sector_ids(&self, sector_ids: &BTreeSet<i64>) -> SelectResult<()> {
        let found = self.sectors.count_existing(sector_ids).await?;
        if found != sector_ids.len() {
            warn!(
                requested = sector_ids.len(),
                found, "rejected selection referencing unknown sector ids"
            );
            return Err(SelectError::InvalidArgument(INVALID_SECTOR_IDS.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::{MemorySectorCatalog, MemorySelectionStore};
    use crate::models::SectorRow;
    use std::time::Duration;

    const SESSION_ID: &str = "session-123";

    fn catalog_rows() -> Vec<SectorRow> {
        vec![
            SectorRow {
                id: 1,
                name: "Manufacturing".to_string(),
                parent_id: None,
            },
            SectorRow {
                id: 19,
                name: "Construction materials".to_string(),
                parent_id: Some(1),
            },
            SectorRow {
                id: 2,
                name: "Service".to_string(),
                parent_id: None,
            },
            SectorRow {
                id: 28,
                name: "Information Technology and Telecommunications".to_string(),
                parent_id: Some(2),
            },
        ]
    }

    fn service() -> SelectionService {
        SelectionService::new(
            Arc::new(MemorySelectionStore::new()),
            Arc::new(MemorySectorCatalog::new(catalog_rows())),
        )
    }

    fn request(name: &str, ids: &[i64]) -> SelectionRequest {
        SelectionRequest {
            name: name.to_string(),
            sector_ids: ids.iter().copied().collect(),
            agree_to_terms: true,
        }
    }

    #[tokio::test]
    async fn test_find_absent_is_none() {
        assert!(service()
            .find_by_session(SESSION_ID)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_then_find_round_trip() {
        let service = service();

        let created = service
            .create(SESSION_ID, &request("John", &[1, 28]))
            .await
            .unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let found = service
            .find_by_session(SESSION_ID)
            .await
            .unwrap()
            .expect("selection should exist after create");

        assert_eq!(found.name, "John");
        assert_eq!(found.sector_ids, BTreeSet::from([1, 28]));
        assert!(found.agree_to_terms);
        assert_eq!(found.id, created.id);
        assert_eq!(found.created_at, found.updated_at);
    }

    #[tokio::test]
    async fn test_second_create_conflicts() {
        let service = service();
        service
            .create(SESSION_ID, &request("John", &[1]))
            .await
            .unwrap();

        let err = service
            .create(SESSION_ID, &request("John", &[1]))
            .await
            .unwrap_err();
        assert!(matches!(err, SelectError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_before_create_conflicts() {
        let err = service()
            .update(SESSION_ID, &request("Jane", &[1]))
            .await
            .unwrap_err();
        assert!(matches!(err, SelectError::Conflict(msg) if msg == SELECTION_MISSING));
    }

    #[tokio::test]
    async fn test_create_with_unknown_sector_rejected_without_mutation() {
        let service = service();

        let err = service
            .create(SESSION_ID, &request("John", &[1, 999]))
            .await
            .unwrap_err();
        assert!(matches!(err, SelectError::InvalidArgument(msg) if msg == INVALID_SECTOR_IDS));

        assert!(service
            .find_by_session(SESSION_ID)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_with_unknown_sector_rejected_without_mutation() {
        let service = service();
        service
            .create(SESSION_ID, &request("John", &[1, 28]))
            .await
            .unwrap();

        let err = service
            .update(SESSION_ID, &request("Jane", &[999]))
            .await
            .unwrap_err();
        assert!(matches!(err, SelectError::InvalidArgument(_)));

        let found = service.find_by_session(SESSION_ID).await.unwrap().unwrap();
        assert_eq!(found.name, "John");
        assert_eq!(found.sector_ids, BTreeSet::from([1, 28]));
    }

    #[tokio::test]
    async fn test_update_preserves_identity_and_created_at() {
        let service = service();
        let created = service
            .create(SESSION_ID, &request("John", &[1, 28]))
            .await
            .unwrap();

        // Ensure the clock moves between create and update.
        tokio::time::sleep(Duration::from_millis(5)).await;

        let updated = service
            .update(SESSION_ID, &request("Jane", &[2]))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Jane");
        assert_eq!(updated.sector_ids, BTreeSet::from([2]));
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_racing_insert_loses_with_same_conflict() {
        // Drive the store directly, bypassing the service's fast-path
        // check, the way a second concurrent create would.
        let store = MemorySelectionStore::new();
        let now = Utc::now();
        let fresh = |name: &str| NewSelection {
            session_id: SESSION_ID.to_string(),
            name: name.to_string(),
            sector_ids: BTreeSet::from([1]),
            agree_to_terms: true,
            created_at: now,
            updated_at: now,
        };

        store.insert(fresh("John")).await.unwrap();
        let err = store.insert(fresh("Jane")).await.unwrap_err();
        assert!(matches!(err, SelectError::Conflict(msg) if msg == SELECTION_EXISTS));
    }
}
