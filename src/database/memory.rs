//! In-memory store implementations.
//!
//! Back the unit and integration tests, and double as a no-database backend
//! for local experimentation. `MemorySelectionStore` enforces session
//! uniqueness under its lock, so the duplicate-insert race behaves like the
//! Postgres unique index: the second insert for a session loses with a
//! conflict no matter what the caller checked beforehand.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{SectorCatalog, SelectionStore};
use crate::error::{SelectError, SelectResult};
use crate::models::{NewSelection, SectorRow, Selection, SelectionChange};
use crate::service::selection::SELECTION_EXISTS;

pub struct MemorySectorCatalog {
    rows: Vec<SectorRow>,
}

impl MemorySectorCatalog {
    pub fn new(rows: Vec<SectorRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl SectorCatalog for MemorySectorCatalog {
    async fn all_rows(&self) -> SelectResult<Vec<SectorRow>> {
        Ok(self.rows.clone())
    }

    async fn count_existing(&self, ids: &BTreeSet<i64>) -> SelectResult<usize> {
        Ok(self.rows.iter().filter(|row| ids.contains(&row.id)).count())
    }
}

#[derive(Default)]
pub struct MemorySelectionStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    by_session: HashMap<String, Selection>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SelectionStore for MemorySelectionStore {
    async fn find_by_session(&self, session_id: &str) -> SelectResult<Option<Selection>> {
        let state = self.state.lock().expect("selection store lock poisoned");
        Ok(state.by_session.get(session_id).cloned())
    }

    async fn insert(&self, new_selection: NewSelection) -> SelectResult<Selection> {
        let mut state = self.state.lock().expect("selection store lock poisoned");

        if state.by_session.contains_key(&new_selection.session_id) {
            return Err(SelectError::Conflict(SELECTION_EXISTS.to_string()));
        }

        state.next_id += 1;
        let selection = Selection {
            id: state.next_id,
            session_id: new_selection.session_id.clone(),
            name: new_selection.name,
            sector_ids: new_selection.sector_ids,
            agree_to_terms: new_selection.agree_to_terms,
            created_at: new_selection.created_at,
            updated_at: new_selection.updated_at,
        };
        state
            .by_session
            .insert(new_selection.session_id, selection.clone());

        Ok(selection)
    }

    async fn update(&self, id: i64, change: SelectionChange) -> SelectResult<Selection> {
        let mut state = self.state.lock().expect("selection store lock poisoned");

        let selection = state
            .by_session
            .values_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SelectError::Integrity(format!("no selection row for id {id}")))?;

        selection.name = change.name;
        selection.sector_ids = change.sector_ids;
        selection.agree_to_terms = change.agree_to_terms;
        selection.updated_at = change.updated_at;

        Ok(selection.clone())
    }
}
