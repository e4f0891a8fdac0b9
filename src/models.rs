//! Domain types for the sector catalog and session selections.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SelectError, SelectResult};

/// A single catalog row as stored: flat, with an optional parent reference.
/// `parent_id == None` marks a root. The full row set forms a forest.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SectorRow {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

/// A node of the derived tree projection. Built fresh on every query,
/// never persisted. Siblings are sorted by name (ties by id) at every level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorTreeNode {
    pub id: i64,
    pub name: String,
    pub children: Vec<SectorTreeNode>,
}

/// A session's saved selection, as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: i64,
    pub session_id: String,
    pub name: String,
    pub sector_ids: BTreeSet<i64>,
    pub agree_to_terms: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a brand-new selection row; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewSelection {
    pub session_id: String,
    pub name: String,
    pub sector_ids: BTreeSet<i64>,
    pub agree_to_terms: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of a selection's mutable fields. Identity and
/// `created_at` are never touched by an update.
#[derive(Debug, Clone)]
pub struct SelectionChange {
    pub name: String,
    pub sector_ids: BTreeSet<i64>,
    pub agree_to_terms: bool,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Incoming selection payload (create and update share the same shape —
/// the request always carries the complete desired state).
///
/// `sector_ids` deserializes into a set, so duplicate ids collapse before
/// the catalog count comparison ever sees them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub name: String,
    pub sector_ids: BTreeSet<i64>,
    pub agree_to_terms: bool,
}

impl SelectionRequest {
    /// Structural validation, applied at the API boundary before the
    /// service is invoked. Collects every field failure rather than
    /// stopping at the first.
    pub fn validate(&self) -> SelectResult<()> {
        let mut errors = BTreeMap::new();

        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "Name is required".to_string());
        }
        if self.sector_ids.is_empty() {
            errors.insert(
                "sectorIds".to_string(),
                "At least one sector must be selected".to_string(),
            );
        }
        if !self.agree_to_terms {
            errors.insert(
                "agreeToTerms".to_string(),
                "You must agree to the terms".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SelectError::Validation { errors })
        }
    }
}

/// Outgoing selection record. The session token is deliberately not echoed
/// back; the caller already holds it in the cookie.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub id: i64,
    pub name: String,
    pub sector_ids: BTreeSet<i64>,
    pub agree_to_terms: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Selection> for SelectionResponse {
    fn from(selection: Selection) -> Self {
        Self {
            id: selection.id,
            name: selection.name,
            sector_ids: selection.sector_ids,
            agree_to_terms: selection.agree_to_terms,
            created_at: selection.created_at,
            updated_at: selection.updated_at,
        }
    }
}
