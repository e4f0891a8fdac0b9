//! Sector tree assembly.
//!
//! Turns the flat catalog row set into the nested presentation tree. The
//! grouping is done in one pass over the rows, so no recursive store query
//! is needed; assembly then walks the adjacency map from the roots down.

use std::collections::HashMap;

use crate::error::{SelectError, SelectResult};
use crate::models::{SectorRow, SectorTreeNode};

/// Build the full sector tree from a flat row set.
///
/// Siblings are ordered by name ascending at every level, with id as the
/// tiebreak so the ordering is total even when names repeat. An empty row
/// set yields an empty vec.
///
/// The stored forest invariant (every non-root reachable from exactly one
/// root, no cycles) makes this total; if the rows violate it, some row is
/// never reached from any root and the assembly fails fast with
/// [`SelectError::Integrity`] instead of silently truncating the tree.
pub fn build_sector_tree(rows: &[SectorRow]) -> SelectResult<Vec<SectorTreeNode>> {
    let mut children: HashMap<Option<i64>, Vec<&SectorRow>> = HashMap::new();
    for row in rows {
        children.entry(row.parent_id).or_default().push(row);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    }

    let mut emitted = 0usize;
    let tree = assemble(&children, None, &mut emitted);

    // Every row sits in exactly one adjacency bucket, so a count mismatch
    // means some rows were unreachable from the roots: either a cycle or a
    // parent_id pointing at a row that does not exist.
    if emitted != rows.len() {
        return Err(SelectError::Integrity(format!(
            "{} of {} sector rows unreachable from any root (cycle or dangling parent reference)",
            rows.len() - emitted,
            rows.len()
        )));
    }

    Ok(tree)
}

fn assemble(
    children: &HashMap<Option<i64>, Vec<&SectorRow>>,
    parent: Option<i64>,
    emitted: &mut usize,
) -> Vec<SectorTreeNode> {
    let Some(siblings) = children.get(&parent) else {
        return Vec::new();
    };

    siblings
        .iter()
        .map(|row| {
            *emitted += 1;
            SectorTreeNode {
                id: row.id,
                name: row.name.clone(),
                children: assemble(children, Some(row.id), emitted),
            }
        })
        .collect()
}
