// src/pipeline/diff.rs

//! Diff between two snapshots of the same category.
//!
//! Reported alongside each refresh so the sync summary can say what
//! actually changed upstream.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::ArticleRow;

/// Article ids that changed between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    /// In the new snapshot only, in new-snapshot order
    pub added: Vec<i64>,
    /// In the old snapshot only, in old-snapshot order
    pub removed: Vec<i64>,
    /// In both, with a different hero thumbnail
    pub rethumbnailed: Vec<i64>,
}

impl SnapshotDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.rethumbnailed.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.rethumbnailed.len()
    }
}

/// Calculate the diff between previous and current row sets.
///
/// Rows without an id are ignored on both sides.
pub fn calculate_diff(previous: &[ArticleRow], current: &[ArticleRow]) -> SnapshotDiff {
    let prev_map: HashMap<i64, &ArticleRow> = previous
        .iter()
        .filter_map(|row| row.id().map(|id| (id, row)))
        .collect();
    let curr_map: HashMap<i64, &ArticleRow> = current
        .iter()
        .filter_map(|row| row.id().map(|id| (id, row)))
        .collect();

    let mut diff = SnapshotDiff::default();

    for row in current {
        let Some(id) = row.id() else { continue };
        match prev_map.get(&id) {
            None => diff.added.push(id),
            Some(prev) if prev.thumbnail() != row.thumbnail() => diff.rethumbnailed.push(id),
            Some(_) => {}
        }
    }

    diff.removed = previous
        .iter()
        .filter_map(ArticleRow::id)
        .filter(|id| !curr_map.contains_key(id))
        .collect();

    diff
}
