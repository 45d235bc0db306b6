//! Tree partition queries.
//!
//! Splits the flat category set into the three per-level views a navigation
//! surface needs: all roots, the children of the selected root, and the
//! children of the selected first-level category. Pure functions over a
//! snapshot - nothing here touches the store.

use serde::Serialize;

use crate::category::Category;
use crate::selection::Selection;

/// The three-level view for one selection.
///
/// Slices preserve the store's insertion order. A selector that matches no
/// category yields an empty slice, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreePartition {
    /// Every root category, regardless of selection.
    pub roots: Vec<Category>,
    /// Children of the selected root; empty when no root is selected.
    pub first_level: Vec<Category>,
    /// Children of the selected first-level category; empty when none is selected.
    pub second_level: Vec<Category>,
    /// The selected categories themselves, where the ids resolve.
    pub selected_root: Option<Category>,
    pub selected_first: Option<Category>,
    pub selected_second: Option<Category>,
}

/// Partition `all` into per-level views for `selection`.
pub fn partition(all: &[Category], selection: &Selection) -> TreePartition {
    TreePartition {
        roots: all.iter().filter(|c| c.is_root()).cloned().collect(),
        first_level: children_of_selected(all, selection.root_id),
        second_level: children_of_selected(all, selection.first_id),
        selected_root: resolve(all, selection.root_id),
        selected_first: resolve(all, selection.first_id),
        selected_second: resolve(all, selection.second_id),
    }
}

/// Children of the selected id; an absent selector selects nothing.
fn children_of_selected(all: &[Category], selected: Option<u64>) -> Vec<Category> {
    match selected {
        Some(id) => all
            .iter()
            .filter(|c| c.parent_id == Some(id))
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

fn resolve(all: &[Category], id: Option<u64>) -> Option<Category> {
    id.and_then(|id| all.iter().find(|c| c.id == id).cloned())
}
