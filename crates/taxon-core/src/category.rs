//! Category record and depth rules.
//!
//! Categories form a strictly depth-bounded tree: roots at depth 0,
//! first-level children at 1, second-level at 2. Depth is derived from the
//! parent chain and never stored as independent truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxonError};

/// Maximum allowed depth. Roots sit at 0, so the tree holds three levels.
pub const MAX_DEPTH: u8 = 2;

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique id, assigned at creation, immutable.
    pub id: u64,
    /// Unique across the whole catalog (exact, case-sensitive match).
    pub name: String,
    /// `None` marks a root. Fixed at creation; there is no re-parenting.
    pub parent_id: Option<u64>,
    /// Hops to the root, recomputed from the parent chain on load.
    pub depth: u8,
    /// When this category was created.
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether another level fits below this category.
    pub fn can_have_children(&self) -> bool {
        self.depth < MAX_DEPTH
    }
}

/// Trim and validate a category name. Empty (after trimming) is rejected.
pub(crate) fn valid_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TaxonError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
