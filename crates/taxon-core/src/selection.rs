//! Selection state codec.
//!
//! A selection is the navigation path through the category tree: optionally
//! a root, a first-level and a second-level id. It travels as three
//! optional strings (query parameters in a web frontend, flags on the CLI)
//! and is fully recoverable from that representation alone - no session
//! state anywhere.
//!
//! The codec does not check that the ids form an actual parent chain; an
//! orphaned selector simply yields empty partitions downstream.

use serde::{Deserialize, Serialize};

/// The currently selected path through the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub root_id: Option<u64>,
    pub first_id: Option<u64>,
    pub second_id: Option<u64>,
}

impl Selection {
    /// Selection pointing at a root category only.
    pub fn root(id: u64) -> Self {
        Self {
            root_id: Some(id),
            ..Default::default()
        }
    }

    pub fn with_first(mut self, id: u64) -> Self {
        self.first_id = Some(id);
        self
    }

    pub fn with_second(mut self, id: u64) -> Self {
        self.second_id = Some(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.root_id.is_none() && self.first_id.is_none() && self.second_id.is_none()
    }

    /// Decode three raw selectors. Absence or anything that does not parse
    /// as an unsigned integer counts as "not selected" - never an error.
    pub fn decode(root: Option<&str>, first: Option<&str>, second: Option<&str>) -> Self {
        Self {
            root_id: parse_selector(root),
            first_id: parse_selector(first),
            second_id: parse_selector(second),
        }
    }

    /// Inverse of [`Selection::decode`]: `decode(encode(s)) == s`.
    pub fn encode(&self) -> (Option<String>, Option<String>, Option<String>) {
        (
            self.root_id.map(|id| id.to_string()),
            self.first_id.map(|id| id.to_string()),
            self.second_id.map(|id| id.to_string()),
        )
    }
}

fn parse_selector(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_full_path() {
        let selection = Selection::decode(Some("1"), Some("2"), Some("3"));
        assert_eq!(selection, Selection::root(1).with_first(2).with_second(3));
    }

    #[test]
    fn decode_tolerates_garbage() {
        let selection = Selection::decode(Some("abc"), Some(""), Some("-3"));
        assert!(selection.is_empty());

        // Partial garbage degrades per field
        let selection = Selection::decode(Some("7"), Some("x7"), None);
        assert_eq!(selection.root_id, Some(7));
        assert_eq!(selection.first_id, None);
        assert_eq!(selection.second_id, None);
    }

    #[test]
    fn decode_trims_whitespace() {
        let selection = Selection::decode(Some(" 42 "), None, None);
        assert_eq!(selection.root_id, Some(42));
    }

    #[test]
    fn encode_decode_roundtrip() {
        let cases = [
            Selection::default(),
            Selection::root(0),
            Selection::root(1),
            Selection::root(1).with_first(2),
            Selection::root(1).with_first(2).with_second(3),
            Selection {
                root_id: None,
                first_id: Some(9),
                second_id: None,
            },
        ];
        for selection in cases {
            let (root, first, second) = selection.encode();
            let decoded =
                Selection::decode(root.as_deref(), first.as_deref(), second.as_deref());
            assert_eq!(decoded, selection);
        }
    }

    #[test]
    fn empty_selection() {
        assert!(Selection::default().is_empty());
        assert!(!Selection::root(1).is_empty());
    }
}
