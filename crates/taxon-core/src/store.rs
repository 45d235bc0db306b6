//! Category store.
//!
//! Sole owner of the persisted category set in `categories.toml` under the
//! base directory, and the authority for the hierarchy invariants: depth
//! never exceeds [`MAX_DEPTH`], names are globally unique, parents must
//! exist and be shallow enough to take children.
//!
//! Mutations validate and persist under a single write lock, so the
//! uniqueness check and the insert are one atomic unit; readers always see
//! a complete snapshot.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{valid_name, Category, MAX_DEPTH};
use crate::error::{Result, TaxonError};

/// Default store file name, relative to the base directory.
pub const DEFAULT_STORE_FILE: &str = "categories.toml";

const FIRST_ID: u64 = 1;

/// On-disk record. Depth is derived, so only the parent link is stored.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCategory {
    id: u64,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<u64>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    categories: Vec<StoredCategory>,
}

#[derive(Debug)]
struct StoreInner {
    next_id: u64,
    categories: Vec<Category>,
}

/// Persistent, invariant-enforcing category store.
#[derive(Debug)]
pub struct CategoryStore {
    path: PathBuf,
    inner: RwLock<StoreInner>,
}

impl CategoryStore {
    /// Load the store from `categories.toml` under `base_dir`. A missing
    /// file is an empty store, not an error.
    pub fn load(base_dir: &Path) -> Result<Self> {
        Self::load_with_file(base_dir, DEFAULT_STORE_FILE)
    }

    /// Load from a non-default store file under `base_dir`.
    pub fn load_with_file(base_dir: &Path, file_name: &str) -> Result<Self> {
        let path = base_dir.join(file_name);
        if !path.exists() {
            return Ok(Self {
                path,
                inner: RwLock::new(StoreInner {
                    next_id: FIRST_ID,
                    categories: Vec::new(),
                }),
            });
        }

        let content = fs::read_to_string(&path)?;
        let file: StoreFile = toml::from_str(&content)?;
        let categories = resolve_depths(&file.categories)?;

        // A hand-edited file may have a stale counter; heal it forward.
        let max_id = categories.iter().map(|c| c.id).max().unwrap_or(0);
        let next_id = file.next_id.max(max_id + 1).max(FIRST_ID);

        Ok(Self {
            path,
            inner: RwLock::new(StoreInner {
                next_id,
                categories,
            }),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a category. With no parent the new category is a root; with a
    /// parent it lands one level below it. Rejects empty names, unknown
    /// parents, parents already at the maximum depth, and name collisions.
    /// A rejected create leaves the set unchanged.
    pub fn create(&self, name: &str, parent_id: Option<u64>) -> Result<Category> {
        let name = valid_name(name)?;
        let mut inner = self.write()?;

        let depth = match parent_id {
            None => 0,
            Some(pid) => {
                let parent = inner
                    .categories
                    .iter()
                    .find(|c| c.id == pid)
                    .ok_or(TaxonError::ParentNotFound { id: pid })?;
                if !parent.can_have_children() {
                    return Err(TaxonError::MaxDepthExceeded { name, parent: pid });
                }
                parent.depth + 1
            }
        };

        if inner.categories.iter().any(|c| c.name == name) {
            return Err(TaxonError::DuplicateName { name });
        }

        let category = Category {
            id: inner.next_id,
            name,
            parent_id,
            depth,
            created_at: Utc::now(),
        };
        inner.next_id += 1;
        inner.categories.push(category.clone());

        if let Err(e) = self.persist(&inner) {
            inner.categories.pop();
            inner.next_id -= 1;
            return Err(e);
        }

        Ok(category)
    }

    /// Rename a category. Parent and depth are untouched; renaming to the
    /// current name is a no-op success.
    pub fn rename(&self, id: u64, new_name: &str) -> Result<Category> {
        let new_name = valid_name(new_name)?;
        let mut inner = self.write()?;

        let pos = inner
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or(TaxonError::CategoryNotFound { id })?;

        if inner
            .categories
            .iter()
            .any(|c| c.id != id && c.name == new_name)
        {
            return Err(TaxonError::DuplicateName { name: new_name });
        }

        if inner.categories[pos].name == new_name {
            return Ok(inner.categories[pos].clone());
        }

        let previous = std::mem::replace(&mut inner.categories[pos].name, new_name);
        if let Err(e) = self.persist(&inner) {
            inner.categories[pos].name = previous;
            return Err(e);
        }

        Ok(inner.categories[pos].clone())
    }

    /// Every category, in insertion order.
    pub fn all(&self) -> Result<Vec<Category>> {
        Ok(self.read()?.categories.clone())
    }

    /// Categories whose parent is `parent` (`None` selects the roots), in
    /// insertion order.
    pub fn children_of(&self, parent: Option<u64>) -> Result<Vec<Category>> {
        Ok(self
            .read()?
            .categories
            .iter()
            .filter(|c| c.parent_id == parent)
            .cloned()
            .collect())
    }

    /// Look up a category by id.
    pub fn get(&self, id: u64) -> Result<Option<Category>> {
        Ok(self.read()?.categories.iter().find(|c| c.id == id).cloned())
    }

    /// Look up a category by exact name.
    pub fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(self
            .read()?
            .categories
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    fn persist(&self, inner: &StoreInner) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = StoreFile {
            next_id: inner.next_id,
            categories: inner
                .categories
                .iter()
                .map(|c| StoredCategory {
                    id: c.id,
                    name: c.name.clone(),
                    parent_id: c.parent_id,
                    created_at: c.created_at,
                })
                .collect(),
        };
        let content = toml::to_string_pretty(&file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreInner>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreInner>> {
        self.inner.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> TaxonError {
    TaxonError::Storage {
        message: "category store lock poisoned".to_string(),
    }
}

fn corrupt(message: String) -> TaxonError {
    TaxonError::StoreCorrupt { message }
}

/// Recompute depths from the parent chain and re-check every invariant the
/// file could have lost to hand editing.
fn resolve_depths(records: &[StoredCategory]) -> Result<Vec<Category>> {
    let mut by_id: HashMap<u64, &StoredCategory> = HashMap::new();
    for record in records {
        if by_id.insert(record.id, record).is_some() {
            return Err(corrupt(format!("duplicate category id {}", record.id)));
        }
    }

    let mut names = HashSet::new();
    for record in records {
        if !names.insert(record.name.as_str()) {
            return Err(corrupt(format!(
                "duplicate category name '{}'",
                record.name
            )));
        }
    }

    records
        .iter()
        .map(|record| {
            let depth = chain_depth(&by_id, record)?;
            Ok(Category {
                id: record.id,
                name: record.name.clone(),
                parent_id: record.parent_id,
                depth,
                created_at: record.created_at,
            })
        })
        .collect()
}

/// Walk the parent chain up to the root. The hop limit also catches
/// cycles: a cyclic chain never terminates within MAX_DEPTH hops.
fn chain_depth(by_id: &HashMap<u64, &StoredCategory>, record: &StoredCategory) -> Result<u8> {
    let mut depth: u8 = 0;
    let mut current = record;
    while let Some(pid) = current.parent_id {
        depth += 1;
        if depth > MAX_DEPTH {
            return Err(corrupt(format!(
                "category {} nests deeper than {}",
                record.id, MAX_DEPTH
            )));
        }
        current = by_id.get(&pid).copied().ok_or_else(|| {
            corrupt(format!(
                "category {} references missing parent {}",
                record.id, pid
            ))
        })?;
    }
    Ok(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn empty_store() -> (TempDir, CategoryStore) {
        let temp = TempDir::new().unwrap();
        let store = CategoryStore::load(temp.path()).unwrap();
        (temp, store)
    }

    #[test]
    fn load_missing_file_is_empty_store() {
        let (_temp, store) = empty_store();
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn create_assigns_ids_and_depths() {
        let (_temp, store) = empty_store();

        let root = store.create("Electronics", None).unwrap();
        assert_eq!(root.id, 1);
        assert_eq!(root.depth, 0);
        assert!(root.is_root());

        let first = store.create("Laptops", Some(root.id)).unwrap();
        assert_eq!(first.id, 2);
        assert_eq!(first.depth, 1);

        let second = store.create("Gaming Laptops", Some(first.id)).unwrap();
        assert_eq!(second.id, 3);
        assert_eq!(second.depth, 2);

        for c in store.all().unwrap() {
            assert!(c.depth <= MAX_DEPTH);
        }
    }

    #[test]
    fn create_beyond_max_depth_fails_and_leaves_store_unchanged() {
        let (_temp, store) = empty_store();
        let root = store.create("Electronics", None).unwrap();
        let first = store.create("Laptops", Some(root.id)).unwrap();
        let second = store.create("Gaming Laptops", Some(first.id)).unwrap();

        let before = store.all().unwrap();
        let err = store.create("Ultra Gaming", Some(second.id)).unwrap_err();
        assert!(matches!(err, TaxonError::MaxDepthExceeded { parent, .. } if parent == second.id));
        assert_eq!(store.all().unwrap(), before);
    }

    #[test]
    fn duplicate_name_rejected_across_levels() {
        let (_temp, store) = empty_store();
        let root = store.create("Electronics", None).unwrap();

        // Same name as a root, attempted at depth 1
        let err = store.create("Electronics", Some(root.id)).unwrap_err();
        assert!(matches!(err, TaxonError::DuplicateName { .. }));

        // Second root with an existing name
        store.create("Phones", None).unwrap();
        let err = store.create("Phones", None).unwrap_err();
        assert!(matches!(err, TaxonError::DuplicateName { name } if name == "Phones"));
    }

    #[test]
    fn create_with_unknown_parent_fails() {
        let (_temp, store) = empty_store();
        let err = store.create("Laptops", Some(42)).unwrap_err();
        assert!(matches!(err, TaxonError::ParentNotFound { id: 42 }));
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn create_rejects_empty_name() {
        let (_temp, store) = empty_store();
        assert!(matches!(
            store.create("   ", None),
            Err(TaxonError::InvalidName { .. })
        ));
    }

    #[test]
    fn create_trims_name() {
        let (_temp, store) = empty_store();
        let c = store.create("  Electronics  ", None).unwrap();
        assert_eq!(c.name, "Electronics");
        assert!(matches!(
            store.create("Electronics", None),
            Err(TaxonError::DuplicateName { .. })
        ));
    }

    #[test]
    fn rename_keeps_parent_and_depth() {
        let (_temp, store) = empty_store();
        let root = store.create("Electronics", None).unwrap();
        let first = store.create("Laptops", Some(root.id)).unwrap();

        let renamed = store.rename(first.id, "Notebooks").unwrap();
        assert_eq!(renamed.name, "Notebooks");
        assert_eq!(renamed.parent_id, first.parent_id);
        assert_eq!(renamed.depth, first.depth);
        assert_eq!(renamed.created_at, first.created_at);
    }

    #[test]
    fn rename_unknown_id_fails() {
        let (_temp, store) = empty_store();
        let err = store.rename(9, "Anything").unwrap_err();
        assert!(matches!(err, TaxonError::CategoryNotFound { id: 9 }));
    }

    #[test]
    fn rename_to_taken_name_fails() {
        let (_temp, store) = empty_store();
        let a = store.create("Electronics", None).unwrap();
        store.create("Phones", None).unwrap();

        let err = store.rename(a.id, "Phones").unwrap_err();
        assert!(matches!(err, TaxonError::DuplicateName { .. }));
        assert_eq!(store.get(a.id).unwrap().unwrap().name, "Electronics");
    }

    #[test]
    fn rename_to_same_name_is_noop() {
        let (_temp, store) = empty_store();
        let a = store.create("Electronics", None).unwrap();
        let renamed = store.rename(a.id, "Electronics").unwrap();
        assert_eq!(renamed, a);
    }

    #[test]
    fn children_of_selects_by_parent() {
        let (_temp, store) = empty_store();
        let root = store.create("Electronics", None).unwrap();
        store.create("Phones", None).unwrap();
        let laptops = store.create("Laptops", Some(root.id)).unwrap();
        store.create("Desktops", Some(root.id)).unwrap();

        let roots = store.children_of(None).unwrap();
        assert_eq!(roots.len(), 2);

        let subs = store.children_of(Some(root.id)).unwrap();
        let names: Vec<_> = subs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Laptops", "Desktops"]);

        assert!(store.children_of(Some(laptops.id)).unwrap().is_empty());
    }

    #[test]
    fn lookup_by_id_and_name() {
        let (_temp, store) = empty_store();
        let root = store.create("Electronics", None).unwrap();

        assert_eq!(store.get(root.id).unwrap().unwrap().name, "Electronics");
        assert!(store.get(99).unwrap().is_none());
        assert_eq!(store.get_by_name("Electronics").unwrap().unwrap().id, root.id);
        assert!(store.get_by_name("electronics").unwrap().is_none());
    }

    #[test]
    fn save_load_roundtrip_recomputes_depth() {
        let temp = TempDir::new().unwrap();
        {
            let store = CategoryStore::load(temp.path()).unwrap();
            let root = store.create("Electronics", None).unwrap();
            let first = store.create("Laptops", Some(root.id)).unwrap();
            store.create("Gaming Laptops", Some(first.id)).unwrap();
        }

        let store = CategoryStore::load(temp.path()).unwrap();
        let all = store.all().unwrap();
        assert_eq!(all.len(), 3);
        let depths: Vec<_> = all.iter().map(|c| c.depth).collect();
        assert_eq!(depths, [0, 1, 2]);

        // Counter continues after the highest persisted id
        let next = store.create("Phones", None).unwrap();
        assert_eq!(next.id, 4);
    }

    #[test]
    fn load_rejects_dangling_parent() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(DEFAULT_STORE_FILE),
            r#"
next_id = 3

[[categories]]
id = 1
name = "Electronics"
parent_id = 2
created_at = "2026-01-01T00:00:00Z"
"#,
        )
        .unwrap();

        let err = CategoryStore::load(temp.path()).unwrap_err();
        assert!(matches!(err, TaxonError::StoreCorrupt { .. }));
    }

    #[test]
    fn load_rejects_duplicate_names() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(DEFAULT_STORE_FILE),
            r#"
next_id = 3

[[categories]]
id = 1
name = "Electronics"
created_at = "2026-01-01T00:00:00Z"

[[categories]]
id = 2
name = "Electronics"
created_at = "2026-01-01T00:00:00Z"
"#,
        )
        .unwrap();

        let err = CategoryStore::load(temp.path()).unwrap_err();
        assert!(matches!(err, TaxonError::StoreCorrupt { .. }));
    }

    #[test]
    fn load_rejects_overdeep_chain() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(DEFAULT_STORE_FILE),
            r#"
next_id = 5

[[categories]]
id = 1
name = "A"
created_at = "2026-01-01T00:00:00Z"

[[categories]]
id = 2
name = "B"
parent_id = 1
created_at = "2026-01-01T00:00:00Z"

[[categories]]
id = 3
name = "C"
parent_id = 2
created_at = "2026-01-01T00:00:00Z"

[[categories]]
id = 4
name = "D"
parent_id = 3
created_at = "2026-01-01T00:00:00Z"
"#,
        )
        .unwrap();

        let err = CategoryStore::load(temp.path()).unwrap_err();
        assert!(matches!(err, TaxonError::StoreCorrupt { .. }));
    }

    #[test]
    fn load_rejects_parent_cycle() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(DEFAULT_STORE_FILE),
            r#"
next_id = 3

[[categories]]
id = 1
name = "A"
parent_id = 2
created_at = "2026-01-01T00:00:00Z"

[[categories]]
id = 2
name = "B"
parent_id = 1
created_at = "2026-01-01T00:00:00Z"
"#,
        )
        .unwrap();

        let err = CategoryStore::load(temp.path()).unwrap_err();
        assert!(matches!(err, TaxonError::StoreCorrupt { .. }));
    }

    #[test]
    fn concurrent_creates_admit_one_winner() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(CategoryStore::load(temp.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.create("Electronics", None).is_ok())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(store.all().unwrap().len(), 1);
    }

    #[test]
    fn catalog_scenario_end_to_end() {
        let (_temp, store) = empty_store();

        let electronics = store.create("Electronics", None).unwrap();
        assert_eq!(electronics.depth, 0);
        let laptops = store.create("Laptops", Some(electronics.id)).unwrap();
        assert_eq!(laptops.depth, 1);
        let gaming = store.create("Gaming Laptops", Some(laptops.id)).unwrap();
        assert_eq!(gaming.depth, 2);

        let before = store.all().unwrap();
        assert!(matches!(
            store.create("Ultra Gaming", Some(gaming.id)),
            Err(TaxonError::MaxDepthExceeded { .. })
        ));
        assert_eq!(store.all().unwrap(), before);
    }
}
