//! Caller-side collaborator contracts.
//!
//! The store performs no authentication and emits no events of its own.
//! The surrounding application checks an [`AuthGate`] before invoking a
//! mutation and tells its [`CacheInvalidator`] to drop cached views after
//! one succeeds. Both ship with inert defaults for embedders that need
//! neither.

/// Cache scope covering every category-derived view.
pub const CATEGORY_SCOPE: &str = "categories";

/// Mutating actions a caller may need clearance for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateCategory,
    RenameCategory,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCategory => "create-category",
            Self::RenameCategory => "rename-category",
        }
    }
}

/// Authentication/authorization checks, consulted by the caller before a
/// mutation reaches the store.
pub trait AuthGate {
    fn is_authenticated(&self) -> bool;
    fn is_authorized(&self, action: Action) -> bool;
}

/// Gate that lets everything through. Suits single-operator CLI use.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AuthGate for AllowAll {
    fn is_authenticated(&self) -> bool {
        true
    }

    fn is_authorized(&self, _action: Action) -> bool {
        true
    }
}

/// Invalidates cached views after a successful mutation.
pub trait CacheInvalidator {
    fn invalidate(&self, scope_key: &str);
}

/// Invalidator for callers with nothing cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInvalidator;

impl CacheInvalidator for NoopInvalidator {
    fn invalidate(&self, _scope_key: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_all_clears_every_action() {
        let gate = AllowAll;
        assert!(gate.is_authenticated());
        assert!(gate.is_authorized(Action::CreateCategory));
        assert!(gate.is_authorized(Action::RenameCategory));
    }

    #[test]
    fn action_names() {
        assert_eq!(Action::CreateCategory.as_str(), "create-category");
        assert_eq!(Action::RenameCategory.as_str(), "rename-category");
    }
}
