//! Registry of per-scope generation state.
//!
//! The registry is a weak side table: it maps a scope's identity to
//! the artifact cache and name reservations used when generating into
//! that scope, without ever keeping the scope alive. Entries for dead
//! scopes are swept on every access, so the table tracks at most the
//! set of scopes that were live at the previous call.
//!
//! Coordinators share one process-wide registry. Two coordinators of
//! the same kind generating into the same scope therefore share cache
//! entries, and artifacts cost one synthesis per scope regardless of
//! how many frontends request them.

use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::cache::ArtifactCache;
use crate::names::NameReservation;
use crate::scope::{Scope, ScopeId};

#[derive(Debug, Default)]
pub(crate) struct ScopeRegistry {
    states: Mutex<FxHashMap<ScopeId, ScopeState>>,
}

#[derive(Debug)]
struct ScopeState {
    scope: Weak<Scope>,
    cache: Arc<ArtifactCache>,
    names: Arc<NameReservation>,
}

impl ScopeRegistry {
    /// The process-wide registry.
    pub(crate) fn global() -> &'static ScopeRegistry {
        static REGISTRY: OnceLock<ScopeRegistry> = OnceLock::new();
        REGISTRY.get_or_init(ScopeRegistry::default)
    }

    /// Cache and name state for `scope`, creating it on first use.
    /// Sweeps state of scopes that have died since the last access.
    pub(crate) fn state_for(
        &self,
        scope: &Arc<Scope>,
    ) -> (Arc<ArtifactCache>, Arc<NameReservation>) {
        let mut states = self.states.lock();
        states.retain(|_, state| state.scope.upgrade().is_some());
        let state = states.entry(scope.id()).or_insert_with(|| ScopeState {
            scope: Arc::downgrade(scope),
            cache: Arc::new(ArtifactCache::default()),
            names: Arc::new(NameReservation::default()),
        });
        (Arc::clone(&state.cache), Arc::clone(&state.names))
    }

    #[cfg(test)]
    pub(crate) fn tracked_scopes(&self) -> usize {
        self.states.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_stable_per_scope() {
        let registry = ScopeRegistry::default();
        let scope = Scope::new("app");
        let (cache_a, names_a) = registry.state_for(&scope);
        let (cache_b, names_b) = registry.state_for(&scope);
        assert!(Arc::ptr_eq(&cache_a, &cache_b));
        assert!(Arc::ptr_eq(&names_a, &names_b));
        assert_eq!(registry.tracked_scopes(), 1);
    }

    #[test]
    fn scopes_with_equal_labels_are_distinct() {
        let registry = ScopeRegistry::default();
        let first = Scope::new("app");
        let second = Scope::new("app");
        let (cache_a, _) = registry.state_for(&first);
        let (cache_b, _) = registry.state_for(&second);
        assert!(!Arc::ptr_eq(&cache_a, &cache_b));
        assert_eq!(registry.tracked_scopes(), 2);
    }

    #[test]
    fn dead_scope_state_is_swept_on_access() {
        let registry = ScopeRegistry::default();
        let scope = Scope::new("short-lived");
        registry.state_for(&scope);
        drop(scope);

        let survivor = Scope::new("survivor");
        registry.state_for(&survivor);
        assert_eq!(registry.tracked_scopes(), 1);
    }

    #[test]
    fn registry_does_not_keep_scopes_alive() {
        let registry = ScopeRegistry::default();
        let scope = Scope::new("app");
        let weak = Arc::downgrade(&scope);
        registry.state_for(&scope);
        drop(scope);
        assert!(weak.upgrade().is_none());
    }
}
