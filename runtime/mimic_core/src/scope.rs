//! Defining scopes for generated artifacts.
//!
//! A [`Scope`] owns the artifacts defined in it, the way a module
//! registry owns the definitions loaded into it: dropping the scope
//! drops every artifact that callers are not holding on to. Scopes are
//! arranged in an optional parent chain; [`Scope::find`] delegates to
//! the parent before consulting its own definitions, so a child never
//! shadows a name the parent already defines.
//!
//! Two process-wide lookups mirror how embedders usually pick a scope
//! without passing one around: a per-thread ambient scope stack
//! (entered via [`Scope::enter_ambient`]) and a single library scope
//! installed by the embedder ([`install_library_scope`]). Both hold
//! weak references only; neither keeps a scope alive.
//!
//! # Thread Safety
//!
//! `Scope` is `Send + Sync`; the definition arena is guarded by a
//! mutex. The ambient stack is thread-local by design, and the library
//! scope slot is guarded by an `RwLock`.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::artifact::Artifact;

/// Stable identity of a scope for the lifetime of the process.
///
/// Identity is a monotonic counter rather than the allocation address,
/// so a scope that died can never be confused with a newer scope that
/// happens to reuse its memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

/// A defining scope: owner and namespace of generated artifacts.
#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    label: String,
    parent: Option<Arc<Scope>>,
    arena: Mutex<FxHashMap<String, Arc<Artifact>>>,
}

impl Scope {
    /// Create a root scope.
    pub fn new(label: impl Into<String>) -> Arc<Self> {
        Scope::build(label.into(), None)
    }

    /// Create a scope that delegates lookups to `parent`.
    pub fn with_parent(label: impl Into<String>, parent: &Arc<Scope>) -> Arc<Self> {
        Scope::build(label.into(), Some(Arc::clone(parent)))
    }

    fn build(label: String, parent: Option<Arc<Scope>>) -> Arc<Self> {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Arc::new(Scope {
            id: ScopeId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            label,
            parent,
            arena: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Human-readable label used in diagnostics and error messages.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<&Arc<Scope>> {
        self.parent.as_ref()
    }

    /// Record an artifact in this scope. Returns `false` without
    /// replacing anything if the name is already defined here.
    pub fn define(&self, artifact: Arc<Artifact>) -> bool {
        let mut arena = self.arena.lock();
        if arena.contains_key(artifact.name()) {
            return false;
        }
        arena.insert(artifact.name().to_string(), artifact);
        true
    }

    /// Whether `name` is defined in this scope itself, ignoring the
    /// parent chain. Name uniqueness is per defining scope.
    pub fn is_defined(&self, name: &str) -> bool {
        self.arena.lock().contains_key(name)
    }

    /// Look up a definition, delegating parent-first.
    pub fn find(&self, name: &str) -> Option<Arc<Artifact>> {
        if let Some(parent) = &self.parent {
            if let Some(found) = parent.find(name) {
                return Some(found);
            }
        }
        self.arena.lock().get(name).cloned()
    }

    /// Enter `scope` as the current thread's ambient scope until the
    /// returned guard drops. Entries nest; the innermost live entry
    /// wins.
    pub fn enter_ambient(scope: &Arc<Scope>) -> AmbientScopeGuard {
        AMBIENT.with(|stack| stack.borrow_mut().push(Arc::downgrade(scope)));
        AmbientScopeGuard {
            _not_send: PhantomData,
        }
    }

    #[cfg(test)]
    #[expect(dead_code, reason = "Test helper kept for ad-hoc assertions")]
    pub(crate) fn defined_count(&self) -> usize {
        self.arena.lock().len()
    }
}

thread_local! {
    static AMBIENT: RefCell<Vec<Weak<Scope>>> = const { RefCell::new(Vec::new()) };
}

/// Innermost live ambient scope of the current thread, if any.
pub fn ambient_scope() -> Option<Arc<Scope>> {
    AMBIENT.with(|stack| {
        stack.borrow().iter().rev().find_map(Weak::upgrade)
    })
}

/// Removes its ambient-scope entry when dropped.
#[must_use = "the ambient scope is active only while the guard lives"]
#[derive(Debug)]
pub struct AmbientScopeGuard {
    // Ambient entries are per-thread; the guard must drop on the
    // thread that created it.
    _not_send: PhantomData<*const ()>,
}

impl Drop for AmbientScopeGuard {
    fn drop(&mut self) {
        AMBIENT.with(|stack| stack.borrow_mut().pop());
    }
}

static LIBRARY_SCOPE: RwLock<Option<Weak<Scope>>> = RwLock::new(None);

/// Install `scope` as the process-wide fallback scope. Held weakly;
/// requests fall through to a configuration error once it dies.
pub fn install_library_scope(scope: &Arc<Scope>) {
    *LIBRARY_SCOPE.write() = Some(Arc::downgrade(scope));
}

/// Remove the library scope installed by [`install_library_scope`].
pub fn clear_library_scope() {
    *LIBRARY_SCOPE.write() = None;
}

/// The installed library scope, if it is still alive.
pub fn library_scope() -> Option<Arc<Scope>> {
    LIBRARY_SCOPE.read().as_ref().and_then(Weak::upgrade)
}

/// Serializes tests that touch the process-wide library scope slot.
#[cfg(test)]
pub(crate) fn library_test_lock() -> &'static Mutex<()> {
    static LOCK: Mutex<()> = Mutex::new(());
    &LOCK
}
