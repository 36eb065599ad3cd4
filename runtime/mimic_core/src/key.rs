//! Cache keys for generation requests.
//!
//! [`build`] projects a [`GenerationRequest`] onto the fields that
//! determine artifact identity: generator kind, name prefix, supertype,
//! the interface list in declaration order, callback kinds, naming
//! policy identity, and the factory flag. Interface order is real
//! identity, not noise: slot assignment in the generated dispatch
//! tables follows declaration order, so reordering produces a different
//! artifact.
//!
//! Lifecycle fields (`scope`, `use_cache`, `attempt_load`) are
//! deliberately not key material: the cache is already per scope, and
//! the other two only choose a path through the coordinator. The name
//! suffix stays out too; it decorates the name without changing what
//! is generated.
//!
//! Keys precompute their hash once; clones share the underlying parts.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::callback::CallbackDescriptor;
use crate::naming::PolicyIdentity;
use crate::request::{GenerationRequest, TypeName};

/// Identity of one cacheable generation request.
#[derive(Debug, Clone)]
pub struct CacheKey {
    hash: u64,
    parts: Arc<KeyParts>,
}

#[derive(Debug, PartialEq, Eq)]
struct KeyParts {
    kind: &'static str,
    prefix: String,
    supertype: Option<TypeName>,
    interfaces: Vec<TypeName>,
    callbacks: Vec<Arc<dyn CallbackDescriptor>>,
    policy: PolicyIdentity,
    factory_api: bool,
}

impl CacheKey {
    /// Precomputed hash over all key material. Also feeds default
    /// artifact names.
    pub fn digest(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && (Arc::ptr_eq(&self.parts, &other.parts) || self.parts == other.parts)
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Build the cache key for `request`.
pub fn build(request: &GenerationRequest) -> CacheKey {
    let parts = KeyParts {
        kind: request.kind,
        prefix: request.effective_prefix().to_string(),
        supertype: request.supertype.clone(),
        interfaces: request.interfaces.clone(),
        callbacks: request.callbacks.clone(),
        policy: request.policy.identity(),
        factory_api: request.factory_api,
    };
    CacheKey {
        hash: hash_parts(&parts),
        parts: Arc::new(parts),
    }
}

/// Stable digest for naming uncached requests, where [`build`] is
/// never consulted. Depends only on the request's shape, so repeated
/// uncached calls propose the same base name and `attempt_load` can
/// find earlier definitions.
pub fn naming_digest(request: &GenerationRequest) -> u64 {
    let mut hasher = FxHasher::default();
    request.kind.hash(&mut hasher);
    request.effective_prefix().hash(&mut hasher);
    request.supertype.hash(&mut hasher);
    request.interfaces.hash(&mut hasher);
    hasher.finish()
}

fn hash_parts(parts: &KeyParts) -> u64 {
    let mut hasher = FxHasher::default();
    parts.kind.hash(&mut hasher);
    parts.prefix.hash(&mut hasher);
    parts.supertype.hash(&mut hasher);
    parts.interfaces.hash(&mut hasher);
    hasher.write_usize(parts.callbacks.len());
    for callback in &parts.callbacks {
        callback.descriptor_hash(&mut hasher);
    }
    parts.policy.hash(&mut hasher);
    parts.factory_api.hash(&mut hasher);
    hasher.finish()
}
