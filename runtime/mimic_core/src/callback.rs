//! Erased callback descriptors.
//!
//! A generator kind describes the behaviors it will wire into an
//! artifact as a list of callback descriptors. Descriptors are key
//! material: two requests agree on a cache key only if their descriptor
//! lists agree element-wise under [`CallbackDescriptor::descriptor_eq`].
//! Equality is expected to capture the callback *kind*, not any
//! per-instance payload, so artifacts are shared across instances that
//! differ only in payload.

use std::any::Any;
use std::fmt;
use std::hash::Hasher;

/// One behavior slot requested for a generated artifact.
///
/// Implementations live in generator-kind crates; the core treats
/// descriptors as opaque values that can be compared and hashed for
/// cache-key purposes.
pub trait CallbackDescriptor: fmt::Debug + Send + Sync + 'static {
    /// Short human-readable label, used in diagnostics.
    fn label(&self) -> &'static str;

    /// Upcast for concrete-type recovery in `descriptor_eq` impls.
    fn as_any(&self) -> &dyn Any;

    /// Kind-level equality with another descriptor, of any concrete
    /// type. Implementations should downcast via [`Self::as_any`] and
    /// return `false` on a type mismatch.
    fn descriptor_eq(&self, other: &dyn CallbackDescriptor) -> bool;

    /// Feed the descriptor's kind identity into a hasher. Must be
    /// consistent with `descriptor_eq`: equal descriptors write equal
    /// bytes.
    fn descriptor_hash(&self, state: &mut dyn Hasher);
}

impl PartialEq for dyn CallbackDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor_eq(other)
    }
}

impl Eq for dyn CallbackDescriptor {}
