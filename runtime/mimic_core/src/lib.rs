//! Mimic core - generation-key caching and artifact lifecycle for the
//! Mimic generator runtime.
//!
//! This crate provides:
//! - Cache keys over the structural fields of generation requests
//!   (`key`, [`CacheKey`])
//! - Defining scopes that own generated artifacts ([`Scope`])
//! - A per-scope, single-flight artifact cache behind a process-wide
//!   scope registry
//! - Naming policies with per-scope name reservation ([`NamingPolicy`])
//! - The generation coordinator tying the pieces together
//!   ([`Coordinator`])
//!
//! # Architecture
//!
//! A generator kind (proxy, dispatcher, ...) supplies a [`Synthesizer`]
//! and drives a [`Coordinator`]. For each request the coordinator
//! resolves a defining scope, consults the per-(scope, key) cache,
//! names the artifact, runs the synthesizer, and defines the result in
//! the scope. The cache and the registry hold only weak references;
//! scopes own artifacts, so dropping a scope reclaims its artifacts
//! and, on the next registry access, its cache state.
//!
//! # Thread Safety
//!
//! All public types are `Send + Sync`. Synthesis is serialized per
//! (scope, key) and concurrent for everything else. Failed or
//! panicking syntheses release their claim instead of poisoning it,
//! and re-entrant generation of an in-flight key fails with
//! [`GenerationError::Recursive`] rather than deadlocking.

mod artifact;
mod cache;
mod callback;
mod context;
mod coordinator;
mod error;
pub mod key;
mod names;
mod naming;
mod registry;
mod request;
mod scope;
mod synth;


#[cfg(test)]
mod test_helpers;

pub use artifact::{ArgType, ArgValue, Artifact, ArtifactBody, ConstructorShape, Instance};
pub use callback::CallbackDescriptor;
pub use context::SynthesisContext;
pub use coordinator::Coordinator;
pub use error::{GenerationError, GenerationResult, SynthesisError};
pub use key::CacheKey;
pub use naming::{DefaultNamingPolicy, NamingContext, NamingPolicy, PolicyIdentity};
pub use request::{GenerationRequest, TypeName};
pub use scope::{
    ambient_scope, clear_library_scope, install_library_scope, library_scope, AmbientScopeGuard,
    Scope, ScopeId,
};
pub use synth::{ResolvedSpec, SynthesisOutput, Synthesizer};
