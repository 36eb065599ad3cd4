//! Error types for generation requests.
//!
//! Every failure crossing the coordinator boundary is normalized to one
//! of the [`GenerationError`] kinds. Synthesizer backends report their
//! own failures as [`SynthesisError`], which the coordinator wraps; no
//! backend-specific error type leaks through the public API.

use thiserror::Error;

/// Result alias for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Failure of a `create`/`create_artifact` call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The request cannot be executed as configured: no defining scope
    /// could be resolved, or the request's structural fields are
    /// self-contradictory (for example a proxy request with zero
    /// callback descriptors). Never retried internally.
    #[error("invalid generation request: {message}")]
    Configuration { message: String },

    /// The synthesizer failed while producing the artifact. Nothing is
    /// cached for the key, so a later call with the same request
    /// retries synthesis from scratch.
    #[error("synthesis of `{name}` failed: {source}")]
    Synthesis {
        name: String,
        source: SynthesisError,
    },

    /// A proposed artifact name is already taken in the target scope
    /// and the naming policy offered no alternative. Usually indicates
    /// a custom naming policy that ignores its availability predicate.
    #[error("artifact name `{name}` is already taken in scope `{scope}`")]
    NameCollision { name: String, scope: String },

    /// Constructor arguments do not match any constructor shape
    /// recorded for the artifact.
    #[error("no constructor of `{name}` accepts ({given})")]
    IllegalReuse { name: String, given: String },

    /// Generation of a key re-entered itself while still in progress on
    /// the same thread. Raised instead of deadlocking when a
    /// synthesizer (directly or through a dependent type) requests the
    /// artifact it is currently producing.
    #[error("recursive generation detected: {path}")]
    Recursive { path: String },
}

impl GenerationError {
    /// Build a [`GenerationError::Configuration`] from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        GenerationError::Configuration {
            message: message.into(),
        }
    }
}

/// Opaque failure reported by a [`Synthesizer`](crate::Synthesizer).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SynthesisError {
    message: String,
}

impl SynthesisError {
    /// Create a synthesis error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        SynthesisError {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
