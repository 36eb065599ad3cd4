//! The synthesizer seam between the lifecycle core and generator
//! backends.
//!
//! The core owns everything up to the moment an artifact body must be
//! produced: scope resolution, caching, naming, recursion tracking.
//! A [`Synthesizer`] owns only that last step. Backends receive the
//! fully resolved inputs and hand back constructor shapes plus an
//! opaque body; they never see the cache or the name tables.

use std::sync::Arc;

use crate::artifact::{ArtifactBody, ConstructorShape};
use crate::context::SynthesisContext;
use crate::error::SynthesisError;
use crate::request::GenerationRequest;
use crate::scope::Scope;

/// Resolved inputs for one synthesis: the name the artifact will be
/// defined under, the originating request, and the defining scope.
#[derive(Debug)]
pub struct ResolvedSpec<'a> {
    pub name: &'a str,
    pub request: &'a GenerationRequest,
    pub scope: &'a Arc<Scope>,
}

/// Product of a successful synthesis.
#[derive(Debug)]
pub struct SynthesisOutput {
    /// Constructor shapes the artifact will accept. An artifact with
    /// no shapes can never be instantiated.
    pub constructors: Vec<ConstructorShape>,
    pub body: Box<dyn ArtifactBody>,
}

/// A generator backend.
///
/// Implementations may request dependent artifacts through the context;
/// the core detects cycles among such requests on the same thread and
/// fails them instead of deadlocking.
pub trait Synthesizer: Send + Sync + 'static {
    fn synthesize(
        &self,
        cx: &SynthesisContext<'_>,
        spec: &ResolvedSpec<'_>,
    ) -> Result<SynthesisOutput, SynthesisError>;
}

/// Shared synthesizers work anywhere an owned one does.
impl<S: Synthesizer + ?Sized> Synthesizer for Arc<S> {
    fn synthesize(
        &self,
        cx: &SynthesisContext<'_>,
        spec: &ResolvedSpec<'_>,
    ) -> Result<SynthesisOutput, SynthesisError> {
        (**self).synthesize(cx, spec)
    }
}
