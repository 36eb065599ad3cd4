//! Context threaded through in-progress syntheses.
//!
//! Each active synthesis carries a [`SynthesisContext`] linking back to
//! its requester, forming a borrow-chained stack per thread. The chain
//! is what lets the coordinator recognize a generation that depends on
//! itself and fail it with the offending path, and what gives nested
//! requests a sensible default scope: the scope currently being
//! generated into.

use std::sync::Arc;

use crate::artifact::Artifact;
use crate::coordinator::Coordinator;
use crate::error::GenerationResult;
use crate::key::CacheKey;
use crate::request::GenerationRequest;
use crate::scope::Scope;

/// One active generation: its cache key (absent for uncached requests)
/// and the name being defined.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) key: Option<CacheKey>,
    pub(crate) name: String,
}

/// Handle given to a [`Synthesizer`](crate::Synthesizer) for the
/// duration of one synthesis.
pub struct SynthesisContext<'a> {
    coordinator: &'a Coordinator,
    scope: &'a Arc<Scope>,
    frame: Frame,
    parent: Option<&'a SynthesisContext<'a>>,
}

impl<'a> SynthesisContext<'a> {
    pub(crate) fn new(
        coordinator: &'a Coordinator,
        scope: &'a Arc<Scope>,
        frame: Frame,
        parent: Option<&'a SynthesisContext<'a>>,
    ) -> Self {
        SynthesisContext {
            coordinator,
            scope,
            frame,
            parent,
        }
    }

    /// Name of the artifact currently being synthesized.
    pub fn artifact_name(&self) -> &str {
        &self.frame.name
    }

    /// Scope the artifact is being defined in.
    pub fn scope(&self) -> &Arc<Scope> {
        self.scope
    }

    /// Number of generations on this chain, including this one.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self;
        while let Some(parent) = current.parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Request a dependent artifact from within a synthesis.
    ///
    /// A request without an explicit scope inherits the scope currently
    /// being generated into. The dependent generation joins this
    /// chain, so a dependency that loops back onto an in-progress key
    /// fails with [`GenerationError::Recursive`] rather than waiting on
    /// itself.
    ///
    /// [`GenerationError::Recursive`]: crate::GenerationError::Recursive
    pub fn create_artifact(
        &self,
        mut request: GenerationRequest,
    ) -> GenerationResult<Arc<Artifact>> {
        if request.scope.is_none() {
            request.scope = Some(Arc::clone(self.scope));
        }
        self.coordinator.create_artifact_in(Some(self), &request)
    }

    /// Whether `key` is already being synthesized on this chain.
    pub(crate) fn chain_contains(&self, key: &CacheKey) -> bool {
        let mut current = Some(self);
        while let Some(cx) = current {
            if cx.frame.key.as_ref() == Some(key) {
                return true;
            }
            current = cx.parent;
        }
        false
    }

    /// Chain names from the outermost generation down to `tail`.
    pub(crate) fn path_with(&self, tail: &str) -> String {
        let mut names = vec![tail.to_string()];
        let mut current = Some(self);
        while let Some(cx) = current {
            names.push(cx.frame.name.clone());
            current = cx.parent;
        }
        names.reverse();
        names.join(" -> ")
    }
}
