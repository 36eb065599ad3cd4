//! Test doubles shared by the lifecycle tests.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::artifact::{ArgValue, ArtifactBody, ConstructorShape};
use crate::context::SynthesisContext;
use crate::error::SynthesisError;
use crate::request::{GenerationRequest, TypeName};
use crate::scope::Scope;
use crate::synth::{ResolvedSpec, SynthesisOutput, Synthesizer};

type Hook = Box<
    dyn Fn(&SynthesisContext<'_>, &ResolvedSpec<'_>) -> Result<(), SynthesisError> + Send + Sync,
>;

/// Scripted synthesizer: counts calls, optionally fails the next N
/// syntheses, optionally runs a hook inside each synthesis.
pub(crate) struct StubSynthesizer {
    calls: AtomicUsize,
    fail_remaining: AtomicUsize,
    hook: Option<Hook>,
}

impl StubSynthesizer {
    pub(crate) fn new() -> Self {
        StubSynthesizer {
            calls: AtomicUsize::new(0),
            fail_remaining: AtomicUsize::new(0),
            hook: None,
        }
    }

    /// Fail the next `count` syntheses with a stubbed error.
    pub(crate) fn failing(count: usize) -> Self {
        StubSynthesizer {
            calls: AtomicUsize::new(0),
            fail_remaining: AtomicUsize::new(count),
            hook: None,
        }
    }

    /// Run `hook` inside every synthesis, before producing the output.
    pub(crate) fn with_hook(
        hook: impl Fn(&SynthesisContext<'_>, &ResolvedSpec<'_>) -> Result<(), SynthesisError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        StubSynthesizer {
            calls: AtomicUsize::new(0),
            fail_remaining: AtomicUsize::new(0),
            hook: Some(Box::new(hook)),
        }
    }

    /// Number of syntheses that started.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Synthesizer for StubSynthesizer {
    fn synthesize(
        &self,
        cx: &SynthesisContext<'_>,
        spec: &ResolvedSpec<'_>,
    ) -> Result<SynthesisOutput, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(SynthesisError::new("stubbed failure"));
        }
        if let Some(hook) = &self.hook {
            hook(cx, spec)?;
        }
        Ok(SynthesisOutput {
            constructors: vec![
                ConstructorShape::nullary(),
                ConstructorShape::new(vec![crate::artifact::ArgType::Int]),
            ],
            body: Box::new(StubBody {
                artifact: spec.name.to_string(),
            }),
        })
    }
}

/// Body whose payloads record the artifact name and argument count.
#[derive(Debug)]
pub(crate) struct StubBody {
    pub(crate) artifact: String,
}

impl ArtifactBody for StubBody {
    fn instantiate(
        &self,
        args: &[ArgValue],
    ) -> Result<Box<dyn Any + Send + Sync>, SynthesisError> {
        Ok(Box::new(StubPayload {
            artifact: self.artifact.clone(),
            args: args.len(),
        }))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct StubPayload {
    pub(crate) artifact: String,
    pub(crate) args: usize,
}

/// A cached proxy request targeting `supertype`, pinned to `scope`.
pub(crate) fn proxy_request(scope: &Arc<Scope>, supertype: &str) -> GenerationRequest {
    let mut request = GenerationRequest::new("proxy");
    request.supertype = Some(TypeName::new(supertype));
    request.scope = Some(Arc::clone(scope));
    request
}
