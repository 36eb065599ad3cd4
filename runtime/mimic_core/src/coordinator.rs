//! The generation coordinator.
//!
//! A [`Coordinator`] ties the lifecycle pieces together: it resolves a
//! defining scope for each request, keys the request, consults the
//! per-scope cache, names the artifact, drives the synthesizer, and
//! defines the result in the scope. One coordinator serves one
//! generator kind and any number of scopes.
//!
//! The pipeline for a cached request:
//!
//! 1. resolve the defining scope (request, then the coordinator's
//!    default, then the library scope, then the thread's ambient
//!    scope);
//! 2. build the cache key and return any live cached artifact;
//! 3. otherwise claim the key, resolve and reserve a name, optionally
//!    adopt an existing definition (`attempt_load`), and run the
//!    synthesizer;
//! 4. define the artifact in the scope, install a weak cache entry, and
//!    wake waiters on the key.
//!
//! Uncached requests run the same steps minus the key and the claim:
//! the key builder is never consulted, every call synthesizes a fresh
//! artifact, and the reserved-name suffixing keeps the results apart.
//!
//! # Thread Safety
//!
//! `Coordinator` is `Send + Sync`; all entry points take `&self`.
//! Synthesis is serialized per (scope, key). Requests for other keys
//! never wait, and a synthesizer panic releases the key's claim during
//! unwinding, so waiters retry instead of hanging.

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::debug;

use crate::artifact::{ArgValue, Artifact, Instance};
use crate::context::{Frame, SynthesisContext};
use crate::error::{GenerationError, GenerationResult};
use crate::key::{self, CacheKey};
use crate::names::NameReservation;
use crate::naming::NamingContext;
use crate::registry::ScopeRegistry;
use crate::request::GenerationRequest;
use crate::scope::{self, Scope};
use crate::synth::{ResolvedSpec, Synthesizer};

/// Entry point for one generator kind.
pub struct Coordinator {
    kind: &'static str,
    synthesizer: Box<dyn Synthesizer>,
    default_scope: Option<Weak<Scope>>,
}

impl Coordinator {
    pub fn new(kind: &'static str, synthesizer: impl Synthesizer) -> Self {
        Coordinator {
            kind,
            synthesizer: Box::new(synthesizer),
            default_scope: None,
        }
    }

    /// A coordinator with a kind-level fallback scope, consulted when a
    /// request names no scope of its own. Held weakly; once the scope
    /// dies, resolution falls through to the library and ambient
    /// scopes.
    pub fn with_default_scope(
        kind: &'static str,
        synthesizer: impl Synthesizer,
        scope: &Arc<Scope>,
    ) -> Self {
        Coordinator {
            kind,
            synthesizer: Box::new(synthesizer),
            default_scope: Some(Arc::downgrade(scope)),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Produce the artifact for `request` and instantiate it with no
    /// arguments.
    pub fn create(&self, request: GenerationRequest) -> GenerationResult<Instance> {
        self.create_with_args(request, &[])
    }

    /// Produce the artifact for `request` and instantiate it with
    /// `args`. The artifact is cached; the instance is always fresh.
    pub fn create_with_args(
        &self,
        request: GenerationRequest,
        args: &[ArgValue],
    ) -> GenerationResult<Instance> {
        let artifact = self.create_artifact(request)?;
        artifact.instantiate(args)
    }

    /// Produce (or find) the artifact for `request` without
    /// instantiating it.
    pub fn create_artifact(&self, request: GenerationRequest) -> GenerationResult<Arc<Artifact>> {
        self.create_artifact_in(None, &request)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(kind = self.kind, target = %display_target(request)))]
    pub(crate) fn create_artifact_in(
        &self,
        parent: Option<&SynthesisContext<'_>>,
        request: &GenerationRequest,
    ) -> GenerationResult<Arc<Artifact>> {
        if request.kind != self.kind {
            return Err(GenerationError::configuration(format!(
                "request kind `{}` does not match coordinator kind `{}`",
                request.kind, self.kind
            )));
        }
        let scope = self.resolve_scope(request)?;
        let (cache, names) = ScopeRegistry::global().state_for(&scope);

        if !request.use_cache {
            let digest = key::naming_digest(request);
            return self.synthesize_into(&scope, &names, request, digest, None, parent);
        }

        let cache_key = key::build(request);
        let display = display_target(request);
        if let Some(cx) = parent {
            if cx.chain_contains(&cache_key) {
                return Err(GenerationError::Recursive {
                    path: cx.path_with(&display),
                });
            }
        }
        cache.get_or_synthesize(
            &cache_key,
            || GenerationError::Recursive {
                path: match parent {
                    Some(cx) => cx.path_with(&display),
                    None => display.clone(),
                },
            },
            || {
                self.synthesize_into(
                    &scope,
                    &names,
                    request,
                    cache_key.digest(),
                    Some(&cache_key),
                    parent,
                )
            },
        )
    }

    /// The claimed-key slow path: name, optionally adopt, synthesize,
    /// define.
    fn synthesize_into(
        &self,
        scope: &Arc<Scope>,
        names: &NameReservation,
        request: &GenerationRequest,
        digest: u64,
        cache_key: Option<&CacheKey>,
        parent: Option<&SynthesisContext<'_>>,
    ) -> GenerationResult<Arc<Artifact>> {
        let name = self.resolve_name(scope, names, request, digest)?;

        if request.attempt_load {
            if let Some(existing) = scope.find(&name) {
                debug!(name = %name, "adopted existing artifact");
                return Ok(existing);
            }
        }

        let frame = Frame {
            key: cache_key.cloned(),
            name: name.clone(),
        };
        let cx = SynthesisContext::new(self, scope, frame, parent);
        let spec = ResolvedSpec {
            name: &name,
            request,
            scope,
        };
        debug!(name = %name, "synthesizing artifact");
        let output = self
            .synthesizer
            .synthesize(&cx, &spec)
            .map_err(|source| GenerationError::Synthesis {
                name: name.clone(),
                source,
            })?;

        let artifact = Arc::new(Artifact::new(
            name,
            self.kind,
            Arc::downgrade(scope),
            output.constructors,
            output.body,
        ));
        if !scope.define(Arc::clone(&artifact)) {
            return Err(GenerationError::NameCollision {
                name: artifact.name().to_string(),
                scope: scope.label().to_string(),
            });
        }
        Ok(artifact)
    }

    /// Pick a name through the request's policy and reserve it.
    fn resolve_name(
        &self,
        scope: &Arc<Scope>,
        names: &NameReservation,
        request: &GenerationRequest,
        digest: u64,
    ) -> GenerationResult<String> {
        let taken = |candidate: &str| names.is_taken(candidate);
        let name = request.policy.artifact_name(&NamingContext {
            kind: self.kind,
            prefix: request.effective_prefix(),
            suffix: request.name_suffix.as_deref().unwrap_or(""),
            digest,
            taken: &taken,
        });
        if !names.reserve(&name) {
            return Err(GenerationError::NameCollision {
                name,
                scope: scope.label().to_string(),
            });
        }
        Ok(name)
    }

    /// Resolution chain: request scope, then the coordinator's default
    /// scope, then the library scope, then the thread's ambient scope.
    fn resolve_scope(&self, request: &GenerationRequest) -> GenerationResult<Arc<Scope>> {
        if let Some(explicit) = &request.scope {
            return Ok(Arc::clone(explicit));
        }
        if let Some(default) = self.default_scope.as_ref().and_then(Weak::upgrade) {
            return Ok(default);
        }
        if let Some(library) = scope::library_scope() {
            return Ok(library);
        }
        if let Some(ambient) = scope::ambient_scope() {
            return Ok(ambient);
        }
        Err(GenerationError::configuration(
            "cannot determine a defining scope: set one on the request or the \
             coordinator, install a library scope, or enter an ambient scope",
        ))
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Best human-readable handle for a request before it has a name.
fn display_target(request: &GenerationRequest) -> String {
    let prefix = request.effective_prefix();
    if prefix.is_empty() {
        format!("<{}>", request.kind)
    } else {
        prefix.to_string()
    }
}
