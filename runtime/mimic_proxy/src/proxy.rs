//! Proxy building on top of the generation core.
//!
//! [`ProxyBuilder`] assembles a generation request for the proxy kind
//! and hands it to the kind's shared [`Coordinator`]. The artifact is
//! cached per (scope, shape); every `create` call instantiates a fresh
//! [`ProxyHandle`] from it.

use std::any::Any;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use mimic_core::{
    ArgType, ArgValue, Artifact, ArtifactBody, CallbackDescriptor, ConstructorShape, Coordinator,
    GenerationError, GenerationRequest, GenerationResult, Instance, NamingPolicy, ResolvedSpec,
    Scope, SynthesisContext, SynthesisError, SynthesisOutput, Synthesizer, TypeName,
};

use crate::callbacks::CallbackStyle;

/// Generator kind tag of proxies.
pub const PROXY_KIND: &str = "proxy";

fn coordinator() -> &'static Coordinator {
    static COORDINATOR: OnceLock<Coordinator> = OnceLock::new();
    COORDINATOR.get_or_init(|| Coordinator::new(PROXY_KIND, ProxySynthesizer))
}

/// Builder for one proxy request.
///
/// Defaults: caching on, factory surface on, default naming, scope
/// resolved through the ambient/library chain.
#[derive(Debug)]
pub struct ProxyBuilder {
    supertype: Option<TypeName>,
    interfaces: Vec<TypeName>,
    callbacks: Vec<CallbackStyle>,
    policy: Option<Arc<dyn NamingPolicy>>,
    scope: Option<Arc<Scope>>,
    name_prefix: Option<String>,
    name_suffix: Option<String>,
    factory_api: bool,
    use_cache: bool,
    attempt_load: bool,
}

impl ProxyBuilder {
    pub fn new() -> Self {
        ProxyBuilder {
            supertype: None,
            interfaces: Vec::new(),
            callbacks: Vec::new(),
            policy: None,
            scope: None,
            name_prefix: None,
            name_suffix: None,
            factory_api: true,
            use_cache: true,
            attempt_load: false,
        }
    }

    /// Nominal type the proxy extends; also the default name prefix.
    pub fn supertype(mut self, name: impl Into<String>) -> Self {
        self.supertype = Some(TypeName::new(name));
        self
    }

    /// Add one contract the proxy implements.
    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(TypeName::new(name));
        self
    }

    /// Add one behavior slot. At least one is required.
    pub fn callback(mut self, style: CallbackStyle) -> Self {
        self.callbacks.push(style);
        self
    }

    /// Replace the naming policy.
    pub fn naming_policy(mut self, policy: impl NamingPolicy) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    /// Pin the defining scope instead of resolving it ambiently.
    pub fn scope(mut self, scope: &Arc<Scope>) -> Self {
        self.scope = Some(Arc::clone(scope));
        self
    }

    /// Override the name prefix derived from the supertype.
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    /// Append a suffix to the proxy's name. Does not split the cache.
    pub fn name_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.name_suffix = Some(suffix.into());
        self
    }

    /// Whether the proxy exposes the factory surface. On by default.
    pub fn factory_api(mut self, enabled: bool) -> Self {
        self.factory_api = enabled;
        self
    }

    /// Toggle artifact caching. Off means every call synthesizes.
    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// Adopt an existing definition under the resolved name instead of
    /// synthesizing, when one is visible in the scope chain.
    pub fn attempt_load(mut self, enabled: bool) -> Self {
        self.attempt_load = enabled;
        self
    }

    /// Produce the underlying generation request.
    pub fn build_request(self) -> GenerationResult<GenerationRequest> {
        if self.callbacks.is_empty() {
            return Err(GenerationError::configuration(
                "at least one callback is required to build a proxy",
            ));
        }
        let mut request = GenerationRequest::new(PROXY_KIND);
        request.supertype = self.supertype;
        request.interfaces = self.interfaces;
        request.callbacks = self
            .callbacks
            .into_iter()
            .map(|style| Arc::new(style) as Arc<dyn CallbackDescriptor>)
            .collect();
        if let Some(policy) = self.policy {
            request.policy = policy;
        }
        request.scope = self.scope;
        request.name_prefix = self.name_prefix;
        request.name_suffix = self.name_suffix;
        request.factory_api = self.factory_api;
        request.use_cache = self.use_cache;
        request.attempt_load = self.attempt_load;
        Ok(request)
    }

    /// Build (or find) the proxy artifact and instantiate it with no
    /// backing target.
    pub fn create(self) -> GenerationResult<Instance> {
        self.create_with_args(&[])
    }

    /// Build (or find) the proxy artifact and instantiate it with
    /// `args`; proxies accept either no arguments or one backing
    /// target handle.
    ///
    /// The handle's slots are bound to this builder's callbacks. The
    /// artifact is shared with every style-equivalent builder and keeps
    /// the styles recorded when it was first synthesized.
    pub fn create_with_args(self, args: &[ArgValue]) -> GenerationResult<Instance> {
        let styles = self.callbacks.clone();
        let mut instance = coordinator().create_with_args(self.build_request()?, args)?;
        if let Some(handle) = instance.downcast_mut::<ProxyHandle>() {
            handle.callbacks = styles;
        }
        Ok(instance)
    }

    /// Build (or find) the proxy artifact without instantiating it.
    pub fn create_artifact(self) -> GenerationResult<Arc<Artifact>> {
        coordinator().create_artifact(self.build_request()?)
    }
}

impl Default for ProxyBuilder {
    fn default() -> Self {
        ProxyBuilder::new()
    }
}

/// One live proxy: the wired callback slots and the construction
/// arguments it was instantiated with.
///
/// Re-instantiation goes through [`Instance::artifact`]; proxies built
/// with the factory surface disabled record that in `factory_api`.
#[derive(Debug)]
pub struct ProxyHandle {
    pub callbacks: Vec<CallbackStyle>,
    pub construction_args: Vec<ArgValue>,
    pub factory_api: bool,
}

/// Synthesizer for the proxy kind.
struct ProxySynthesizer;

impl Synthesizer for ProxySynthesizer {
    fn synthesize(
        &self,
        _cx: &SynthesisContext<'_>,
        spec: &ResolvedSpec<'_>,
    ) -> Result<SynthesisOutput, SynthesisError> {
        let styles = spec
            .request
            .callbacks
            .iter()
            .map(|descriptor| {
                descriptor
                    .as_any()
                    .downcast_ref::<CallbackStyle>()
                    .cloned()
                    .ok_or_else(|| {
                        SynthesisError::new(format!(
                            "foreign callback descriptor `{}` in a proxy request",
                            descriptor.label()
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(name = spec.name, slots = styles.len(), "wiring proxy callbacks");
        Ok(SynthesisOutput {
            constructors: vec![
                ConstructorShape::nullary(),
                ConstructorShape::new(vec![ArgType::Handle]),
            ],
            body: Box::new(ProxyBody {
                styles,
                factory_api: spec.request.factory_api,
            }),
        })
    }
}

/// Body shared by every instance of one proxy artifact.
#[derive(Debug)]
struct ProxyBody {
    styles: Vec<CallbackStyle>,
    factory_api: bool,
}

impl ArtifactBody for ProxyBody {
    fn instantiate(
        &self,
        args: &[ArgValue],
    ) -> Result<Box<dyn Any + Send + Sync>, SynthesisError> {
        Ok(Box::new(ProxyHandle {
            callbacks: self.styles.clone(),
            construction_args: args.to_vec(),
            factory_api: self.factory_api,
        }))
    }
}
