//! Generated artifacts and their instances.
//!
//! An [`Artifact`] is one synthesized product: a name, the scope it was
//! defined in, the constructor shapes it accepts, and an opaque body
//! supplied by the synthesizer backend. Artifacts are shared via `Arc`;
//! the defining [`Scope`](crate::Scope) holds the only long-lived
//! strong reference, so dropping a scope reclaims everything defined in
//! it that callers no longer hold.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{GenerationError, GenerationResult, SynthesisError};
use crate::scope::Scope;

/// Type of one constructor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    Bool,
    Int,
    Float,
    Text,
    /// Opaque shared value; matched by slot type only.
    Handle,
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ArgType::Bool => "bool",
            ArgType::Int => "int",
            ArgType::Float => "float",
            ArgType::Text => "text",
            ArgType::Handle => "handle",
        };
        f.write_str(text)
    }
}

/// One constructor argument value.
#[derive(Clone)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Handle(Arc<dyn Any + Send + Sync>),
}

impl ArgValue {
    /// The slot type this value fills.
    pub fn arg_type(&self) -> ArgType {
        match self {
            ArgValue::Bool(_) => ArgType::Bool,
            ArgValue::Int(_) => ArgType::Int,
            ArgValue::Float(_) => ArgType::Float,
            ArgValue::Text(_) => ArgType::Text,
            ArgValue::Handle(_) => ArgType::Handle,
        }
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(v) => write!(f, "Bool({v})"),
            ArgValue::Int(v) => write!(f, "Int({v})"),
            ArgValue::Float(v) => write!(f, "Float({v})"),
            ArgValue::Text(v) => write!(f, "Text({v:?})"),
            ArgValue::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

/// Render an argument list as a type signature for error messages.
pub(crate) fn describe_args(args: &[ArgValue]) -> String {
    let types: Vec<String> = args.iter().map(|arg| arg.arg_type().to_string()).collect();
    types.join(", ")
}

/// The argument types accepted by one constructor of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorShape {
    params: Vec<ArgType>,
}

impl ConstructorShape {
    pub fn new(params: Vec<ArgType>) -> Self {
        ConstructorShape { params }
    }

    /// The zero-argument constructor.
    pub fn nullary() -> Self {
        ConstructorShape { params: Vec::new() }
    }

    pub fn params(&self) -> &[ArgType] {
        &self.params
    }

    /// Whether `args` matches this shape slot for slot.
    pub fn accepts(&self, args: &[ArgValue]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| *param == arg.arg_type())
    }
}

/// Backend-supplied behavior of a generated artifact.
///
/// The core never interprets the payloads a body produces; they flow
/// back to the caller inside an [`Instance`].
pub trait ArtifactBody: fmt::Debug + Send + Sync + 'static {
    /// Produce one instance payload. `args` has already been matched
    /// against one of the artifact's constructor shapes.
    fn instantiate(&self, args: &[ArgValue]) -> Result<Box<dyn Any + Send + Sync>, SynthesisError>;
}

/// A synthesized artifact: the cached unit of generation.
#[derive(Debug)]
pub struct Artifact {
    name: String,
    kind: &'static str,
    scope: Weak<Scope>,
    constructors: Vec<ConstructorShape>,
    body: Box<dyn ArtifactBody>,
}

impl Artifact {
    pub fn new(
        name: String,
        kind: &'static str,
        scope: Weak<Scope>,
        constructors: Vec<ConstructorShape>,
        body: Box<dyn ArtifactBody>,
    ) -> Self {
        Artifact {
            name,
            kind,
            scope,
            constructors,
            body,
        }
    }

    /// Fully qualified artifact name, unique within its defining scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generator kind that produced this artifact.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The defining scope, if it is still alive. Artifacts never keep
    /// their scope alive.
    pub fn scope(&self) -> Option<Arc<Scope>> {
        self.scope.upgrade()
    }

    pub fn constructors(&self) -> &[ConstructorShape] {
        &self.constructors
    }

    /// Create a fresh instance from `args`.
    ///
    /// Fails with [`GenerationError::IllegalReuse`] when no constructor
    /// shape accepts the argument types, and with
    /// [`GenerationError::Synthesis`] when the body itself rejects the
    /// instantiation.
    pub fn instantiate(self: &Arc<Self>, args: &[ArgValue]) -> GenerationResult<Instance> {
        let matched = self.constructors.iter().any(|shape| shape.accepts(args));
        if !matched {
            return Err(GenerationError::IllegalReuse {
                name: self.name.clone(),
                given: describe_args(args),
            });
        }
        let payload = self
            .body
            .instantiate(args)
            .map_err(|source| GenerationError::Synthesis {
                name: self.name.clone(),
                source,
            })?;
        Ok(Instance {
            artifact: Arc::clone(self),
            payload,
        })
    }
}

/// One live instance of an artifact.
///
/// Holds a strong reference to its artifact, so instances outlive cache
/// eviction and even scope teardown.
pub struct Instance {
    artifact: Arc<Artifact>,
    payload: Box<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn artifact(&self) -> &Arc<Artifact> {
        &self.artifact
    }

    /// Borrow the payload as a concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Mutably borrow the payload as a concrete type. Kinds use this to
    /// rebind per-instance state the shared body cannot carry.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.payload.downcast_mut::<T>()
    }

    pub fn into_payload(self) -> Box<dyn Any + Send + Sync> {
        self.payload
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("artifact", &self.artifact.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct EchoBody;

    impl ArtifactBody for EchoBody {
        fn instantiate(
            &self,
            args: &[ArgValue],
        ) -> Result<Box<dyn Any + Send + Sync>, SynthesisError> {
            if let Some(ArgValue::Text(text)) = args.first() {
                if text == "reject" {
                    return Err(SynthesisError::new("rejected by body"));
                }
            }
            Ok(Box::new(args.len()))
        }
    }

    fn artifact() -> Arc<Artifact> {
        let scope = Scope::new("test");
        Arc::new(Artifact::new(
            "a.B$$proxyByMimic$$1".to_string(),
            "proxy",
            Arc::downgrade(&scope),
            vec![
                ConstructorShape::nullary(),
                ConstructorShape::new(vec![ArgType::Text]),
            ],
            Box::new(EchoBody),
        ))
    }

    #[test]
    fn shape_matching_is_positional() {
        let shape = ConstructorShape::new(vec![ArgType::Int, ArgType::Bool]);
        assert!(shape.accepts(&[ArgValue::Int(1), ArgValue::Bool(true)]));
        assert!(!shape.accepts(&[ArgValue::Bool(true), ArgValue::Int(1)]));
        assert!(!shape.accepts(&[ArgValue::Int(1)]));
    }

    #[test]
    fn instantiate_matches_a_constructor_shape() {
        let artifact = artifact();
        let instance = artifact
            .instantiate(&[ArgValue::Text("hello".to_string())])
            .unwrap();
        assert_eq!(instance.downcast_ref::<usize>(), Some(&1));
        assert_eq!(instance.artifact().name(), "a.B$$proxyByMimic$$1");
    }

    #[test]
    fn unmatched_arguments_fail_with_the_offered_signature() {
        let artifact = artifact();
        let err = artifact.instantiate(&[ArgValue::Float(0.5)]).unwrap_err();
        assert_eq!(
            err,
            GenerationError::IllegalReuse {
                name: "a.B$$proxyByMimic$$1".to_string(),
                given: "float".to_string(),
            }
        );
    }

    #[test]
    fn body_failures_surface_as_synthesis_errors() {
        let artifact = artifact();
        let err = artifact
            .instantiate(&[ArgValue::Text("reject".to_string())])
            .unwrap_err();
        assert!(matches!(err, GenerationError::Synthesis { .. }));
    }

    #[test]
    fn instances_do_not_keep_the_scope_alive() {
        let artifact = artifact();
        assert!(artifact.scope().is_none());
    }
}
