//! Generation requests.
//!
//! A [`GenerationRequest`] is the full description of one desired
//! artifact: what to extend, which behaviors to wire in, how to name
//! the result, and how the lifecycle flags (`use_cache`,
//! `attempt_load`) shape the path through the coordinator. Generator
//! kind crates assemble requests through their own builders; the core
//! only reads them.

use std::fmt;
use std::sync::Arc;

use crate::callback::CallbackDescriptor;
use crate::naming::{DefaultNamingPolicy, NamingPolicy};
use crate::scope::Scope;

/// Dotted path of a nominal type, e.g. `service.Greeter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(path: impl Into<String>) -> Self {
        TypeName(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment: `service.Greeter` -> `Greeter`.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(path: &str) -> Self {
        TypeName::new(path)
    }
}

/// Everything the coordinator needs to produce one artifact.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Generator kind tag; namespaces cache keys and artifact names.
    pub kind: &'static str,
    /// Nominal type the artifact extends, if any.
    pub supertype: Option<TypeName>,
    /// Contracts the artifact implements, in declaration order. Order
    /// is key material: dispatch slots are assigned by position.
    pub interfaces: Vec<TypeName>,
    /// Behavior slots, in wiring order. Kind-level key material.
    pub callbacks: Vec<Arc<dyn CallbackDescriptor>>,
    /// Naming policy; its identity is key material.
    pub policy: Arc<dyn NamingPolicy>,
    /// Explicit defining scope. `None` falls back to the coordinator's
    /// default scope, then the library scope, then the ambient scope.
    pub scope: Option<Arc<Scope>>,
    /// Name prefix override. Empty or `None` derives the prefix from
    /// the supertype or the first interface.
    pub name_prefix: Option<String>,
    /// Name suffix, appended verbatim to proposed names. Unlike the
    /// prefix it is not key material.
    pub name_suffix: Option<String>,
    /// Whether the artifact exposes the factory surface. Key material:
    /// a factory-capable artifact is a different product.
    pub factory_api: bool,
    /// Consult and populate the per-scope cache. Off means every call
    /// synthesizes a fresh artifact and the key builder is never run.
    pub use_cache: bool,
    /// Before synthesizing, probe the scope chain for an existing
    /// definition under the resolved name and adopt it if present.
    pub attempt_load: bool,
}

impl GenerationRequest {
    /// A request with library defaults: caching on, no supertype, no
    /// callbacks, default naming.
    pub fn new(kind: &'static str) -> Self {
        GenerationRequest {
            kind,
            supertype: None,
            interfaces: Vec::new(),
            callbacks: Vec::new(),
            policy: Arc::new(DefaultNamingPolicy),
            scope: None,
            name_prefix: None,
            name_suffix: None,
            factory_api: false,
            use_cache: true,
            attempt_load: false,
        }
    }

    /// Name prefix after applying the derivation chain: explicit
    /// override, else supertype, else first interface, else empty (the
    /// naming policy chooses its own fallback).
    pub fn effective_prefix(&self) -> &str {
        if let Some(prefix) = &self.name_prefix {
            if !prefix.is_empty() {
                return prefix;
            }
        }
        if let Some(supertype) = &self.supertype {
            return supertype.as_str();
        }
        if let Some(first) = self.interfaces.first() {
            return first.as_str();
        }
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_name_is_the_last_segment() {
        assert_eq!(TypeName::new("service.Greeter").simple_name(), "Greeter");
        assert_eq!(TypeName::new("Greeter").simple_name(), "Greeter");
    }

    #[test]
    fn prefix_prefers_override_then_supertype_then_interface() {
        let mut request = GenerationRequest::new("proxy");
        assert_eq!(request.effective_prefix(), "");

        request.interfaces.push(TypeName::new("api.Readable"));
        assert_eq!(request.effective_prefix(), "api.Readable");

        request.supertype = Some(TypeName::new("service.Greeter"));
        assert_eq!(request.effective_prefix(), "service.Greeter");

        request.name_prefix = Some("custom.Prefix".to_string());
        assert_eq!(request.effective_prefix(), "custom.Prefix");
    }

    #[test]
    fn empty_override_is_ignored() {
        let mut request = GenerationRequest::new("proxy");
        request.supertype = Some(TypeName::new("service.Greeter"));
        request.name_prefix = Some(String::new());
        assert_eq!(request.effective_prefix(), "service.Greeter");
    }
}
