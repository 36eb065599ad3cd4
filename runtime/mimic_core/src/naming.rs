//! Artifact naming policies.
//!
//! The coordinator resolves every artifact's name through a
//! [`NamingPolicy`] before synthesis starts. Policies see the requested
//! prefix, the generator kind, a stable digest of the request, and a
//! predicate over names already taken in the target scope; they must
//! return a name the predicate rejects as taken only if they want the
//! request to fail with a collision.
//!
//! Policy identity is key material: two requests that differ only in
//! naming policy produce distinct cache keys, so swapping policies
//! never makes a request observe an artifact named by another policy.

use std::any::TypeId;

/// Inputs available to a naming policy for one artifact.
pub struct NamingContext<'a> {
    /// Generator kind tag, e.g. `"proxy"`.
    pub kind: &'a str,
    /// Requested name prefix, already resolved against the request's
    /// supertype and interfaces. May be empty.
    pub prefix: &'a str,
    /// Requested name suffix. May be empty; policies that honor it
    /// append it verbatim.
    pub suffix: &'a str,
    /// Stable digest of the request, mixed into the name so distinct
    /// requests sharing a prefix rarely contend for the same base name.
    pub digest: u64,
    /// Returns `true` if a candidate name is already taken in the
    /// target scope.
    pub taken: &'a dyn Fn(&str) -> bool,
}

/// Chooses fully qualified names for generated artifacts.
pub trait NamingPolicy: std::fmt::Debug + Send + Sync + 'static {
    /// Produce a name for the artifact described by `cx`. The returned
    /// name should be free per `cx.taken`; returning a taken name fails
    /// the generation with a collision error instead of looping.
    fn artifact_name(&self, cx: &NamingContext<'_>) -> String;

    /// Value identity of this policy for cache-key purposes.
    ///
    /// Implementations whose behavior depends on configuration should
    /// fold that configuration into the discriminant via
    /// [`PolicyIdentity::with_discriminant`].
    fn identity(&self) -> PolicyIdentity;
}

/// Cache-key identity of a naming policy: the policy's concrete type
/// plus an implementation-chosen discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolicyIdentity {
    type_id: TypeId,
    discriminant: u64,
}

impl PolicyIdentity {
    /// Identity for a stateless policy type.
    pub fn of<P: NamingPolicy>() -> Self {
        PolicyIdentity {
            type_id: TypeId::of::<P>(),
            discriminant: 0,
        }
    }

    /// Identity for a configured policy type; equal configurations
    /// must map to equal discriminants.
    pub fn with_discriminant<P: NamingPolicy>(discriminant: u64) -> Self {
        PolicyIdentity {
            type_id: TypeId::of::<P>(),
            discriminant,
        }
    }
}

/// Roots reserved for the platform; names under them are escaped so a
/// generated artifact can never shadow a platform path.
const RESERVED_ROOTS: &[&str] = &["std", "core", "alloc"];

/// Default naming scheme: `{prefix}$${kind}ByMimic$${digest:x}{suffix}`,
/// with `_2`, `_3`, ... appended while the base name is taken.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultNamingPolicy;

impl DefaultNamingPolicy {
    /// Tag appended after the generator kind. Derived policies can be
    /// modeled as separate types with their own tag and identity.
    fn tag(&self) -> &'static str {
        "ByMimic"
    }
}

impl NamingPolicy for DefaultNamingPolicy {
    fn artifact_name(&self, cx: &NamingContext<'_>) -> String {
        let prefix = if cx.prefix.is_empty() {
            "mimic.Object"
        } else {
            cx.prefix
        };
        let root = prefix.split('.').next().unwrap_or(prefix);
        let escaped;
        let prefix = if RESERVED_ROOTS.contains(&root) {
            escaped = format!("${prefix}");
            escaped.as_str()
        } else {
            prefix
        };
        let digest = cx.digest & u64::from(u32::MAX);
        let base = format!("{prefix}$${}{}$${digest:x}{}", cx.kind, self.tag(), cx.suffix);

        let mut attempt = base.clone();
        let mut index: u64 = 2;
        while (cx.taken)(&attempt) {
            attempt = format!("{base}_{index}");
            index = index.wrapping_add(1);
        }
        attempt
    }

    fn identity(&self) -> PolicyIdentity {
        PolicyIdentity::of::<DefaultNamingPolicy>()
    }
}
