//! End-to-end tests for the proxy kind through [`ProxyBuilder`].
//!
//! Tests cover:
//! - Request validation and builder-to-request mapping
//! - Artifact sharing between equivalent builders, and the key
//!   material that splits it
//! - Handle wiring, construction arguments, and the factory flag
//! - Default and custom naming
//! - Adoption of parent-scope definitions via `attempt_load`

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::sync::Arc;

use mimic_core::{
    ArgValue, GenerationError, NamingContext, NamingPolicy, PolicyIdentity, Scope,
};

use crate::{CallbackStyle, ProxyBuilder, ProxyHandle, PROXY_KIND};

fn greeter(scope: &Arc<Scope>) -> ProxyBuilder {
    ProxyBuilder::new()
        .supertype("service.Greeter")
        .callback(CallbackStyle::Intercept)
        .scope(scope)
}

/// Uppercases the prefix, suffixing while taken.
#[derive(Debug)]
struct UpperNames;

impl NamingPolicy for UpperNames {
    fn artifact_name(&self, cx: &NamingContext<'_>) -> String {
        let base = cx.prefix.to_ascii_uppercase();
        let mut attempt = base.clone();
        let mut index = 2u64;
        while (cx.taken)(&attempt) {
            attempt = format!("{base}_{index}");
            index += 1;
        }
        attempt
    }

    fn identity(&self) -> PolicyIdentity {
        PolicyIdentity::of::<UpperNames>()
    }
}

mod building {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn at_least_one_callback_is_required() {
        let err = ProxyBuilder::new()
            .supertype("svc.Empty")
            .build_request()
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::configuration(
                "at least one callback is required to build a proxy"
            )
        );
    }

    #[test]
    fn requests_carry_the_builder_configuration() {
        let scope = Scope::new("cfg");

        let request = ProxyBuilder::new()
            .supertype("svc.Payments")
            .interface("svc.Audited")
            .interface("svc.Versioned")
            .callback(CallbackStyle::NoOp)
            .callback(CallbackStyle::Dispatch)
            .scope(&scope)
            .name_prefix("gen.Payments")
            .name_suffix("$it")
            .factory_api(false)
            .use_cache(false)
            .attempt_load(true)
            .build_request()
            .unwrap();

        assert_eq!(request.kind, PROXY_KIND);
        assert_eq!(request.supertype.as_ref().unwrap().as_str(), "svc.Payments");
        assert_eq!(request.interfaces.len(), 2);
        assert_eq!(request.callbacks.len(), 2);
        assert_eq!(request.callbacks[0].label(), "no-op");
        assert!(Arc::ptr_eq(request.scope.as_ref().unwrap(), &scope));
        assert_eq!(request.name_prefix.as_deref(), Some("gen.Payments"));
        assert_eq!(request.name_suffix.as_deref(), Some("$it"));
        assert!(!request.factory_api);
        assert!(!request.use_cache);
        assert!(request.attempt_load);
    }
}

mod caching {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn equivalent_builders_share_an_artifact() {
        let scope = Scope::new("shared");

        let first = greeter(&scope).create_artifact().unwrap();
        let second = greeter(&scope).create_artifact().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn fixed_value_payloads_do_not_split_the_cache() {
        let scope = Scope::new("fixed");

        let first = ProxyBuilder::new()
            .supertype("svc.Clock")
            .callback(CallbackStyle::FixedValue(ArgValue::Int(1)))
            .scope(&scope)
            .create()
            .unwrap();
        let second = ProxyBuilder::new()
            .supertype("svc.Clock")
            .callback(CallbackStyle::FixedValue(ArgValue::Int(2)))
            .scope(&scope)
            .create()
            .unwrap();

        assert!(Arc::ptr_eq(first.artifact(), second.artifact()));

        let first_handle = first.downcast_ref::<ProxyHandle>().unwrap();
        let second_handle = second.downcast_ref::<ProxyHandle>().unwrap();
        assert!(matches!(
            first_handle.callbacks[..],
            [CallbackStyle::FixedValue(ArgValue::Int(1))]
        ));
        assert!(matches!(
            second_handle.callbacks[..],
            [CallbackStyle::FixedValue(ArgValue::Int(2))]
        ));
    }

    #[test]
    fn distinct_callback_kinds_get_distinct_artifacts() {
        let scope = Scope::new("kinds");

        let intercepting = ProxyBuilder::new()
            .supertype("svc.Mail")
            .callback(CallbackStyle::Intercept)
            .scope(&scope)
            .create_artifact()
            .unwrap();
        let passthrough = ProxyBuilder::new()
            .supertype("svc.Mail")
            .callback(CallbackStyle::NoOp)
            .scope(&scope)
            .create_artifact()
            .unwrap();

        assert!(!Arc::ptr_eq(&intercepting, &passthrough));
        // Callback kinds feed the digest, so each gets its own name.
        assert_ne!(intercepting.name(), passthrough.name());
        assert!(passthrough.name().starts_with("svc.Mail$$proxyByMimic$$"));
    }

    #[test]
    fn factory_api_is_key_material() {
        let scope = Scope::new("factory-key");

        let with_factory = greeter(&scope).create_artifact().unwrap();
        let without = greeter(&scope).factory_api(false).create_artifact().unwrap();

        assert!(!Arc::ptr_eq(&with_factory, &without));
    }

    #[test]
    fn interface_order_splits_the_cache() {
        let scope = Scope::new("order");

        let forward = ProxyBuilder::new()
            .supertype("svc.Feed")
            .interface("svc.Reader")
            .interface("svc.Writer")
            .callback(CallbackStyle::Dispatch)
            .scope(&scope)
            .create_artifact()
            .unwrap();
        let reversed = ProxyBuilder::new()
            .supertype("svc.Feed")
            .interface("svc.Writer")
            .interface("svc.Reader")
            .callback(CallbackStyle::Dispatch)
            .scope(&scope)
            .create_artifact()
            .unwrap();

        assert!(!Arc::ptr_eq(&forward, &reversed));
    }

    #[test]
    fn uncached_builders_synthesize_fresh_artifacts() {
        let scope = Scope::new("uncached");

        let first = ProxyBuilder::new()
            .supertype("svc.Pricer")
            .callback(CallbackStyle::LazyLoad)
            .scope(&scope)
            .use_cache(false)
            .create_artifact()
            .unwrap();
        let second = ProxyBuilder::new()
            .supertype("svc.Pricer")
            .callback(CallbackStyle::LazyLoad)
            .scope(&scope)
            .use_cache(false)
            .create_artifact()
            .unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.name(), format!("{}_2", first.name()));
    }
}

mod handles {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn handles_record_wiring_and_arguments() {
        let scope = Scope::new("wiring");

        let instance = ProxyBuilder::new()
            .supertype("svc.Ledger")
            .callback(CallbackStyle::NoOp)
            .callback(CallbackStyle::Dispatch)
            .scope(&scope)
            .create_with_args(&[ArgValue::Handle(Arc::new(7u32))])
            .unwrap();

        let handle = instance.downcast_ref::<ProxyHandle>().unwrap();
        assert_eq!(handle.callbacks.len(), 2);
        assert!(matches!(handle.callbacks[0], CallbackStyle::NoOp));
        assert!(matches!(handle.callbacks[1], CallbackStyle::Dispatch));
        assert!(matches!(
            handle.construction_args[..],
            [ArgValue::Handle(_)]
        ));
        assert!(handle.factory_api);
    }

    #[test]
    fn unsupported_construction_arguments_are_rejected() {
        let scope = Scope::new("bad-args");

        let err = greeter(&scope)
            .create_with_args(&[ArgValue::Int(3)])
            .unwrap_err();

        let GenerationError::IllegalReuse { given, .. } = err else {
            panic!("expected illegal reuse, got {err:?}");
        };
        assert_eq!(given, "int");
    }

    #[test]
    fn factory_api_flag_lands_on_the_handle() {
        let scope = Scope::new("no-factory");

        let instance = greeter(&scope).factory_api(false).create().unwrap();

        let handle = instance.downcast_ref::<ProxyHandle>().unwrap();
        assert!(!handle.factory_api);
    }
}

mod naming {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bare_builders_fall_back_to_the_default_prefix() {
        let scope = Scope::new("bare");

        let artifact = ProxyBuilder::new()
            .callback(CallbackStyle::NoOp)
            .scope(&scope)
            .create_artifact()
            .unwrap();

        assert!(
            artifact.name().starts_with("mimic.Object$$proxyByMimic$$"),
            "got {}",
            artifact.name()
        );
    }

    #[test]
    fn name_suffixes_decorate_without_splitting_the_cache() {
        let scope = Scope::new("suffixed");

        let suffixed = ProxyBuilder::new()
            .supertype("svc.Journal")
            .callback(CallbackStyle::Intercept)
            .name_suffix("$audit")
            .scope(&scope)
            .create_artifact()
            .unwrap();
        assert!(
            suffixed.name().ends_with("$audit"),
            "got {}",
            suffixed.name()
        );

        // Not key material: a builder differing only in suffix reuses
        // the artifact under its original name.
        let bare = ProxyBuilder::new()
            .supertype("svc.Journal")
            .callback(CallbackStyle::Intercept)
            .scope(&scope)
            .create_artifact()
            .unwrap();
        assert!(Arc::ptr_eq(&suffixed, &bare));
    }

    #[test]
    fn custom_policies_take_over_naming() {
        let scope = Scope::new("custom-names");

        let artifact = ProxyBuilder::new()
            .supertype("widget.Gadget")
            .callback(CallbackStyle::Intercept)
            .naming_policy(UpperNames)
            .scope(&scope)
            .create_artifact()
            .unwrap();
        assert_eq!(artifact.name(), "WIDGET.GADGET");

        // The policy is key material, so the default-named equivalent
        // is a separate artifact.
        let default_named = ProxyBuilder::new()
            .supertype("widget.Gadget")
            .callback(CallbackStyle::Intercept)
            .scope(&scope)
            .create_artifact()
            .unwrap();
        assert!(!Arc::ptr_eq(&artifact, &default_named));
    }
}

mod adoption {
    use super::*;

    #[test]
    fn attempt_load_adopts_parent_definitions() {
        let parent = Scope::new("lib");
        let child = Scope::with_parent("app", &parent);

        let original = ProxyBuilder::new()
            .supertype("svc.Cache")
            .callback(CallbackStyle::Intercept)
            .scope(&parent)
            .create_artifact()
            .unwrap();
        let adopted = ProxyBuilder::new()
            .supertype("svc.Cache")
            .callback(CallbackStyle::Intercept)
            .scope(&child)
            .attempt_load(true)
            .create_artifact()
            .unwrap();

        assert!(Arc::ptr_eq(&original, &adopted));
    }
}
