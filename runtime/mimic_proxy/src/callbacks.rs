//! Callback styles a proxy can wire into its behavior slots.
//!
//! Styles are the proxy kind's [`CallbackDescriptor`]s. Cache identity
//! is the style's *kind*: two `FixedValue` callbacks with different
//! payloads still describe the same artifact shape, so proxies built
//! around them share one artifact and differ only per instance.

use std::any::Any;
use std::hash::Hasher;

use mimic_core::{ArgValue, CallbackDescriptor};

/// Behavior of one proxy callback slot.
#[derive(Debug, Clone)]
pub enum CallbackStyle {
    /// Route every invocation through an interceptor.
    Intercept,
    /// Pass invocations straight through to the supertype.
    NoOp,
    /// Resolve the delegate once, on first invocation, then reuse it.
    LazyLoad,
    /// Resolve the delegate again on every invocation.
    Dispatch,
    /// Answer every invocation with one fixed value.
    FixedValue(ArgValue),
}

impl CallbackStyle {
    fn kind_id(&self) -> u8 {
        match self {
            CallbackStyle::Intercept => 0,
            CallbackStyle::NoOp => 1,
            CallbackStyle::LazyLoad => 2,
            CallbackStyle::Dispatch => 3,
            CallbackStyle::FixedValue(_) => 4,
        }
    }
}

impl CallbackDescriptor for CallbackStyle {
    fn label(&self) -> &'static str {
        match self {
            CallbackStyle::Intercept => "intercept",
            CallbackStyle::NoOp => "no-op",
            CallbackStyle::LazyLoad => "lazy-load",
            CallbackStyle::Dispatch => "dispatch",
            CallbackStyle::FixedValue(_) => "fixed-value",
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn descriptor_eq(&self, other: &dyn CallbackDescriptor) -> bool {
        other
            .as_any()
            .downcast_ref::<CallbackStyle>()
            .is_some_and(|other| other.kind_id() == self.kind_id())
    }

    fn descriptor_hash(&self, state: &mut dyn Hasher) {
        state.write_u8(self.kind_id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_payloads() {
        let one = CallbackStyle::FixedValue(ArgValue::Int(1));
        let two = CallbackStyle::FixedValue(ArgValue::Int(2));
        assert!(one.descriptor_eq(&two));
    }

    #[test]
    fn identity_distinguishes_kinds() {
        assert!(!CallbackStyle::Intercept.descriptor_eq(&CallbackStyle::NoOp));
        assert!(!CallbackStyle::LazyLoad.descriptor_eq(&CallbackStyle::Dispatch));
    }

    #[test]
    fn labels_name_the_kind() {
        assert_eq!(CallbackStyle::Dispatch.label(), "dispatch");
        assert_eq!(
            CallbackStyle::FixedValue(ArgValue::Bool(true)).label(),
            "fixed-value"
        );
    }
}
