//! Mimic proxy - the method-interception proxy kind built on
//! `mimic_core`.
//!
//! This crate provides:
//! - Callback styles describing how a proxy answers calls
//!   ([`CallbackStyle`])
//! - A request builder wired to the proxy kind's shared coordinator
//!   ([`ProxyBuilder`])
//! - The per-instance handle a built proxy yields ([`ProxyHandle`])
//!
//! Equivalent builder configurations in one scope share a single
//! cached artifact; each `create` call instantiates a fresh handle
//! from it. Callback identity is by style, so payload-bearing styles
//! such as [`CallbackStyle::FixedValue`] never split the cache.

mod callbacks;
mod proxy;

#[cfg(test)]
mod proxy_tests;

pub use callbacks::CallbackStyle;
pub use proxy::{ProxyBuilder, ProxyHandle, PROXY_KIND};
