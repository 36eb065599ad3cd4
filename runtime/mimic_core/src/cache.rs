//! Per-scope artifact cache with single-flight synthesis.
//!
//! The cache maps [`CacheKey`]s to weak artifact references. Weakness
//! is the point: the defining scope owns artifacts, and a cache entry
//! must never extend an artifact's life. A dead entry is
//! indistinguishable from an absent one.
//!
//! Synthesis is single-flight per key. The first requester claims the
//! key and synthesizes outside the lock; concurrent requesters for the
//! same key block until the claim resolves, while requesters for other
//! keys proceed untouched. A failed or panicked synthesis releases the
//! claim without installing anything, so the next requester starts
//! over from a clean slate.
//!
//! # Thread Safety
//!
//! One mutex guards both the entry map and the claim table; the
//! condvar signals claim resolution. The mutex is never held across a
//! synthesizer call. Claims record the owning thread, so a key that
//! re-enters its own synthesis is reported as recursion instead of
//! deadlocking on itself.

use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

use crate::artifact::Artifact;
use crate::error::{GenerationError, GenerationResult};
use crate::key::CacheKey;

#[derive(Debug, Default)]
pub(crate) struct ArtifactCache {
    state: Mutex<CacheState>,
    ready: Condvar,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: FxHashMap<CacheKey, Weak<Artifact>>,
    claims: FxHashMap<CacheKey, ThreadId>,
}

impl ArtifactCache {
    /// Return the live artifact for `key`, or claim the key and run
    /// `synthesize` to produce it.
    ///
    /// `on_recursion` builds the error reported when the current
    /// thread already holds the claim for `key`, which means the
    /// running synthesis re-entered itself.
    pub(crate) fn get_or_synthesize<F>(
        &self,
        key: &CacheKey,
        on_recursion: impl FnOnce() -> GenerationError,
        synthesize: F,
    ) -> GenerationResult<Arc<Artifact>>
    where
        F: FnOnce() -> GenerationResult<Arc<Artifact>>,
    {
        let me = thread::current().id();
        {
            let mut state = self.state.lock();
            loop {
                if let Some(weak) = state.entries.get(key) {
                    if let Some(live) = weak.upgrade() {
                        return Ok(live);
                    }
                    state.entries.remove(key);
                }
                match state.claims.get(key) {
                    Some(owner) if *owner == me => return Err(on_recursion()),
                    Some(_) => self.ready.wait(&mut state),
                    None => {
                        state.claims.insert(key.clone(), me);
                        break;
                    }
                }
            }
        }

        let claim = ClaimGuard {
            cache: self,
            key,
            armed: true,
        };
        let artifact = synthesize()?;
        claim.complete(&artifact);
        Ok(artifact)
    }
}

/// Releases a synthesis claim on drop unless it was completed.
///
/// Dropping on the error and panic paths is what keeps a failed
/// synthesis from wedging every waiter on the key.
struct ClaimGuard<'a> {
    cache: &'a ArtifactCache,
    key: &'a CacheKey,
    armed: bool,
}

impl ClaimGuard<'_> {
    /// Install the artifact and resolve the claim in one lock section.
    fn complete(mut self, artifact: &Arc<Artifact>) {
        let mut state = self.cache.state.lock();
        state.entries.insert(self.key.clone(), Arc::downgrade(artifact));
        state.claims.remove(self.key);
        self.armed = false;
        drop(state);
        self.cache.ready.notify_all();
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.cache.state.lock();
        state.claims.remove(self.key);
        drop(state);
        self.cache.ready.notify_all();
    }
}
