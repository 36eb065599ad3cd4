//! Per-scope name reservations.
//!
//! Names are reserved before synthesis starts and never released, not
//! even when synthesis fails. A name that was ever handed to a
//! synthesizer may have leaked into half-built state, so reissuing it
//! could alias two different artifacts; the naming policy's suffixing
//! keeps the namespace from exhausting.

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

#[derive(Debug, Default)]
pub(crate) struct NameReservation {
    taken: Mutex<FxHashSet<String>>,
}

impl NameReservation {
    /// Reserve `name` if it is free. Returns `false` if it was already
    /// reserved; the set is left unchanged in that case.
    pub(crate) fn reserve(&self, name: &str) -> bool {
        let mut taken = self.taken.lock();
        if taken.contains(name) {
            return false;
        }
        taken.insert(name.to_string());
        true
    }

    pub(crate) fn is_taken(&self, name: &str) -> bool {
        self.taken.lock().contains(name)
    }
}
