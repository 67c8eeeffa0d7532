//! Operator session lock.
//!
//! The console and the reporter both read the registry, the clock and the
//! light mode, and both write multi-line text.  Whoever holds the session
//! owns the operator's terminal: the console keeps it from the first prompt
//! of a command until the value is applied, the reporter for one whole
//! status block.

use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct OperatorSession {
    lock: Mutex<()>,
}

impl OperatorSession {
    pub const fn new() -> Self {
        Self {
            lock: Mutex::new(()),
        }
    }

    /// Block until the session is free and take it.
    pub fn begin(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().expect("operator session mutex poisoned")
    }

    /// Take the session only if nobody holds it.
    pub fn try_begin(&self) -> Option<MutexGuard<'_, ()>> {
        self.lock.try_lock().ok()
    }
}
