//! Event-flag groups.
//!
//! An [`EventGroup`] is a word of independently settable bits with blocking
//! waits.  A waiter names a mask and a [`WaitPolicy`]; it is released once
//! the policy is satisfied, and with `clear_on_exit` the masked bits are
//! cleared in the same critical section that observed them.  Only one
//! waiter can therefore consume a given set of bits.
//!
//! ```text
//!  producers ──set()──▶ ┌─────────────┐ ──wait_for()──▶ dispatcher
//!                       │ sensorEvents│
//!                       └─────────────┘
//!  dispatcher ─set()──▶ ┌─────────────┐ ──wait_for()──▶ water control
//!                       │ pumpEvents  │
//!                       └─────────────┘
//! ```
//!
//! The dispatcher and water control default to [`WaitPolicy::Any`].  With
//! [`WaitPolicy::All`] two producers that each set only their own bit must
//! both fire before the waiter wakes; if one of them stalls, so does the
//! waiter.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Bit word carried by an [`EventGroup`].
pub type EventBits = u32;

// ── sensorEvents ──────────────────────────────────────────────

/// A moisture batch read is requested.
pub const MOISTURE_READY: EventBits = 1 << 0;
/// A light reading is requested.
pub const LIGHT_READY: EventBits = 1 << 1;
pub const SENSOR_EVENTS_ALL: EventBits = MOISTURE_READY | LIGHT_READY;

// ── pumpEvents ────────────────────────────────────────────────

pub const PUMP_COUNT: usize = 5;
pub const PUMP_EVENTS_ALL: EventBits = (1 << PUMP_COUNT) - 1;

/// Request bit for pump `index` (0-based).
pub const fn pump_bit(index: usize) -> EventBits {
    1 << index
}

/// Iterate the pump indices whose bits are set in `bits`.
pub fn pump_indices(bits: EventBits) -> impl Iterator<Item = usize> {
    (0..PUMP_COUNT).filter(move |i| bits & pump_bit(*i) != 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitPolicy {
    /// Release once every bit in the mask is set.
    All,
    /// Release once at least one bit in the mask is set.
    Any,
}

impl WaitPolicy {
    fn satisfied(self, bits: EventBits, mask: EventBits) -> bool {
        match self {
            Self::All => bits & mask == mask,
            Self::Any => bits & mask != 0,
        }
    }
}

pub struct EventGroup {
    name: &'static str,
    bits: Mutex<EventBits>,
    changed: Condvar,
}

impl EventGroup {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            bits: Mutex::new(0),
            changed: Condvar::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn lock(&self) -> MutexGuard<'_, EventBits> {
        self.bits.lock().expect("event group mutex poisoned")
    }

    /// OR `bits` into the group and wake every waiter to re-check.
    /// Returns the group value after the set.
    pub fn set(&self, bits: EventBits) -> EventBits {
        let mut current = self.lock();
        *current |= bits;
        let value = *current;
        drop(current);
        self.changed.notify_all();
        value
    }

    /// Clear `bits`; returns the value before clearing.
    pub fn clear(&self, bits: EventBits) -> EventBits {
        let mut current = self.lock();
        let before = *current;
        *current &= !bits;
        before
    }

    pub fn get(&self) -> EventBits {
        *self.lock()
    }

    /// Unbounded [`wait_for`](Self::wait_for).
    pub fn wait(&self, mask: EventBits, clear_on_exit: bool, policy: WaitPolicy) -> EventBits {
        loop {
            if let Some(bits) = self.wait_for(mask, clear_on_exit, policy, None) {
                return bits;
            }
        }
    }

    /// Block until `policy` is satisfied for `mask`.
    ///
    /// Returns the group value observed at the moment of satisfaction; if
    /// `clear_on_exit` the bits in `mask` are cleared atomically with that
    /// observation.  `timeout = None` waits forever.  On timeout returns
    /// `None` and leaves the bits untouched.
    pub fn wait_for(
        &self,
        mask: EventBits,
        clear_on_exit: bool,
        policy: WaitPolicy,
        timeout: Option<Duration>,
    ) -> Option<EventBits> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut current = self.lock();

        loop {
            if policy.satisfied(*current, mask) {
                let observed = *current;
                if clear_on_exit {
                    *current &= !mask;
                }
                return Some(observed);
            }

            current = match deadline {
                None => self
                    .changed
                    .wait(current)
                    .expect("event group mutex poisoned"),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return None;
                    }
                    self.changed
                        .wait_timeout(current, remaining)
                        .expect("event group mutex poisoned")
                        .0
                }
            };
        }
    }
}

/// The two flag groups shared by every task.
pub struct SignalBus {
    pub sensor_events: EventGroup,
    pub pump_events: EventGroup,
}

impl SignalBus {
    pub const fn new() -> Self {
        Self {
            sensor_events: EventGroup::new("sensorEvents"),
            pump_events: EventGroup::new("pumpEvents"),
        }
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    const SHORT: Option<Duration> = Some(Duration::from_millis(30));

    #[test]
    fn all_policy_needs_every_bit() {
        let g = EventGroup::new("t");
        g.set(MOISTURE_READY);
        assert_eq!(g.wait_for(SENSOR_EVENTS_ALL, true, WaitPolicy::All, SHORT), None);
        assert_eq!(g.get(), MOISTURE_READY, "timeout leaves bits untouched");

        g.set(LIGHT_READY);
        let seen = g.wait_for(SENSOR_EVENTS_ALL, true, WaitPolicy::All, SHORT);
        assert_eq!(seen, Some(SENSOR_EVENTS_ALL));
        assert_eq!(g.get(), 0);
    }

    #[test]
    fn clear_on_exit_clears_only_masked_bits() {
        let g = EventGroup::new("t");
        g.set(0b1011);
        let seen = g.wait_for(0b0011, true, WaitPolicy::All, SHORT);
        assert_eq!(seen, Some(0b1011));
        assert_eq!(g.get(), 0b1000);
    }

    #[test]
    fn any_policy_wakes_on_single_bit() {
        let g = EventGroup::new("t");
        g.set(LIGHT_READY);
        let seen = g.wait_for(SENSOR_EVENTS_ALL, true, WaitPolicy::Any, SHORT);
        assert_eq!(seen, Some(LIGHT_READY));
        assert_eq!(g.get(), 0);
    }

    #[test]
    fn without_clear_bits_persist() {
        let g = EventGroup::new("t");
        g.set(pump_bit(3));
        assert!(g.wait_for(PUMP_EVENTS_ALL, false, WaitPolicy::Any, SHORT).is_some());
        assert_eq!(g.get(), pump_bit(3));
        assert_eq!(g.clear(pump_bit(3)), pump_bit(3));
        assert_eq!(g.get(), 0);
    }

    #[test]
    fn blocked_waiter_wakes_on_set() {
        let g = Arc::new(EventGroup::new("t"));
        let waiter = {
            let g = Arc::clone(&g);
            thread::spawn(move || g.wait_for(SENSOR_EVENTS_ALL, true, WaitPolicy::All, None))
        };
        thread::sleep(Duration::from_millis(20));
        g.set(MOISTURE_READY);
        thread::sleep(Duration::from_millis(20));
        g.set(LIGHT_READY);
        assert_eq!(waiter.join().unwrap(), Some(SENSOR_EVENTS_ALL));
    }

    #[test]
    fn exactly_one_waiter_consumes_an_event() {
        let g = Arc::new(EventGroup::new("t"));
        let wins = Arc::new(AtomicU32::new(0));

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let g = Arc::clone(&g);
                let wins = Arc::clone(&wins);
                thread::spawn(move || {
                    if g
                        .wait_for(MOISTURE_READY, true, WaitPolicy::All, Some(Duration::from_millis(200)))
                        .is_some()
                    {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(30));
        g.set(MOISTURE_READY);
        for w in waiters {
            w.join().unwrap();
        }
        assert_eq!(wins.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pump_indices_from_bits() {
        let idx: Vec<usize> = pump_indices(pump_bit(0) | pump_bit(2) | pump_bit(4)).collect();
        assert_eq!(idx, vec![0, 2, 4]);
        assert_eq!(PUMP_EVENTS_ALL, 0b1_1111);
    }
}
