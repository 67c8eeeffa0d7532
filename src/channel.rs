//! Single-slot value channel between the dispatcher and the light controller.
//!
//! Backed by an `embassy-sync` bounded channel of depth 1 and driven from
//! blocking task code through `futures_lite::future::block_on`.  A second
//! `send` parks the producer until the consumer drains the slot, so at most
//! one light reading is ever outstanding.
//!
//! ```text
//! ┌────────────┐  send (parks when full)  ┌────────┐  receive  ┌────────────┐
//! │ Dispatcher │────────────────────────▶│ slot×1 │──────────▶│ Light ctrl │
//! └────────────┘                          └────────┘           └────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future::block_on;

/// Slot depth.  The backpressure contract depends on it being 1.
const SLOT_DEPTH: usize = 1;

/// Raw light level as produced by the sensor source.
pub type LightLevel = i16;

pub struct ValueChannel<T> {
    inner: Channel<CriticalSectionRawMutex, T, SLOT_DEPTH>,
}

/// The light-level channel used between dispatcher and light controller.
pub type LightChannel = ValueChannel<LightLevel>;

impl<T> ValueChannel<T> {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    /// Put a value in the slot, blocking while it is occupied.
    pub fn send(&self, value: T) {
        block_on(self.inner.send(value));
    }

    /// Take the pending value, blocking while the slot is empty.
    pub fn receive(&self) -> T {
        block_on(self.inner.receive())
    }

    /// Non-blocking send; hands the value back if the slot is occupied.
    pub fn try_send(&self, value: T) -> Result<(), T> {
        self.inner.try_send(value).map_err(|e| match e {
            embassy_sync::channel::TrySendError::Full(v) => v,
        })
    }

    pub fn try_receive(&self) -> Option<T> {
        self.inner.try_receive().ok()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }
}

impl<T> Default for ValueChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}
