//! Simulated time-of-day with day/night derivation.
//!
//! The clock is advanced by the ticker task and overwritten unit-by-unit by
//! the operator console.  Every access goes through [`SharedClock`], which
//! holds the clock behind one exclusive lock.
//!
//! `advance` carries seconds → minutes → hours → days inside a single
//! critical section and re-derives [`DayPhase`] from the resulting hour.  `set`
//! writes one unit verbatim: no carry, no phase recomputation.  The phase
//! catches up on the next `advance`.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// First hour (inclusive) that counts as Night.
pub const NIGHT_START_HOUR: u8 = 18;
/// First hour (inclusive) that counts as Day again.
pub const DAY_START_HOUR: u8 = 6;

const SECS_PER_MINUTE: u64 = 60;
const MINUTES_PER_HOUR: u64 = 60;
const HOURS_PER_DAY: u64 = 24;

/// Field selector for [`SharedClock::advance`] and [`SharedClock::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    /// Largest value the unit can hold.
    pub const fn max(self) -> u8 {
        match self {
            Self::Hour => 23,
            Self::Minute | Self::Second => 59,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    Day,
    Night,
}

impl DayPhase {
    /// Night iff `hour >= 18 || hour < 6`.
    pub const fn from_hour(hour: u8) -> Self {
        if hour >= NIGHT_START_HOUR || hour < DAY_START_HOUR {
            Self::Night
        } else {
            Self::Day
        }
    }
}

/// A plain copy of the clock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedClock {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub phase: DayPhase,
    /// Midnights passed since start-up.
    pub day: u32,
}

impl SimulatedClock {
    /// Build a clock at the given time with a consistent phase.
    ///
    /// Out-of-range fields wrap into range.
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        let hour = hour % HOURS_PER_DAY as u8;
        Self {
            hour,
            minute: minute % MINUTES_PER_HOUR as u8,
            second: second % SECS_PER_MINUTE as u8,
            phase: DayPhase::from_hour(hour),
            day: 0,
        }
    }

    pub fn is_night(&self) -> bool {
        self.phase == DayPhase::Night
    }

    /// Add `amount` of `unit`, carrying into the larger units.
    fn advance(&mut self, unit: TimeUnit, amount: u32) {
        let amount = u64::from(amount);
        let (mut secs, mut mins, mut hours) = (
            u64::from(self.second),
            u64::from(self.minute),
            u64::from(self.hour),
        );

        match unit {
            TimeUnit::Second => secs += amount,
            TimeUnit::Minute => mins += amount,
            TimeUnit::Hour => hours += amount,
        }

        mins += secs / SECS_PER_MINUTE;
        hours += mins / MINUTES_PER_HOUR;

        self.second = (secs % SECS_PER_MINUTE) as u8;
        self.minute = (mins % MINUTES_PER_HOUR) as u8;
        self.hour = (hours % HOURS_PER_DAY) as u8;
        self.day = self.day.wrapping_add((hours / HOURS_PER_DAY) as u32);
        // Re-derived on every advance so a stale phase left by `set` heals.
        self.phase = DayPhase::from_hour(self.hour);
    }

    fn set(&mut self, unit: TimeUnit, value: u8) {
        match unit {
            TimeUnit::Hour => self.hour = value,
            TimeUnit::Minute => self.minute = value,
            TimeUnit::Second => self.second = value,
        }
    }
}

impl core::fmt::Display for SimulatedClock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02} ({:?})",
            self.hour, self.minute, self.second, self.phase
        )
    }
}

/// Mutex-guarded simulated clock shared by every task.
pub struct SharedClock {
    inner: Mutex<SimulatedClock>,
}

impl SharedClock {
    pub fn new(start: SimulatedClock) -> Self {
        Self {
            inner: Mutex::new(start),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimulatedClock> {
        self.inner.lock().expect("clock mutex poisoned")
    }

    /// Add `amount` of `unit` with full carry and day/night recomputation.
    pub fn advance(&self, unit: TimeUnit, amount: u32) {
        self.lock().advance(unit, amount);
    }

    /// Overwrite one unit directly.
    ///
    /// Bypasses carry and day/night recomputation; callers validate range.
    pub fn set(&self, unit: TimeUnit, value: u8) {
        self.lock().set(unit, value);
    }

    pub fn now(&self) -> SimulatedClock {
        *self.lock()
    }

    pub fn hour(&self) -> u8 {
        self.lock().hour
    }

    pub fn phase(&self) -> DayPhase {
        self.lock().phase
    }

    pub fn day(&self) -> u32 {
        self.lock().day
    }
}
