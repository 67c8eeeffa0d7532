//! Periodic producers.
//!
//! [`PeriodicProducer`] raises one sensor-event bit on a fixed period; the
//! moisture request producer is one of these, gated by the [`TaskControl`]
//! the dispatcher suspends during a batch.  [`ClockTicker`] advances the
//! simulated clock.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::clock::{SharedClock, TimeUnit};
use crate::signals::{EventBits, SignalBus};
use crate::task::TaskControl;

pub struct PeriodicProducer {
    bus: Arc<SignalBus>,
    bits: EventBits,
    period: Duration,
    control: Arc<TaskControl>,
}

impl PeriodicProducer {
    pub fn new(
        bus: Arc<SignalBus>,
        bits: EventBits,
        period: Duration,
        control: Arc<TaskControl>,
    ) -> Self {
        Self {
            bus,
            bits,
            period,
            control,
        }
    }

    /// Park while suspended, then raise the bits.
    pub fn step(&self) -> EventBits {
        self.control.checkpoint();
        let value = self.bus.sensor_events.set(self.bits);
        debug!("{}: raised 0b{:b}", self.control.name(), self.bits);
        value
    }

    pub fn run(self) {
        info!(
            "{} producer started ({}ms period)",
            self.control.name(),
            self.period.as_millis()
        );
        loop {
            self.step();
            std::thread::sleep(self.period);
        }
    }
}

pub struct ClockTicker {
    clock: Arc<SharedClock>,
    step_secs: u32,
    period: Duration,
}

impl ClockTicker {
    pub fn new(clock: Arc<SharedClock>, step_secs: u32, period: Duration) -> Self {
        Self {
            clock,
            step_secs,
            period,
        }
    }

    pub fn tick(&self) {
        let before = self.clock.phase();
        self.clock.advance(TimeUnit::Second, self.step_secs);
        let now = self.clock.now();
        if now.phase != before {
            info!("Clock: {}", now);
        }
    }

    pub fn run(self) {
        loop {
            std::thread::sleep(self.period);
            self.tick();
        }
    }
}
