//! Dispatcher: the orchestrating task.
//!
//! ```text
//!  moisture producer ─┐                        ┌─▶ registry (batch update)
//!                     ├─▶ sensorEvents ─▶ Dispatcher ─▶ pumpEvents ─▶ water control
//!  light controller ──┘                        └─▶ light channel ─▶ light controller
//! ```
//!
//! On `MOISTURE_READY` the moisture producer is suspended and every sensor
//! is read and evaluated under one registry lock.  A failed sensor is
//! logged and skipped; the rest of the batch still runs.  Breaching
//! sensors raise their pump bit once the batch is done.
//!
//! On `LIGHT_READY` one light reading is pushed into the single-slot
//! channel.  The push blocks while a previous value is still unread.

use std::sync::Arc;

use log::{info, warn};

use crate::app::ports::SensorSource;
use crate::channel::LightChannel;
use crate::registry::{BatchOutcome, SensorRegistry};
use crate::signals::{EventBits, LIGHT_READY, MOISTURE_READY, SENSOR_EVENTS_ALL, SignalBus, WaitPolicy};
use crate::task::TaskControl;

pub struct Dispatcher<S: SensorSource> {
    source: S,
    registry: Arc<SensorRegistry>,
    bus: Arc<SignalBus>,
    light_channel: Arc<LightChannel>,
    moisture_task: Arc<TaskControl>,
    sensor_count: u8,
    policy: WaitPolicy,
    populated: bool,
}

impl<S: SensorSource> Dispatcher<S> {
    pub fn new(
        source: S,
        registry: Arc<SensorRegistry>,
        bus: Arc<SignalBus>,
        light_channel: Arc<LightChannel>,
        moisture_task: Arc<TaskControl>,
        sensor_count: u8,
        policy: WaitPolicy,
    ) -> Self {
        if policy == WaitPolicy::All {
            warn!(
                "Dispatcher: waiting for ALL sensor events; moisture and light \
                 requests are raised independently and may never coincide"
            );
        }
        Self {
            source,
            registry,
            bus,
            light_channel,
            moisture_task,
            sensor_count,
            policy,
            populated: false,
        }
    }

    /// Register sensor/pump pair `i` for every configured sensor.  Runs once.
    pub fn populate(&mut self) {
        if self.populated {
            return;
        }
        for i in 0..self.sensor_count {
            let name = format!("Moisture_sensor_{i}");
            if let Err(e) = self.registry.register_sensor(&name, i, i) {
                warn!("Dispatcher: could not register '{}': {}", name, e);
            }
        }
        self.populated = true;
        info!("Dispatcher: {} sensors registered", self.registry.len());
    }

    /// Wait for the next sensor event and handle it.
    pub fn step(&mut self) -> EventBits {
        self.populate();
        let bits = self
            .bus
            .sensor_events
            .wait(SENSOR_EVENTS_ALL, true, self.policy);
        self.handle(bits);
        bits
    }

    /// Act on an observed set of sensor event bits.
    pub fn handle(&mut self, bits: EventBits) {
        if bits & MOISTURE_READY != 0 {
            self.read_moisture();
        }
        if bits & LIGHT_READY != 0 {
            self.read_light();
        }
    }

    /// One batch read of every moisture sensor.
    pub fn read_moisture(&mut self) -> BatchOutcome {
        self.moisture_task.suspend();

        let source = &mut self.source;
        let outcome = self.registry.update_all(|record| {
            match source.read(record.sensor_address) {
                Ok(reading) => Some(reading),
                Err(e) => {
                    warn!("Dispatcher: '{}' skipped: {}", record.name, e);
                    None
                }
            }
        });

        self.moisture_task.resume();

        if outcome.pump_mask != 0 {
            info!("Dispatcher: irrigation requested, pumps 0b{:05b}", outcome.pump_mask);
            self.bus.pump_events.set(outcome.pump_mask);
        }
        outcome
    }

    /// Push one light reading; blocks while the previous one is unread.
    pub fn read_light(&mut self) {
        let level = self.source.read_light();
        self.light_channel.send(level);
    }

    pub fn run(mut self) {
        info!("Dispatcher started");
        loop {
            self.step();
        }
    }
}
