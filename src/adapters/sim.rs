//! Simulated peripherals for host runs.
//!
//! [`SimulatedSensors`] draws moisture readings from the sensor's physical
//! range and light levels from 0..=100, with an optional failure rate so
//! the skip-and-continue paths get exercised.  [`RecordingActuators`]
//! keeps the output state in memory and logs every change.

use std::sync::Mutex;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::light::{LIGHT_OUTPUTS, LightTier};
use crate::app::ports::{ActuatorSink, LIGHT_READ_ERROR, SensorSource};
use crate::channel::LightLevel;
use crate::error::SensorError;
use crate::registry::{READING_DRY, READING_WET};
use crate::signals::PUMP_COUNT;

pub struct SimulatedSensors {
    rng: StdRng,
    failure_rate: f64,
}

impl SimulatedSensors {
    /// `failure_rate` is the probability of any single read failing.
    pub fn new(seed: u64, failure_rate: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    fn fails(&mut self) -> bool {
        self.failure_rate > 0.0 && self.rng.gen_bool(self.failure_rate)
    }
}

impl SensorSource for SimulatedSensors {
    fn read(&mut self, address: u8) -> Result<u16, SensorError> {
        if self.fails() {
            return Err(SensorError::NoResponse(address));
        }
        Ok(self.rng.gen_range(READING_WET..=READING_DRY))
    }

    fn read_light(&mut self) -> LightLevel {
        if self.fails() {
            return LIGHT_READ_ERROR;
        }
        self.rng.gen_range(0..=100)
    }
}

/// In-memory output state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputState {
    pub lights: [bool; LIGHT_OUTPUTS],
    pub pumps: [bool; PUMP_COUNT],
}

#[derive(Default)]
pub struct RecordingActuators {
    state: Mutex<OutputState>,
}

impl RecordingActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OutputState {
        *self.state.lock().expect("actuator state mutex poisoned")
    }
}

impl ActuatorSink for RecordingActuators {
    fn set_lights(&self, tier: LightTier) {
        self.state.lock().expect("actuator state mutex poisoned").lights = tier.outputs();
        info!("[sim] lights {:?} {:?}", tier, tier.outputs());
    }

    fn set_pump(&self, index: usize, on: bool) {
        let mut state = self.state.lock().expect("actuator state mutex poisoned");
        if let Some(pump) = state.pumps.get_mut(index) {
            *pump = on;
            info!("[sim] pump {} {}", index + 1, if on { "ON" } else { "OFF" });
        }
    }
}
