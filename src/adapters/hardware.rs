//! Hardware adapter: drives the light banks and pump relays.
//!
//! Generic over [`embedded_hal::digital::OutputPin`], so the same adapter
//! runs on ESP-IDF `PinDriver`s and on mock pins in tests.  Pin errors are
//! logged and otherwise ignored: the actuator port is fire-and-forget.

use std::sync::Mutex;

use embedded_hal::digital::{OutputPin, PinState};
use log::{debug, error};

use crate::app::light::{LIGHT_OUTPUTS, LightTier};
use crate::app::ports::ActuatorSink;
use crate::signals::PUMP_COUNT;

pub struct GpioActuators<P: OutputPin + Send> {
    lights: Mutex<[P; LIGHT_OUTPUTS]>,
    pumps: Mutex<[P; PUMP_COUNT]>,
}

impl<P: OutputPin + Send> GpioActuators<P> {
    /// Take ownership of the pins and drive every output low.
    pub fn new(lights: [P; LIGHT_OUTPUTS], pumps: [P; PUMP_COUNT]) -> Self {
        let adapter = Self {
            lights: Mutex::new(lights),
            pumps: Mutex::new(pumps),
        };
        adapter.set_lights(LightTier::Off);
        for i in 0..PUMP_COUNT {
            adapter.set_pump(i, false);
        }
        adapter
    }

    fn drive(pin: &mut P, on: bool, what: &str, index: usize) {
        if let Err(e) = pin.set_state(PinState::from(on)) {
            error!("GPIO: {} {} write failed: {:?}", what, index + 1, e);
        }
    }
}

impl<P: OutputPin + Send> ActuatorSink for GpioActuators<P> {
    fn set_lights(&self, tier: LightTier) {
        let mut pins = self.lights.lock().expect("light pins mutex poisoned");
        for (i, (pin, on)) in pins.iter_mut().zip(tier.outputs()).enumerate() {
            Self::drive(pin, on, "light bank", i);
        }
        debug!("GPIO: lights {:?}", tier);
    }

    fn set_pump(&self, index: usize, on: bool) {
        let mut pins = self.pumps.lock().expect("pump pins mutex poisoned");
        match pins.get_mut(index) {
            Some(pin) => Self::drive(pin, on, "pump", index),
            None => error!("GPIO: no pump at index {}", index),
        }
    }
}
