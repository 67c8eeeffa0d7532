//! Mock hardware and operator I/O for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};

use gardener::app::light::LightTier;
use gardener::app::ports::{ActuatorSink, ConsoleInput, SensorSource};
use gardener::error::SensorError;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Lights(LightTier),
    Pump { index: usize, on: bool },
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    calls: Mutex<Vec<ActuatorCall>>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pump_calls(&self) -> Vec<(usize, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ActuatorCall::Pump { index, on } => Some((index, on)),
                ActuatorCall::Lights(_) => None,
            })
            .collect()
    }

    pub fn last_lights(&self) -> Option<LightTier> {
        self.calls().into_iter().rev().find_map(|c| match c {
            ActuatorCall::Lights(t) => Some(t),
            ActuatorCall::Pump { .. } => None,
        })
    }
}

impl ActuatorSink for MockHardware {
    fn set_lights(&self, tier: LightTier) {
        self.calls.lock().unwrap().push(ActuatorCall::Lights(tier));
    }

    fn set_pump(&self, index: usize, on: bool) {
        self.calls
            .lock()
            .unwrap()
            .push(ActuatorCall::Pump { index, on });
    }
}

// ── MockSensors ───────────────────────────────────────────────

/// Fixed moisture readings per address, and a queue of light levels.
pub struct MockSensors {
    pub moisture: [Result<u16, SensorError>; 5],
    pub light: VecDeque<i16>,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn new(moisture: [u16; 5]) -> Self {
        Self {
            moisture: moisture.map(Ok),
            light: VecDeque::new(),
        }
    }

    pub fn with_light(mut self, levels: &[i16]) -> Self {
        self.light.extend(levels.iter().copied());
        self
    }
}

impl SensorSource for MockSensors {
    fn read(&mut self, address: u8) -> Result<u16, SensorError> {
        self.moisture
            .get(address as usize)
            .copied()
            .unwrap_or(Err(SensorError::NoResponse(address)))
    }

    fn read_light(&mut self) -> i16 {
        self.light.pop_front().unwrap_or(50)
    }
}

// ── Operator input ────────────────────────────────────────────

/// Console input fed line by line from the test thread.  Reading blocks
/// until the test sends the next line; dropping the sender closes it.
pub struct FedInput(Receiver<String>);

#[allow(dead_code)]
pub fn fed_input() -> (Sender<String>, FedInput) {
    let (tx, rx) = channel();
    (tx, FedInput(rx))
}

impl ConsoleInput for FedInput {
    fn read_line(&mut self) -> Option<String> {
        self.0.recv().ok()
    }
}

// ── Serial capture ────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)]
impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
