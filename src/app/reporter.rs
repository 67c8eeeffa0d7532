//! Periodic status report.
//!
//! ```text
//! ============ STATUS 12:00:05 (Day) ============
//!  #  sensor              reading  moist  trigger
//!  1  Moisture_sensor_0       312    75%     450
//!  ...
//!  light: automatic
//! ===============================================
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use heapless::Vec;
use log::{debug, info};

use crate::app::light::{LightMode, SharedLightMode};
use crate::app::session::OperatorSession;
use crate::clock::{SharedClock, SimulatedClock};
use crate::registry::{SENSOR_CAPACITY, SensorRecord, SensorRegistry};
use crate::serial::SerialChannel;

/// Everything one report shows, captured under the operator session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub time: SimulatedClock,
    pub sensors: Vec<SensorRecord, SENSOR_CAPACITY>,
    pub light_mode: LightMode,
}

const RULE: &str = "===============================================";

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "============ STATUS {} ============", self.time)?;
        writeln!(f, " #  sensor              reading  moist  trigger")?;
        for (i, s) in self.sensors.iter().enumerate() {
            writeln!(
                f,
                "{:>2}  {:<18} {:>8} {:>5}% {:>7}",
                i + 1,
                s.name.as_str(),
                s.last_reading,
                s.moisture_percent(),
                s.threshold
            )?;
        }
        writeln!(f, " light: {}", self.light_mode)?;
        write!(f, "{RULE}")
    }
}

pub struct Reporter {
    serial: Arc<SerialChannel>,
    session: Arc<OperatorSession>,
    registry: Arc<SensorRegistry>,
    clock: Arc<SharedClock>,
    light_mode: Arc<SharedLightMode>,
    period: Duration,
}

impl Reporter {
    pub fn new(
        serial: Arc<SerialChannel>,
        session: Arc<OperatorSession>,
        registry: Arc<SensorRegistry>,
        clock: Arc<SharedClock>,
        light_mode: Arc<SharedLightMode>,
        period: Duration,
    ) -> Self {
        Self {
            serial,
            session,
            registry,
            clock,
            light_mode,
            period,
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            time: self.clock.now(),
            sensors: self.registry.snapshot(),
            light_mode: self.light_mode.load(),
        }
    }

    /// Capture and print one report while holding the operator session.
    pub fn report_once(&self) -> StatusSnapshot {
        let _held = self.session.begin();
        let snapshot = self.snapshot();
        if !self.serial.write_line(&snapshot.to_string()) {
            debug!("Reporter: serial busy, report dropped");
        }
        snapshot
    }

    pub fn run(self) {
        info!("Reporter started ({}ms period)", self.period.as_millis());
        loop {
            std::thread::sleep(self.period);
            self.report_once();
        }
    }
}
