//! Garden controller: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  SimulatedSensors   GpioActuators / RecordingActuators       │
//! │  (SensorSource)     (ActuatorSink)                           │
//! │  StdinConsole       SerialChannel + logger                   │
//! │  (ConsoleInput)                                              │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  clock · dispatcher · light · water(pumps) · moisture        │
//! │  console · reporter                                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Configuration starts from the defaults; an inline JSON object in the
//! `GARDEN_CONFIG` environment variable overrides individual fields.
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use gardener::adapters::console_io::StdinConsole;
use gardener::adapters::sim::SimulatedSensors;
use gardener::config::GardenConfig;
use gardener::serial::SerialChannel;
use gardener::system::Garden;

/// Probability that a simulated sensor read fails.
const SENSOR_FAILURE_RATE: f64 = 0.02;

fn main() -> Result<()> {
    // ── 1. Configuration ──────────────────────────────────────
    let override_result = std::env::var("GARDEN_CONFIG")
        .ok()
        .map(|json| GardenConfig::from_json(&json));
    let config = match &override_result {
        Some(Ok(c)) => c.clone(),
        _ => GardenConfig::default(),
    };

    // ── 2. Serial output + logging ────────────────────────────
    let serial = Arc::new(SerialChannel::stdout(Duration::from_millis(u64::from(
        config.serial_lock_timeout_ms,
    ))));
    platform::init(&serial)?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Garden controller v{}            ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    match override_result {
        Some(Ok(_)) => info!("Config: GARDEN_CONFIG override applied"),
        Some(Err(e)) => warn!("Config: GARDEN_CONFIG rejected ({}), using defaults", e),
        None => info!("Config: defaults"),
    }

    // ── 3. Adapters ───────────────────────────────────────────
    let actuators = platform::actuators()?;
    let sensors = SimulatedSensors::new(platform::seed(), SENSOR_FAILURE_RATE);

    // ── 4. Tasks ──────────────────────────────────────────────
    let garden = Garden::new(config, serial);
    let _tasks = garden.spawn(sensors, actuators, StdinConsole::new())?;

    loop {
        std::thread::sleep(Duration::from_secs(60));
    }
}

#[cfg(target_os = "espidf")]
mod platform {
    use std::sync::Arc;

    use anyhow::Result;
    use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

    use gardener::adapters::hardware::GpioActuators;
    use gardener::app::ports::ActuatorSink;
    use gardener::pins;
    use gardener::serial::SerialChannel;

    /// Runtime patches and the ESP-IDF log backend.
    pub fn init(_serial: &Arc<SerialChannel>) -> Result<()> {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
        Ok(())
    }

    fn output(gpio: i32) -> Result<PinDriver<'static, AnyOutputPin, Output>> {
        // SAFETY: each GPIO in `pins` is claimed exactly once, here, and no
        // other driver is created for it.
        let pin = unsafe { AnyOutputPin::new(gpio) };
        Ok(PinDriver::output(pin)?)
    }

    pub fn actuators() -> Result<Arc<dyn ActuatorSink>> {
        let [l0, l1, l2] = pins::LIGHT_GPIOS;
        let [p0, p1, p2, p3, p4] = pins::PUMP_GPIOS;
        let lights = [output(l0)?, output(l1)?, output(l2)?];
        let pumps = [output(p0)?, output(p1)?, output(p2)?, output(p3)?, output(p4)?];
        Ok(Arc::new(GpioActuators::new(lights, pumps)))
    }

    pub fn seed() -> u64 {
        // SAFETY: plain read of the hardware RNG register.
        u64::from(unsafe { esp_idf_svc::sys::esp_random() })
    }
}

#[cfg(not(target_os = "espidf"))]
mod platform {
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::Result;
    use log::LevelFilter;

    use gardener::adapters::sim::RecordingActuators;
    use gardener::app::ports::ActuatorSink;
    use gardener::serial::{SerialChannel, SerialLogger};

    /// Route `log` through the serial channel.
    pub fn init(serial: &Arc<SerialChannel>) -> Result<()> {
        SerialLogger::new(Arc::clone(serial), LevelFilter::Info).install()?;
        Ok(())
    }

    pub fn actuators() -> Result<Arc<dyn ActuatorSink>> {
        Ok(Arc::new(RecordingActuators::new()))
    }

    pub fn seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}
