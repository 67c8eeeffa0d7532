//! System configuration parameters
//!
//! All tunable parameters for the gardening controller.  Nothing here is
//! persisted; the binary starts from [`GardenConfig::default`] and may apply
//! an inline JSON override.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::error::{Error, Result};
use crate::registry::SENSOR_CAPACITY;
use crate::signals::WaitPolicy;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    // --- Sensors ---
    /// Number of moisture sensors registered at startup
    pub sensor_count: u8,
    /// Initial trigger value for every sensor (raw reading, higher = drier)
    pub default_threshold: u16,

    // --- Timing ---
    /// Moisture-read request period (milliseconds)
    pub moisture_period_ms: u32,
    /// Light controller cycle (milliseconds)
    pub light_period_ms: u32,
    /// Real time between simulated clock ticks (milliseconds)
    pub clock_tick_ms: u32,
    /// Simulated seconds added per clock tick
    pub clock_step_secs: u32,
    /// Status report interval (milliseconds)
    pub report_period_ms: u32,

    // --- Clock ---
    pub clock_start_hour: u8,
    pub clock_start_minute: u8,
    pub clock_start_second: u8,

    // --- Irrigation ---
    /// How long one pump activation lasts (milliseconds)
    pub pump_run_ms: u32,
    /// Whether pumps may run while the clock says Night
    pub irrigate_at_night: bool,
    /// Activations each pump may make per simulated day
    pub max_pump_runs_per_day: u8,

    // --- Signalling ---
    /// Dispatcher wait policy on the sensor event group
    pub sensor_wait: WaitPolicy,
    /// Water control wait policy on the pump event group
    pub pump_wait: WaitPolicy,

    // --- Serial ---
    /// Bounded wait for the serial output lock (milliseconds)
    pub serial_lock_timeout_ms: u32,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            // Sensors
            sensor_count: SENSOR_CAPACITY as u8,
            default_threshold: 450,

            // Timing
            moisture_period_ms: 5_000,
            light_period_ms: 1_000,
            clock_tick_ms: 1_000,
            clock_step_secs: 1,
            report_period_ms: 10_000,

            // Clock
            clock_start_hour: 12,
            clock_start_minute: 0,
            clock_start_second: 0,

            // Irrigation
            pump_run_ms: 3_000,
            irrigate_at_night: false,
            max_pump_runs_per_day: 10,

            // Signalling
            sensor_wait: WaitPolicy::Any,
            pump_wait: WaitPolicy::Any,

            // Serial
            serial_lock_timeout_ms: 5,
        }
    }
}

impl GardenConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            warn!(
                "Config: override rejected at line {} column {}: {}",
                e.line(),
                e.column(),
                e
            );
            match e.classify() {
                Category::Data => Error::Config("JSON field has the wrong type or value"),
                Category::Syntax | Category::Eof | Category::Io => Error::Config("malformed JSON"),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the tasks cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sensor_count as usize > SENSOR_CAPACITY {
            return Err(Error::Config("sensor_count exceeds sensor table capacity"));
        }
        if self.moisture_period_ms == 0
            || self.light_period_ms == 0
            || self.clock_tick_ms == 0
            || self.report_period_ms == 0
        {
            return Err(Error::Config("task periods must be non-zero"));
        }
        if self.clock_start_hour > 23 || self.clock_start_minute > 59 || self.clock_start_second > 59
        {
            return Err(Error::Config("clock start out of range"));
        }
        Ok(())
    }
}
