//! Port traits: the boundary between the controller tasks and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ tasks (dispatcher, light, water, console)
//! ```
//!
//! Sensor hardware, LED/pump outputs, and the operator's input stream are
//! external collaborators.  Adapters in [`crate::adapters`] implement these
//! traits; tests implement them with recording mocks.

use crate::app::light::LightTier;
use crate::channel::LightLevel;
use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → dispatcher)
// ───────────────────────────────────────────────────────────────

/// Returned by [`SensorSource::read_light`] when the light sensor failed.
/// Any negative level is treated as an error.
pub const LIGHT_READ_ERROR: LightLevel = -1;

/// Read-side port, owned by the dispatcher.
pub trait SensorSource {
    /// Moisture reading at `address`, nominally in 250..=500.
    fn read(&mut self, address: u8) -> Result<u16, SensorError>;

    /// Ambient light level, nominally 0..=100, or [`LIGHT_READ_ERROR`].
    fn read_light(&mut self) -> LightLevel;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (tasks → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port.  Fire-and-forget; shared by the light controller and
/// every pump worker, hence `&self` and `Sync`.
pub trait ActuatorSink: Send + Sync {
    /// Drive the three grow-light outputs to `tier`.
    fn set_lights(&self, tier: LightTier);

    /// Switch pump `index` (0-based) on or off.
    fn set_pump(&self, index: usize, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Console port (operator → console task)
// ───────────────────────────────────────────────────────────────

/// Line-buffered operator input.
pub trait ConsoleInput {
    /// Next line without its terminator, or `None` once the stream closed.
    fn read_line(&mut self) -> Option<String>;
}
