//! Operator commands and the field parsers behind the console prompts.
//!
//! Grammar (one line per token):
//!
//! ```text
//!   l  a                          light mode automatic
//!   l  m  <on 0-23>  <off 0-23>   light mode manual
//!   p  <pump 1-5>  <threshold>    per-sensor trigger
//!   t  <h|m|s>  <value>           overwrite one clock unit
//! ```

use crate::app::light::{LightMode, SharedLightMode};
use crate::clock::{SharedClock, TimeUnit};
use crate::error::{InputError, Result};
use crate::registry::{SENSOR_CAPACITY, SensorRegistry};

/// A fully parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    SetLightMode(LightMode),
    /// `pump` is the 0-based registry index.
    SetThreshold { pump: usize, threshold: u16 },
    SetTime { unit: TimeUnit, value: u8 },
}

impl ConsoleCommand {
    /// Apply to the shared state.  Nothing is touched on error.
    pub fn apply(
        self,
        registry: &SensorRegistry,
        clock: &SharedClock,
        light_mode: &SharedLightMode,
    ) -> Result<()> {
        match self {
            Self::SetLightMode(mode) => light_mode.store(mode),
            Self::SetThreshold { pump, threshold } => registry.set_threshold(pump, threshold)?,
            Self::SetTime { unit, value } => clock.set(unit, value),
        }
        Ok(())
    }
}

/// First-line command selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Light,
    Pump,
    Time,
}

pub fn parse_selector(line: &str) -> core::result::Result<Selector, InputError> {
    match line.trim() {
        "l" => Ok(Selector::Light),
        "p" => Ok(Selector::Pump),
        "t" => Ok(Selector::Time),
        _ => Err(InputError::Unrecognized),
    }
}

/// `true` for manual, `false` for automatic.
pub fn parse_light_choice(line: &str) -> core::result::Result<bool, InputError> {
    match line.trim() {
        "a" => Ok(false),
        "m" => Ok(true),
        _ => Err(InputError::Unrecognized),
    }
}

fn parse_bounded(line: &str, min: u32, max: u32) -> core::result::Result<u32, InputError> {
    let n: u32 = line.trim().parse().map_err(|_| InputError::NotANumber)?;
    if n < min || n > max {
        return Err(InputError::OutOfRange);
    }
    Ok(n)
}

pub fn parse_hour(line: &str) -> core::result::Result<u8, InputError> {
    parse_bounded(line, 0, u32::from(TimeUnit::Hour.max())).map(|h| h as u8)
}

/// Operator pump number 1-5, returned as the 0-based index.
pub fn parse_pump(line: &str) -> core::result::Result<usize, InputError> {
    parse_bounded(line, 1, SENSOR_CAPACITY as u32).map(|p| p as usize - 1)
}

pub fn parse_threshold(line: &str) -> core::result::Result<u16, InputError> {
    parse_bounded(line, 0, u32::from(u16::MAX)).map(|t| t as u16)
}

pub fn parse_unit(line: &str) -> core::result::Result<TimeUnit, InputError> {
    match line.trim() {
        "h" => Ok(TimeUnit::Hour),
        "m" => Ok(TimeUnit::Minute),
        "s" => Ok(TimeUnit::Second),
        _ => Err(InputError::Unrecognized),
    }
}

pub fn parse_unit_value(unit: TimeUnit, line: &str) -> core::result::Result<u8, InputError> {
    parse_bounded(line, 0, u32::from(unit.max())).map(|v| v as u8)
}
