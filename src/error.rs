//! Unified error types for the gardening controller.
//!
//! A single `Error` enum that every subsystem converts into, so task loops
//! handle failures uniformly.  All variants are `Copy` so they can be passed
//! across task boundaries and logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// The sensor registry rejected an operation.
    Registry(RegistryError),
    /// Operator input could not be interpreted.
    Input(InputError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor at this address did not answer.
    NoResponse(u8),
    /// The sensor answered with a value outside its physical range.
    OutOfRange(u8),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse(addr) => write!(f, "no response from address {addr}"),
            Self::OutOfRange(addr) => write!(f, "reading out of range at address {addr}"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// All sensor slots are taken.
    Full,
    /// No sensor is registered at this index.
    NoSuchSensor(usize),
    /// The pump address has no relay behind it.
    NoSuchPump(u8),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "sensor table full"),
            Self::NoSuchSensor(i) => write!(f, "no sensor at index {i}"),
            Self::NoSuchPump(addr) => write!(f, "no pump at address {addr}"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Operator input errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// The line is not a known command or menu choice.
    Unrecognized,
    /// A numeric field did not parse.
    NotANumber,
    /// A number parsed but is outside the accepted range.
    OutOfRange,
    /// The input stream closed in the middle of a command.
    Closed,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized => write!(f, "not recognized"),
            Self::NotANumber => write!(f, "not a number"),
            Self::OutOfRange => write!(f, "value out of range"),
            Self::Closed => write!(f, "input closed"),
        }
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
