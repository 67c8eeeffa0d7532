//! GPIO assignments for the garden controller board.
//!
//! Single source of truth: the ESP-IDF bring-up in `main` takes its pins
//! from here rather than hard-coding numbers.

// ---------------------------------------------------------------------------
// Grow lights
// ---------------------------------------------------------------------------

/// Digital outputs for the three grow-light banks, lowest tier first.
/// HIGH = bank lit.
pub const LIGHT_GPIOS: [i32; 3] = [4, 5, 6];

// ---------------------------------------------------------------------------
// Pumps
// ---------------------------------------------------------------------------

/// Relay outputs for pumps 1-5, indexed by pump address.
/// HIGH = relay closed, pump running.
pub const PUMP_GPIOS: [i32; 5] = [15, 16, 17, 18, 8];
