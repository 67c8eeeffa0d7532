//! Garden controller library.
//!
//! Simulated automated gardening on preemptive tasks: moisture-driven
//! irrigation, day/night grow-light control, a simulated clock, and an
//! operator console with periodic status reports.  Everything except the
//! ESP-IDF bring-up in `main` builds and tests on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod pins;
pub mod registry;
pub mod serial;
pub mod signals;
pub mod system;
pub mod task;
