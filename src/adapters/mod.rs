//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter      | Implements    | Connects to                     |
//! |--------------|---------------|---------------------------------|
//! | `sim`        | SensorSource  | seeded random readings          |
//! |              | ActuatorSink  | in-memory output state          |
//! | `hardware`   | ActuatorSink  | `embedded_hal` GPIO outputs     |
//! | `console_io` | ConsoleInput  | process stdin                   |

pub mod console_io;
pub mod hardware;
pub mod sim;
