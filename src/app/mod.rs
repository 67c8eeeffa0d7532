//! Application core: the controller tasks.
//!
//! Every task owns handles to the shared components it needs and talks to
//! hardware and the operator only through the traits in [`ports`], so the
//! whole layer runs on the host against mocks.

pub mod commands;
pub mod console;
pub mod dispatcher;
pub mod light;
pub mod ports;
pub mod producers;
pub mod reporter;
pub mod session;
pub mod water;
