//! Board implementations.
//!
//! The Firmata board talks to real hardware and is feature-gated so the crate
//! builds without the board client. The simulated and scripted boards
//! are always available.

pub mod firmata;
pub mod scripted;
pub mod simulated;

#[cfg(feature = "firmata")]
pub use firmata::FirmataBoard;
pub use scripted::ScriptedBoard;
pub use simulated::SimulatedBoard;
