//! Sensor sampling and derived quantities.
//!
//! This module holds the pin model, the board traits, the thermistor and
//! light conversions, and the [`Sampler`] that ties them together.

pub mod convert;
pub mod data;
pub mod layout;
pub mod pin;
pub mod sampler;
pub mod traits;

// Re-export commonly used items
pub use data::{Reading, SamplerState};
pub use layout::SensorLayout;
pub use pin::{PinDirection, PinKind, PinSpec, PinValue};
pub use sampler::{read_raw, read_temperature, MotionEdge, Sampler, READ_RETRIES};
pub use traits::{Board, Pin};
