//! Traits for the board collaborator.

use crate::error::Result;
use crate::sensors::pin::{PinSpec, PinValue};

/// A configured channel on the board.
///
/// `read` polls the last value the board reported. It never blocks and
/// returns `None` when nothing has been reported yet.
pub trait Pin {
    /// The channel this handle was created for.
    fn spec(&self) -> PinSpec;

    /// Ask the board to start streaming values for this pin.
    fn enable_reporting(&mut self) -> Result<()>;

    /// Last known value, if any.
    fn read(&mut self) -> Option<PinValue>;

    /// Drive an output pin.
    fn write(&mut self, value: PinValue) -> Result<()>;
}

/// A connected board that hands out pin handles.
pub trait Board {
    type Pin: Pin;

    /// Human readable connection name, used in diagnostics.
    fn port_name(&self) -> &str;

    /// Configure a pin and return a handle to it.
    fn get_pin(&mut self, spec: PinSpec) -> Result<Self::Pin>;
}
