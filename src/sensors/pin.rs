//! Pin addressing.
//!
//! Pins are named with the compact `"<kind>:<index>:<direction>"` form used by
//! most Firmata hosts, e.g. `a:0:i` for analog input 0 or `d:13:o` for digital
//! output 13.

use crate::error::{Result, SamplerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of physical channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PinKind {
    /// Analog input channel (A0, A1, ...)
    Analog,
    /// Digital I/O pin (D0, D1, ...)
    Digital,
}

/// Direction a pin is configured for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PinDirection {
    Input,
    Output,
}

/// A single physical channel on the board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PinSpec {
    pub kind: PinKind,
    pub index: u8,
    pub direction: PinDirection,
}

/// Last value seen on a pin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum PinValue {
    /// ADC fraction in `[0.0, 1.0]`
    Analog(f64),
    /// Logic level
    Digital(bool),
}

impl PinSpec {
    pub const fn analog_input(index: u8) -> Self {
        Self {
            kind: PinKind::Analog,
            index,
            direction: PinDirection::Input,
        }
    }

    pub const fn digital_input(index: u8) -> Self {
        Self {
            kind: PinKind::Digital,
            index,
            direction: PinDirection::Input,
        }
    }

    pub const fn digital_output(index: u8) -> Self {
        Self {
            kind: PinKind::Digital,
            index,
            direction: PinDirection::Output,
        }
    }

    pub fn is_input(&self) -> bool {
        self.direction == PinDirection::Input
    }
}

impl FromStr for PinSpec {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let [kind, index, direction] = parts.as_slice() else {
            return Err(SamplerError::pin_error(format!(
                "Invalid pin specification '{}', expected <a|d>:<index>:<i|o>",
                s
            )));
        };

        let kind = match *kind {
            "a" => PinKind::Analog,
            "d" => PinKind::Digital,
            other => {
                return Err(SamplerError::pin_error(format!(
                    "Unknown pin kind '{}' in '{}'",
                    other, s
                )))
            }
        };

        let index = index.parse::<u8>().map_err(|e| {
            SamplerError::pin_error(format!("Invalid pin index in '{}': {}", s, e))
        })?;

        let direction = match *direction {
            "i" => PinDirection::Input,
            "o" => PinDirection::Output,
            other => {
                return Err(SamplerError::pin_error(format!(
                    "Unknown pin direction '{}' in '{}'",
                    other, s
                )))
            }
        };

        if kind == PinKind::Analog && direction == PinDirection::Output {
            return Err(SamplerError::pin_error(format!(
                "Analog pin '{}' cannot be used as an output",
                s
            )));
        }

        Ok(Self {
            kind,
            index,
            direction,
        })
    }
}

impl fmt::Display for PinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PinKind::Analog => 'a',
            PinKind::Digital => 'd',
        };
        let direction = match self.direction {
            PinDirection::Input => 'i',
            PinDirection::Output => 'o',
        };
        write!(f, "{}:{}:{}", kind, self.index, direction)
    }
}

impl PinValue {
    /// The value as an ADC fraction. Digital levels map to 0.0 / 1.0.
    pub fn as_fraction(&self) -> f64 {
        match *self {
            PinValue::Analog(v) => v,
            PinValue::Digital(true) => 1.0,
            PinValue::Digital(false) => 0.0,
        }
    }

    /// The value as a logic level. Analog values are thresholded at half scale.
    pub fn as_bool(&self) -> bool {
        match *self {
            PinValue::Analog(v) => v >= 0.5,
            PinValue::Digital(level) => level,
        }
    }
}

impl fmt::Display for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinValue::Analog(v) => write!(f, "{:.4}", v),
            PinValue::Digital(true) => write!(f, "True"),
            PinValue::Digital(false) => write!(f, "False"),
        }
    }
}
