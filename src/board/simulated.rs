//! Board that synthesises plausible sensor values without any hardware.
//!
//! Analog channels follow slow sine waves around half scale, each with its
//! own period and phase. Digital inputs toggle high for a few seconds every
//! twenty. As with a real board, the first read after enabling reporting is
//! empty.

use crate::error::{Result, SamplerError};
use crate::sensors::{Board, Pin, PinKind, PinSpec, PinValue};
use std::time::Instant;

/// Seconds in one motion cycle of a simulated digital input.
const MOTION_PERIOD_S: f64 = 20.0;
/// Seconds the simulated digital input stays high per cycle.
const MOTION_HIGH_S: f64 = 4.0;

/// Hardware-free board.
pub struct SimulatedBoard {
    port: String,
    started: Instant,
}

/// Pin handle handed out by [`SimulatedBoard`].
pub struct SimulatedPin {
    spec: PinSpec,
    started: Instant,
    reporting: bool,
    primed: bool,
    output: Option<bool>,
}

impl SimulatedBoard {
    pub fn new() -> Self {
        Self {
            port: "simulated".to_string(),
            started: Instant::now(),
        }
    }
}

impl Default for SimulatedBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Board for SimulatedBoard {
    type Pin = SimulatedPin;

    fn port_name(&self) -> &str {
        &self.port
    }

    fn get_pin(&mut self, spec: PinSpec) -> Result<SimulatedPin> {
        Ok(SimulatedPin {
            spec,
            started: self.started,
            reporting: false,
            primed: false,
            output: None,
        })
    }
}

/// Synthetic value for `spec` at `t` seconds after start.
pub fn synthetic_value(spec: PinSpec, t: f64) -> PinValue {
    let index = f64::from(spec.index);
    match spec.kind {
        PinKind::Analog => {
            let period = 30.0 + 45.0 * index;
            let phase = index * std::f64::consts::FRAC_PI_2;
            let fraction = 0.5 + 0.15 * (std::f64::consts::TAU * t / period + phase).sin();
            PinValue::Analog((fraction * 10_000.0).round() / 10_000.0)
        }
        PinKind::Digital => PinValue::Digital(t.rem_euclid(MOTION_PERIOD_S) < MOTION_HIGH_S),
    }
}

impl Pin for SimulatedPin {
    fn spec(&self) -> PinSpec {
        self.spec
    }

    fn enable_reporting(&mut self) -> Result<()> {
        if !self.spec.is_input() {
            return Err(SamplerError::pin_error(format!(
                "cannot enable reporting on output pin {}",
                self.spec
            )));
        }
        self.reporting = true;
        Ok(())
    }

    fn read(&mut self) -> Option<PinValue> {
        if !self.spec.is_input() {
            return self.output.map(PinValue::Digital);
        }
        if !self.reporting {
            return None;
        }
        if !self.primed {
            self.primed = true;
            return None;
        }
        Some(synthetic_value(self.spec, self.started.elapsed().as_secs_f64()))
    }

    fn write(&mut self, value: PinValue) -> Result<()> {
        if self.spec.is_input() {
            return Err(SamplerError::pin_error(format!(
                "cannot write to input pin {}",
                self.spec
            )));
        }
        self.output = Some(value.as_bool());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_read_after_reporting_is_empty() {
        let mut board = SimulatedBoard::new();
        let mut pin = board.get_pin(PinSpec::analog_input(0)).unwrap();
        assert!(pin.read().is_none());

        pin.enable_reporting().unwrap();
        assert!(pin.read().is_none());
        assert!(pin.read().is_some());
    }

    #[test]
    fn test_analog_values_stay_in_range() {
        for step in 0..500 {
            let t = step as f64 * 0.7;
            for index in 0..6 {
                let fraction = synthetic_value(PinSpec::analog_input(index), t).as_fraction();
                assert!(fraction > 0.0 && fraction < 1.0);
            }
        }
    }

    #[test]
    fn test_motion_toggles() {
        let spec = PinSpec::digital_input(9);
        assert_eq!(synthetic_value(spec, 1.0), PinValue::Digital(true));
        assert_eq!(synthetic_value(spec, 10.0), PinValue::Digital(false));
        assert_eq!(synthetic_value(spec, 21.0), PinValue::Digital(true));
    }

    #[test]
    fn test_output_pin_echoes_writes() {
        let mut board = SimulatedBoard::new();
        let mut led = board.get_pin(PinSpec::digital_output(13)).unwrap();
        assert!(led.enable_reporting().is_err());
        led.write(PinValue::Digital(true)).unwrap();
        assert_eq!(led.read(), Some(PinValue::Digital(true)));
    }
}
