//! Which pins the sampler reads.

use crate::error::{Result, SamplerError};
use crate::sensors::pin::{PinKind, PinSpec};
use serde::{Deserialize, Serialize};

/// Analog channels a Firmata board can report.
pub const ANALOG_CHANNELS: usize = 16;

/// Pin assignment for the sensors wired to the board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorLayout {
    /// NTC thermistor dividers, reported as T0, T1, ...
    pub thermistors: Vec<PinSpec>,
    /// Light dependent resistors, reported as LDR, LDR1, ...
    pub light_sensors: Vec<PinSpec>,
    /// Passive infrared motion sensor
    pub motion: PinSpec,
    /// Light sensor on the left, used for the horizontal position
    pub ldr_left: Option<PinSpec>,
    /// Light sensor on the right, used for the horizontal position
    pub ldr_right: Option<PinSpec>,
    /// Indicator LED driven on motion edges
    pub led: Option<PinSpec>,
}

impl Default for SensorLayout {
    fn default() -> Self {
        Self {
            thermistors: vec![PinSpec::analog_input(0), PinSpec::analog_input(1)],
            light_sensors: vec![PinSpec::analog_input(2)],
            motion: PinSpec::digital_input(9),
            ldr_left: None,
            ldr_right: None,
            led: None,
        }
    }
}

impl SensorLayout {
    /// Set the flanking light sensors used for `position_x`.
    pub fn with_flanks(mut self, left: PinSpec, right: PinSpec) -> Self {
        self.ldr_left = Some(left);
        self.ldr_right = Some(right);
        self
    }

    /// Set the motion indicator LED.
    pub fn with_led(mut self, led: PinSpec) -> Self {
        self.led = Some(led);
        self
    }

    /// Whether a horizontal position can be derived.
    pub fn has_position(&self) -> bool {
        self.ldr_left.is_some() && self.ldr_right.is_some()
    }

    /// Check pin kinds and directions before touching the board.
    pub fn validate(&self) -> Result<()> {
        let analog_inputs = self
            .thermistors
            .iter()
            .chain(&self.light_sensors)
            .chain(self.ldr_left.iter())
            .chain(self.ldr_right.iter());
        for spec in analog_inputs {
            if spec.kind != PinKind::Analog || !spec.is_input() {
                return Err(SamplerError::config_error(format!(
                    "{} must be an analog input",
                    spec
                )));
            }
            if usize::from(spec.index) >= ANALOG_CHANNELS {
                return Err(SamplerError::config_error(format!(
                    "{} is beyond the board's {} analog channels",
                    spec, ANALOG_CHANNELS
                )));
            }
        }

        if !self.motion.is_input() {
            return Err(SamplerError::config_error(format!(
                "Motion sensor pin {} must be an input",
                self.motion
            )));
        }

        if let Some(led) = self.led {
            if led.kind != PinKind::Digital || led.is_input() {
                return Err(SamplerError::config_error(format!(
                    "LED pin {} must be a digital output",
                    led
                )));
            }
        }

        if self.ldr_left.is_some() != self.ldr_right.is_some() {
            return Err(SamplerError::config_error(
                "Both left and right light sensors are needed for position_x",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let layout = SensorLayout::default();
        assert!(layout.validate().is_ok());
        assert!(!layout.has_position());
        assert_eq!(layout.thermistors.len(), 2);
    }

    #[test]
    fn test_analog_channel_out_of_range_is_rejected() {
        let layout = SensorLayout::default()
            .with_flanks(PinSpec::analog_input(3), PinSpec::analog_input(17));
        assert!(layout.validate().is_err());

        let layout = SensorLayout::default()
            .with_flanks(PinSpec::analog_input(3), PinSpec::analog_input(15));
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_single_flank_is_rejected() {
        let mut layout = SensorLayout::default();
        layout.ldr_left = Some(PinSpec::analog_input(3));
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_led_must_be_output() {
        let layout = SensorLayout::default().with_led(PinSpec::digital_input(13));
        assert!(layout.validate().is_err());

        let layout = SensorLayout::default().with_led(PinSpec::digital_output(13));
        assert!(layout.validate().is_ok());
    }
}
