//! Data structures for sensor readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value that may be unknown for the current cycle.
///
/// `None` means the pin produced nothing within the retry budget. It is never
/// coerced to zero.
pub type Reading<T> = Option<T>;

/// The latest readings and derived quantities, refreshed once per cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplerState {
    /// Thermistor temperatures in Celsius, one per configured thermistor
    pub temperatures: Vec<Reading<f64>>,
    /// Raw light sensor ADC fractions, one per configured light sensor
    pub light: Vec<Reading<f64>>,
    /// Motion sensor level
    pub motion: Reading<bool>,
    /// Number of rising edges seen on the motion sensor
    pub motion_count: u64,
    /// Illumination balance between the flanking light sensors, in `[-1, 1]`
    pub position_x: Reading<f64>,
    /// Seconds between the end of the previous sample and the start of this one
    pub since_last_sample: f64,
    /// Number of completed sampling cycles
    pub cycle: u64,
    /// Wall clock time of the last sample
    pub sampled_at: DateTime<Utc>,
}

impl SamplerState {
    /// Create an empty state sized for the given number of channels.
    pub fn new(thermistors: usize, light_sensors: usize) -> Self {
        Self {
            temperatures: vec![None; thermistors],
            light: vec![None; light_sensors],
            ..Default::default()
        }
    }
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            temperatures: Vec::new(),
            light: Vec::new(),
            motion: None,
            motion_count: 0,
            position_x: None,
            since_last_sample: 0.0,
            cycle: 0,
            sampled_at: Utc::now(),
        }
    }
}
