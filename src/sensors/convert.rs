//! Conversions from raw ADC fractions to physical quantities.

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Fixed resistor in the thermistor voltage divider, in ohms.
pub const REFERENCE_OHMS: f64 = 10_000.0;

/// Steinhart-Hart coefficients for a 10k NTC thermistor.
pub const STEINHART_A: f64 = 0.001125308852122;
pub const STEINHART_B: f64 = 0.000234711863267;
pub const STEINHART_C: f64 = 0.000000085663516;

/// Thermistor resistance for a divider reading.
///
/// Returns `None` at or beyond the rails, where the divider is open or shorted.
pub fn thermistor_ohms(fraction: f64) -> Option<f64> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return None;
    }
    Some(REFERENCE_OHMS / (1.0 / fraction - 1.0))
}

/// Temperature in Celsius for a thermistor divider reading, using the
/// Steinhart-Hart approximation.
pub fn steinhart_hart_celsius(fraction: f64) -> Option<f64> {
    let ln_r = thermistor_ohms(fraction)?.ln();
    let inverse_kelvin = STEINHART_A + STEINHART_B * ln_r + STEINHART_C * ln_r * ln_r * ln_r;
    Some(1.0 / inverse_kelvin - KELVIN_OFFSET)
}

/// Signed illumination balance between two flanking light sensors.
///
/// `-1.0` is fully left, `1.0` fully right. `None` when both read zero.
pub fn position_x(left: f64, right: f64) -> Option<f64> {
    let total = right + left;
    if total == 0.0 {
        return None;
    }
    Some((right - left) / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_scale_is_reference_resistance() {
        let ohms = thermistor_ohms(0.5).unwrap();
        assert!((ohms - REFERENCE_OHMS).abs() < 1e-9);

        // 10k thermistor at 10k ohms sits at roughly 25 C
        let celsius = steinhart_hart_celsius(0.5).unwrap();
        assert!((celsius - 25.0).abs() < 0.1, "got {}", celsius);
    }

    #[test]
    fn test_monotonic_over_grid() {
        // Higher divider fraction means higher resistance, which this NTC
        // model maps to a lower temperature.
        let mut previous = f64::INFINITY;
        for step in 1..1000 {
            let fraction = step as f64 / 1000.0;
            let celsius = steinhart_hart_celsius(fraction).unwrap();
            assert!(celsius.is_finite());
            assert!(celsius < previous, "not decreasing at {}", fraction);
            previous = celsius;
        }
    }

    #[test]
    fn test_rails_are_absent() {
        assert!(steinhart_hart_celsius(0.0).is_none());
        assert!(steinhart_hart_celsius(1.0).is_none());
        assert!(steinhart_hart_celsius(-0.1).is_none());
        assert!(steinhart_hart_celsius(f64::NAN).is_none());
    }

    #[test]
    fn test_position_x() {
        assert_eq!(position_x(0.4, 0.4), Some(0.0));
        assert_eq!(position_x(0.0, 0.7), Some(1.0));
        assert_eq!(position_x(0.7, 0.0), Some(-1.0));
        assert_eq!(position_x(0.0, 0.0), None);
    }
}
