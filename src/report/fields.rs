//! The field table: which values are shown, under which labels, and how they
//! are rendered.
//!
//! Each field is identified by a [`FieldId`] whose accessor pulls the value
//! out of the sampler state. The table is built once at startup and never
//! changes afterwards.

use crate::error::{Result, SamplerError};
use crate::sensors::{Reading, SamplerState, SensorLayout};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Text shown for a value that could not be read this cycle.
pub const UNKNOWN: &str = "unknown";

/// A displayable quantity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FieldId {
    /// Thermistor temperature, key `T<n>`
    Temperature(usize),
    /// Raw light sensor fraction, key `LDR` or `LDR<n>`
    Light(usize),
    /// Motion sensor level, key `PIR`
    Motion,
    /// Rising edges seen on the motion sensor, key `pir_counter`
    MotionCount,
    /// Balance between the flanking light sensors, key `position_x`
    PositionX,
    /// Seconds since the previous sample, key `timestamp`
    SinceLastSample,
    /// Wall clock time since the loop started, key `time`
    Elapsed,
}

/// A field value ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number {
        value: Reading<f64>,
        precision: usize,
    },
    Flag(Reading<bool>),
    Count(u64),
    Elapsed(Duration),
}

impl FieldId {
    /// Parse a field key.
    pub fn parse(key: &str) -> Result<Self> {
        let id = match key {
            "PIR" => FieldId::Motion,
            "pir_counter" => FieldId::MotionCount,
            "position_x" => FieldId::PositionX,
            "timestamp" => FieldId::SinceLastSample,
            "time" => FieldId::Elapsed,
            "LDR" => FieldId::Light(0),
            _ => {
                if let Some(index) = key.strip_prefix("LDR").and_then(parse_index) {
                    FieldId::Light(index)
                } else if let Some(index) = key.strip_prefix('T').and_then(parse_index) {
                    FieldId::Temperature(index)
                } else {
                    return Err(SamplerError::config_error(format!(
                        "Unknown field key '{}'",
                        key
                    )));
                }
            }
        };
        Ok(id)
    }

    /// Canonical key for this field.
    pub fn key(&self) -> String {
        match *self {
            FieldId::Temperature(index) => format!("T{}", index),
            FieldId::Light(0) => "LDR".to_string(),
            FieldId::Light(index) => format!("LDR{}", index),
            FieldId::Motion => "PIR".to_string(),
            FieldId::MotionCount => "pir_counter".to_string(),
            FieldId::PositionX => "position_x".to_string(),
            FieldId::SinceLastSample => "timestamp".to_string(),
            FieldId::Elapsed => "time".to_string(),
        }
    }

    /// Pull this field's value out of the current state.
    pub fn value(&self, state: &SamplerState, elapsed: Duration) -> FieldValue {
        match *self {
            FieldId::Temperature(index) => FieldValue::Number {
                value: state.temperatures.get(index).copied().flatten(),
                precision: 3,
            },
            FieldId::Light(index) => FieldValue::Number {
                value: state.light.get(index).copied().flatten(),
                precision: 4,
            },
            FieldId::Motion => FieldValue::Flag(state.motion),
            FieldId::MotionCount => FieldValue::Count(state.motion_count),
            FieldId::PositionX => FieldValue::Number {
                value: state.position_x,
                precision: 3,
            },
            FieldId::SinceLastSample => FieldValue::Number {
                value: Some(state.since_last_sample),
                precision: 3,
            },
            FieldId::Elapsed => FieldValue::Elapsed(elapsed),
        }
    }

    /// Whether the layout provides this field.
    fn check(&self, layout: &SensorLayout) -> Result<()> {
        let available = match *self {
            FieldId::Temperature(index) => index < layout.thermistors.len(),
            FieldId::Light(index) => index < layout.light_sensors.len(),
            FieldId::PositionX => layout.has_position(),
            _ => true,
        };
        if available {
            Ok(())
        } else {
            Err(SamplerError::config_error(format!(
                "Field '{}' has no sensor in the current layout",
                self.key()
            )))
        }
    }
}

fn parse_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl FieldValue {
    /// Render for display. Unknown readings become [`UNKNOWN`]; a non-finite
    /// number is an error.
    pub fn render(&self) -> Result<String> {
        match self {
            FieldValue::Number {
                value: Some(v),
                precision,
            } => {
                if !v.is_finite() {
                    return Err(SamplerError::format_error(format!(
                        "cannot render non-finite value {}",
                        v
                    )));
                }
                Ok(format!("{:.*}", *precision, v))
            }
            FieldValue::Number { value: None, .. } | FieldValue::Flag(None) => {
                Ok(UNKNOWN.to_string())
            }
            FieldValue::Flag(Some(true)) => Ok("True".to_string()),
            FieldValue::Flag(Some(false)) => Ok("False".to_string()),
            FieldValue::Count(count) => Ok(count.to_string()),
            FieldValue::Elapsed(elapsed) => Ok(format_elapsed(*elapsed)),
        }
    }
}

/// Render a duration as `1w 2d 3h 4m 5.0s`, omitting zero components.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    let whole = elapsed.as_secs();
    let weeks = whole / (7 * 24 * 60 * 60);
    let days = (whole / (24 * 60 * 60)) % 7;
    let hours = (whole / (60 * 60)) % 24;
    let minutes = (whole / 60) % 60;
    let seconds = secs % 60.0;

    let mut parts = Vec::new();
    if weeks > 0 {
        parts.push(format!("{}w", weeks));
    }
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0.0 || parts.is_empty() {
        parts.push(format!("{:.1}s", seconds));
    }
    parts.join(" ")
}

/// One row of the table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub id: FieldId,
    pub key: String,
    pub label: String,
}

/// Ordered field table.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTable {
    fields: Vec<Field>,
}

impl FieldTable {
    /// Default table for `layout`: every sensor it has, plus the counters.
    pub fn for_layout(layout: &SensorLayout) -> Self {
        let mut fields = Vec::new();
        let mut push = |id: FieldId, label: String| {
            fields.push(Field {
                id,
                key: id.key(),
                label,
            })
        };

        for index in 0..layout.thermistors.len() {
            push(
                FieldId::Temperature(index),
                format!("NTC 10k Thermistor {}, C", index + 1),
            );
        }
        for index in 0..layout.light_sensors.len() {
            let label = if layout.light_sensors.len() == 1 {
                "LDR photoresistor".to_string()
            } else {
                format!("LDR photoresistor {}", index + 1)
            };
            push(FieldId::Light(index), label);
        }
        push(FieldId::Motion, "PIR motion sensor".to_string());
        push(FieldId::MotionCount, "motion events counted".to_string());
        if layout.has_position() {
            push(FieldId::PositionX, "horizontal position".to_string());
        }
        push(FieldId::SinceLastSample, "update time, s".to_string());
        push(FieldId::Elapsed, "elapsed system time".to_string());

        Self { fields }
    }

    /// Parse `key<TAB>label` lines. Two or more spaces also separate the
    /// columns; blank lines are skipped.
    pub fn parse(text: &str, layout: &SensorLayout) -> Result<Self> {
        let mut fields = Vec::new();
        let mut seen = HashSet::new();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (key, label) = line
                .split_once('\t')
                .or_else(|| line.split_once("  "))
                .ok_or_else(|| {
                    SamplerError::config_error(format!(
                        "line {}: expected '<key><TAB><label>', got '{}'",
                        number + 1,
                        line
                    ))
                })?;

            let id = FieldId::parse(key.trim())?;
            id.check(layout)?;
            if !seen.insert(id) {
                return Err(SamplerError::config_error(format!(
                    "line {}: field '{}' listed twice",
                    number + 1,
                    id.key()
                )));
            }

            fields.push(Field {
                id,
                key: id.key(),
                label: label.trim().to_string(),
            });
        }

        if fields.is_empty() {
            return Err(SamplerError::config_error("field table is empty"));
        }
        Ok(Self { fields })
    }

    /// Read and parse a field table file.
    pub fn load(path: impl AsRef<Path>, layout: &SensorLayout) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, layout)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::PinSpec;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(5300)), "5.3s");
        assert_eq!(format_elapsed(Duration::from_secs(60)), "1m");
        assert_eq!(format_elapsed(Duration::from_secs(3 * 3600 + 61)), "3h 1m 1.0s");
        assert_eq!(
            format_elapsed(Duration::from_secs(8 * 24 * 3600 + 5)),
            "1w 1d 5.0s"
        );
        assert_eq!(format_elapsed(Duration::ZERO), "0.0s");
    }

    #[test]
    fn test_absent_renders_unknown() {
        let value = FieldValue::Number {
            value: None,
            precision: 3,
        };
        assert_eq!(value.render().unwrap(), UNKNOWN);
        assert_eq!(FieldValue::Flag(None).render().unwrap(), UNKNOWN);
    }

    #[test]
    fn test_zero_is_not_unknown() {
        let value = FieldValue::Number {
            value: Some(0.0),
            precision: 3,
        };
        assert_eq!(value.render().unwrap(), "0.000");
        assert_eq!(FieldValue::Count(0).render().unwrap(), "0");
        assert_eq!(FieldValue::Flag(Some(false)).render().unwrap(), "False");
    }

    #[test]
    fn test_non_finite_is_a_format_error() {
        let value = FieldValue::Number {
            value: Some(f64::NAN),
            precision: 3,
        };
        assert!(matches!(value.render(), Err(SamplerError::Format(_))));
    }

    #[test]
    fn test_field_keys_round_trip() {
        for key in ["T0", "T1", "LDR", "LDR2", "PIR", "pir_counter", "position_x", "timestamp", "time"] {
            assert_eq!(FieldId::parse(key).unwrap().key(), key);
        }
        assert_eq!(FieldId::parse("LDR0").unwrap(), FieldId::Light(0));
        assert!(FieldId::parse("T").is_err());
        assert!(FieldId::parse("Tx").is_err());
        assert!(FieldId::parse("humidity").is_err());
    }

    #[test]
    fn test_default_table_matches_classic_form() {
        let table = FieldTable::for_layout(&SensorLayout::default());
        let keys: Vec<&str> = table.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["T0", "T1", "LDR", "PIR", "pir_counter", "timestamp", "time"]
        );
        assert_eq!(table.fields()[0].label, "NTC 10k Thermistor 1, C");
    }

    #[test]
    fn test_position_field_follows_layout() {
        let layout = SensorLayout::default()
            .with_flanks(PinSpec::analog_input(3), PinSpec::analog_input(4));
        let table = FieldTable::for_layout(&layout);
        assert!(table.fields().iter().any(|f| f.id == FieldId::PositionX));

        assert!(FieldTable::parse("position_x\tpos", &SensorLayout::default()).is_err());
        assert!(FieldTable::parse("position_x\tpos", &layout).is_ok());
    }

    #[test]
    fn test_parse_table() {
        let text = "
            T0          \t  Inlet, C
            LDR   light level
            time\tuptime
        ";
        let table = FieldTable::parse(text, &SensorLayout::default()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.fields()[0].label, "Inlet, C");
        assert_eq!(table.fields()[1].id, FieldId::Light(0));
        assert_eq!(table.fields()[1].label, "light level");
        assert_eq!(table.fields()[2].id, FieldId::Elapsed);
    }

    #[test]
    fn test_parse_rejects_bad_tables() {
        let layout = SensorLayout::default();
        assert!(FieldTable::parse("", &layout).is_err());
        assert!(FieldTable::parse("T0", &layout).is_err());
        assert!(FieldTable::parse("T5\tfifth", &layout).is_err());
        assert!(FieldTable::parse("LDR\ta\nLDR0\tb", &layout).is_err());
    }
}
