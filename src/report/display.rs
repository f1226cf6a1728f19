//! Display surfaces for the live field table.

use crate::error::{Result, SamplerError};
use crate::report::fields::{FieldTable, UNKNOWN};
use std::io::Write;

/// A surface showing labelled, live-updating text fields.
pub trait FieldDisplay {
    /// Replace the text of the field with `key`.
    fn set_field(&mut self, key: &str, text: &str) -> Result<()>;

    /// Push pending updates to the surface.
    fn pump_events(&mut self) -> Result<()>;
}

struct Row {
    key: String,
    label: String,
    text: String,
}

/// Terminal display that redraws the field table in place.
pub struct ConsoleDisplay<W: Write> {
    out: W,
    title: String,
    rows: Vec<Row>,
    label_width: usize,
    drawn_lines: usize,
    dirty: bool,
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, title: impl Into<String>, table: &FieldTable) -> Self {
        let rows: Vec<Row> = table
            .fields()
            .iter()
            .map(|field| Row {
                key: field.key.clone(),
                label: field.label.clone(),
                text: UNKNOWN.to_string(),
            })
            .collect();
        let label_width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);

        Self {
            out,
            title: title.into(),
            rows,
            label_width,
            drawn_lines: 0,
            dirty: true,
        }
    }

    /// Text currently held for `key`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.text.as_str())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FieldDisplay for ConsoleDisplay<W> {
    fn set_field(&mut self, key: &str, text: &str) -> Result<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.key == key)
            .ok_or_else(|| SamplerError::config_error(format!("No display field '{}'", key)))?;
        if row.text != text {
            row.text.clear();
            row.text.push_str(text);
            self.dirty = true;
        }
        Ok(())
    }

    fn pump_events(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if self.drawn_lines > 0 {
            // move back to the top of the previous frame
            write!(self.out, "\x1b[{}A", self.drawn_lines)?;
        }
        writeln!(self.out, "\x1b[2K{}", self.title)?;
        for row in &self.rows {
            writeln!(
                self.out,
                "\x1b[2K  {:<width$}  {}",
                row.label,
                row.text,
                width = self.label_width
            )?;
        }
        self.out.flush()?;

        self.drawn_lines = self.rows.len() + 1;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorLayout;

    fn display() -> ConsoleDisplay<Vec<u8>> {
        let table = FieldTable::for_layout(&SensorLayout::default());
        ConsoleDisplay::new(Vec::new(), "sensor demo", &table)
    }

    #[test]
    fn test_fields_start_unknown() {
        let display = display();
        assert_eq!(display.text("T0"), Some(UNKNOWN));
        assert_eq!(display.text("nope"), None);
    }

    #[test]
    fn test_set_and_draw() {
        let mut display = display();
        display.set_field("T0", "25.000").unwrap();
        display.pump_events().unwrap();

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert!(out.contains("sensor demo"));
        assert!(out.contains("NTC 10k Thermistor 1, C"));
        assert!(out.contains("25.000"));
    }

    #[test]
    fn test_redraw_moves_cursor_up() {
        let mut display = display();
        display.pump_events().unwrap();
        // nothing changed, nothing drawn
        display.pump_events().unwrap();
        display.set_field("PIR", "True").unwrap();
        display.pump_events().unwrap();

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(out.matches("sensor demo").count(), 2);
        assert!(out.contains("\x1b[8A"));
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let mut display = display();
        assert!(display.set_field("humidity", "42").is_err());
    }
}
