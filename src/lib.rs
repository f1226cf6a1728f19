//! # latte_sense - live sensor readings from an Arduino-class board
//!
//! Polls thermistors, light dependent resistors and a PIR motion sensor on a
//! board running Firmata, converts the raw ADC fractions into physical units
//! and shows them on a terminal table or a browser dashboard, with periodic
//! summaries appended to a log file.
//!
//! ## Features
//!
//! - **Bounded-retry sampling**: unknown readings stay unknown, never zero
//! - **Thermistor conversion**: Steinhart-Hart for 10k NTC dividers
//! - **Motion edges**: counts rising edges and drives an indicator LED
//! - **Displays**: terminal field table and WebSocket dashboard
//! - **Hardware optional**: a simulated board runs anywhere
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use latte_sense::{FieldTable, LoopConfig, MemoryLog, Sampler, SensorLayout, SimulatedBoard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut log = MemoryLog::new();
//!     let mut sampler = Sampler::initialize(SimulatedBoard::new(), SensorLayout::default(), &mut log)?;
//!     let table = FieldTable::for_layout(sampler.layout());
//!
//!     let config = LoopConfig::default().with_max_cycles(Some(10));
//!     latte_sense::report::run(&mut sampler, &table, &mut [], &mut log, &config, std::future::pending()).await?;
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod error;
pub mod logging;
pub mod report;
pub mod sensors;
pub mod web;

// Re-export public API
pub use board::{ScriptedBoard, SimulatedBoard};
pub use error::{Result, SamplerError};
pub use logging::{ConsoleLog, FileLog, LogSink, MemoryLog};
pub use report::{ConsoleDisplay, FieldDisplay, FieldTable, LoopConfig, LoopSummary};
pub use sensors::{
    Board, Pin, PinSpec, PinValue, Reading, Sampler, SamplerState, SensorLayout, READ_RETRIES,
};

#[cfg(feature = "firmata")]
pub use board::FirmataBoard;

pub use web::{start_web_server, DashboardState, WebConfig, WebDisplay};

/// Serial port used when none is given
#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM5";

/// Serial port used when none is given
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// The default log file, appended to on every run
pub const DEFAULT_LOG_FILE: &str = "logfile.txt";

/// The default dashboard port
pub const DEFAULT_WEB_PORT: u16 = 8080;

/// Title shown above the field table
pub const DEFAULT_TITLE: &str = "LattePanda sensor demo";
