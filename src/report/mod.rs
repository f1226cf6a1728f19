//! Rendering and reporting of sampler state.

pub mod display;
pub mod fields;
pub mod runner;

pub use display::{ConsoleDisplay, FieldDisplay};
pub use fields::{format_elapsed, Field, FieldId, FieldTable, FieldValue, UNKNOWN};
pub use runner::{run, summary_line, LoopConfig, LoopSummary};
