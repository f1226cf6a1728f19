//! Error handling for the latte_sense crate.

/// A specialized `Result` type for latte_sense operations.
pub type Result<T> = std::result::Result<T, SamplerError>;

/// The main error type for board, sampling and display operations.
///
/// Absent pin readings are not errors; they are carried as `None` in the
/// sampler state.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The Firmata board layer failed (only available with firmata feature)
    #[cfg(feature = "firmata")]
    #[error("Board error: {0}")]
    Hardware(#[from] hermes_five::errors::Error),

    /// The board connection could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// A pin specification was invalid or the pin could not be configured
    #[error("Pin error: {0}")]
    Pin(String),

    /// A field value could not be rendered
    #[error("Format error: {0}")]
    Format(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),
}

impl SamplerError {
    /// Create a new connection error
    pub fn connection_error(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a new pin error
    pub fn pin_error(msg: impl Into<String>) -> Self {
        Self::Pin(msg.into())
    }

    /// Create a new format error
    pub fn format_error(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }
}
