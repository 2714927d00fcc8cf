/// Result alias that carries the custom [`SortVizError`] type.
pub type Result<T> = std::result::Result<T, SortVizError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SortVizError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// A configuration value or caller argument is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors (terminal, files).
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// Writing an exported audio track failed.
    #[error("failed to write wav: {0}")]
    Wav(#[from] hound::Error),
    /// The audio device could not be opened or started.
    #[error("audio device error: {0}")]
    Audio(String),
}

impl SortVizError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn audio(err: impl std::fmt::Display) -> Self {
        Self::Audio(err.to_string())
    }
}

impl From<&str> for SortVizError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SortVizError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
