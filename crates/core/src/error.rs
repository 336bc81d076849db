/// Result alias that carries the custom [`AutoplayError`] type.
pub type Result<T> = std::result::Result<T, AutoplayError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum AutoplayError {
    /// Free-form error surfaced by the application layer.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Chart or configuration JSON could not be read or written.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Generation needs at least one target to place the warm-up frames.
    #[error("chart contains no targets")]
    EmptyChart,
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A target in the chart has inconsistent timing.
    #[error("target #{index} is malformed: {reason}")]
    InvalidTarget { index: usize, reason: String },
    /// A hold zone closed while neither button was held. The timeline or the
    /// hold-zone bookkeeping is corrupt and the run cannot continue.
    #[error("hold zone closed at {time}ms while no button was held")]
    ReleaseWithoutHold { time: f64 },
}

impl AutoplayError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for AutoplayError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for AutoplayError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
