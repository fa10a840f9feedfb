use thiserror::Error;

/// Host side failures. The panel itself never fails; these come from the
/// devices and files around it.
#[derive(Debug, Error)]
pub enum PeriphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown function key slot: {0}")]
    UnknownSlot(String),

    #[error("Invalid macro {slot}: {reason}")]
    InvalidMacro { slot: String, reason: String },

    #[error("Worker channel disconnected")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, PeriphError>;
