//! Error types for snapshot preview operations.

use thiserror::Error;

/// Primary error type for snapshot and preview operations.
#[derive(Error, Debug)]
pub enum SnapError {
    // Engine errors
    #[error("Snapshot {op} failed for '{name}': {message}")]
    Engine {
        op: &'static str,
        name: String,
        message: String,
    },

    // Graphics errors
    #[error("Graphics read failed: {0}")]
    Graphics(String),

    #[error("No frame available to capture")]
    NoFrame,

    // Preview file errors
    #[error("Invalid preview file {path}: {reason}")]
    InvalidPreview { path: String, reason: String },

    #[error("Preview file not found: {path}")]
    PreviewNotFound { path: String },

    #[error("Short write to {path}: wrote {written} of {expected} bytes")]
    ShortWrite {
        path: String,
        written: usize,
        expected: usize,
    },

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    // Stream errors
    #[error("Extra-data chunk truncated: expected {expected} bytes, got {actual}")]
    TruncatedChunk { expected: u32, actual: usize },

    // Configuration errors
    #[error("Preview storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl SnapError {
    /// Build an engine failure for the named verb.
    pub fn engine(op: &'static str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Engine {
            op,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PreviewNotFound { .. }
                | Self::InvalidPreview { .. }
                | Self::StorageUnavailable(_)
                | Self::ConfigParse(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::PreviewNotFound { .. } => Some("Save a snapshot first to generate its preview"),
            Self::StorageUnavailable(_) => Some("Set XSNAP_BASE_DIR to a writable directory"),
            Self::InvalidPreview { .. } => Some("Re-save the snapshot to regenerate the preview"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using SnapError.
pub type Result<T> = std::result::Result<T, SnapError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| SnapError::Other(format!("{}: {e}", f().into())))
    }
}
