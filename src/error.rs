//! Error types.
//!
//! - `ChartError`: the adapter's failure taxonomy (what went wrong with the data contract)
//! - `AppError`: what the binary reports (message + process exit code)

use thiserror::Error;

/// Failures of a single render attempt.
///
/// Every variant aborts the attempt before the rendering port is called.
#[derive(Debug, Error)]
pub enum ChartError {
    /// A required data element or the drawing surface is absent from the document.
    #[error("missing element '#{id}' in document")]
    MissingElement { id: String },

    /// Embedded content did not deserialize into the expected array shape.
    #[error("malformed data in '#{id}': {reason}")]
    MalformedData { id: String, reason: String },

    /// A score series does not have one value per label.
    #[error("series '{series}' has {scores} values but there are {labels} labels")]
    ShapeMismatch {
        series: String,
        labels: usize,
        scores: usize,
    },

    #[error("invalid style: {reason}")]
    InvalidStyle { reason: String },

    /// The rendering engine failed after the spec was accepted.
    #[error("render failed: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChartError {
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        ChartError::MalformedData {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn render(reason: impl Into<String>) -> Self {
        ChartError::Render {
            reason: reason.into(),
        }
    }

    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            ChartError::MissingElement { .. } | ChartError::Io(_) => 2,
            ChartError::MalformedData { .. }
            | ChartError::ShapeMismatch { .. }
            | ChartError::InvalidStyle { .. } => 3,
            ChartError::Render { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ChartError> for AppError {
    fn from(err: ChartError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
