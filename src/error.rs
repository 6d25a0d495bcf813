use std::path::PathBuf;

use thiserror::Error;

/// Fatal pipeline failure.
///
/// Every variant names the stage that failed so the message printed by `main`
/// is actionable without a backtrace.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("unexpected data shape: {0}")]
    Shape(String),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("failed to write report '{}': {message}", .path.display())]
    Persist { path: PathBuf, message: String },
}

impl AppError {
    pub fn persist(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Persist {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Retrieval(_) => 3,
            AppError::Shape(_) => 4,
            AppError::Render(_) => 5,
            AppError::Persist { .. } => 6,
        }
    }
}
