//! Ledger source error types.

use bilan_shared::AppError;
use thiserror::Error;

/// Ledger loading errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The project has no ledger data.
    #[error("no ledger data for project '{project_id}'")]
    NotFound {
        /// Requested project.
        project_id: String,
    },

    /// Transport or storage failure.
    #[error("ledger source unavailable: {0}")]
    Unavailable(String),

    /// The backend could not be built from configuration.
    #[error("ledger source configuration error: {0}")]
    Configuration(String),
}

impl SourceError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(project_id: impl Into<String>) -> Self {
        Self::NotFound {
            project_id: project_id.into(),
        }
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<opendal::Error> for SourceError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Unavailable(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound { .. } => Self::NotFound(err.to_string()),
            SourceError::Unavailable(_) => Self::ExternalService(err.to_string()),
            SourceError::Configuration(_) => Self::Internal(err.to_string()),
        }
    }
}
