//! Error type shared by the engine, the exporter and the session layer

use thiserror::Error;

use crate::session::Permission;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Invalid bonus: {0}")]
    InvalidBonus(String),

    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    #[error("Convergence failure: {metric} did not converge after {iterations} iterations")]
    ConvergenceError {
        metric: &'static str,
        iterations: u32,
    },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Permission denied: {0}")]
    PermissionDenied(Permission),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised while validating inputs (before any schedule work)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SimulationError::InvalidRate(_)
                | SimulationError::InvalidBonus(_)
                | SimulationError::InvalidTerm(_)
                | SimulationError::InvalidInput { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
