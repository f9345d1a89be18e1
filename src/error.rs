use crate::types::WorkoutId;
use thiserror::Error;

pub type WorkoutResult<T> = Result<T, WorkoutError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkoutError {
    #[error("Invalid workout input for {field}: {value}")]
    InvalidWorkoutInput { field: &'static str, value: f64 },

    #[error("No workout with id {id}")]
    NotFound { id: WorkoutId },

    #[error("Corrupt persisted data: {reason}")]
    CorruptPersistedData { reason: String },

    #[error("Location unavailable: {reason}")]
    LocationUnavailable { reason: String },
}

impl WorkoutError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptPersistedData {
            reason: reason.into(),
        }
    }

    /// Message shown to the user when the error reaches the UI boundary.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidWorkoutInput { .. } => "Inputs have to be positive numbers!".to_string(),
            Self::LocationUnavailable { .. } => "Could not get your current position".to_string(),
            other => other.to_string(),
        }
    }
}
