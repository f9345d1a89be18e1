use crate::error::{WorkoutError, WorkoutResult};
use crate::types::Coordinates;

/// Source of the user's current position.
pub trait LocationProvider {
    fn locate(&mut self) -> WorkoutResult<Coordinates>;
}

/// Position taken from configuration; `None` means no position is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Coordinates>);

impl LocationProvider for FixedLocation {
    fn locate(&mut self) -> WorkoutResult<Coordinates> {
        let Some(coords) = self.0 else {
            return Err(WorkoutError::LocationUnavailable {
                reason: "no position configured (set --lat/--lng)".to_string(),
            });
        };
        coords
            .validate()
            .map_err(|e| WorkoutError::LocationUnavailable {
                reason: e.to_string(),
            })
    }
}
