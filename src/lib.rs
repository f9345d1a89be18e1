pub mod cli;
pub mod error;
pub mod gpx;
pub mod location;
pub mod persistence;
pub mod render;
pub mod session;
pub mod store;
pub mod types;
pub mod utils;

pub use error::{WorkoutError, WorkoutResult};
pub use session::{SessionConfig, SessionController, SessionEvent, SessionOutcome};
pub use store::WorkoutStore;
pub use types::{Coordinates, Workout, WorkoutId, WorkoutKind};
