use crate::session::{DEFAULT_ZOOM, FormInput};
use crate::types::{Coordinates, WorkoutId, WorkoutKind};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB: &str = "waypost.db";

#[derive(Parser, Debug)]
#[command(
    name = "waypost",
    about = "Log running and cycling workouts pinned to map locations"
)]
pub struct Cli {
    /// SQLite file holding the saved workouts.
    #[arg(long, env = "WAYPOST_DB", default_value = DEFAULT_DB, global = true)]
    pub db: PathBuf,

    /// Current latitude, used as the map centre.
    #[arg(long, env = "WAYPOST_LAT", allow_hyphen_values = true, global = true)]
    pub lat: Option<f64>,

    /// Current longitude, used as the map centre.
    #[arg(long, env = "WAYPOST_LNG", allow_hyphen_values = true, global = true)]
    pub lng: Option<f64>,

    /// Map zoom level for the initial view and for jumping to a workout.
    #[arg(long, default_value_t = DEFAULT_ZOOM, global = true)]
    pub zoom: u8,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

impl Cli {
    /// Device position, when both halves were given.
    pub const fn position(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print saved workouts in the order they were logged.
    List,

    /// Log a new workout.
    Add {
        #[command(subcommand)]
        workout: AddCmd,
    },

    /// Centre the map on a saved workout.
    Show { id: WorkoutId },

    /// Write all workouts to a GPX file as waypoints.
    ExportGpx { path: PathBuf },

    /// Delete every saved workout.
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum AddCmd {
    Running {
        #[command(flatten)]
        common: CommonArgs,

        /// Steps per minute.
        #[arg(long, allow_hyphen_values = true)]
        cadence: String,
    },
    Cycling {
        #[command(flatten)]
        common: CommonArgs,

        /// Elevation gain in metres; blank means zero.
        #[arg(long, allow_hyphen_values = true, default_value = "")]
        elevation: String,
    },
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Distance in km.
    #[arg(long, allow_hyphen_values = true)]
    pub distance: String,

    /// Duration in minutes.
    #[arg(long, allow_hyphen_values = true)]
    pub duration: String,

    /// Where the workout happened; defaults to the current position.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub at: Option<Coordinates>,
}

impl AddCmd {
    /// Form fields as typed, plus the clicked location if one was given.
    pub fn into_form(self) -> (FormInput, Option<Coordinates>) {
        match self {
            Self::Running { common, cadence } => {
                let mut form = FormInput::new(WorkoutKind::Running);
                form.distance = common.distance;
                form.duration = common.duration;
                form.cadence = cadence;
                (form, common.at)
            }
            Self::Cycling { common, elevation } => {
                let mut form = FormInput::new(WorkoutKind::Cycling);
                form.distance = common.distance;
                form.duration = common.duration;
                form.elevation = elevation;
                (form, common.at)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_running_with_location() {
        let cli = Cli::try_parse_from([
            "waypost", "--lat", "51.5", "--lng", "-0.12", "add", "running", "--distance", "5",
            "--duration", "30", "--cadence", "170", "--at", "51.51,-0.13",
        ])
        .unwrap();
        assert_eq!(cli.position(), Some(Coordinates::new(51.5, -0.12)));

        let Cmd::Add { workout } = cli.cmd else {
            panic!("expected add");
        };
        let (form, at) = workout.into_form();
        assert_eq!(form.kind, WorkoutKind::Running);
        assert_eq!(form.visible_extra_field(), "170");
        assert_eq!(at, Some(Coordinates::new(51.51, -0.13)));
    }

    #[test]
    fn cycling_elevation_defaults_blank() {
        let cli = Cli::try_parse_from([
            "waypost", "add", "cycling", "--distance", "20", "--duration", "60",
        ])
        .unwrap();
        let Cmd::Add { workout } = cli.cmd else {
            panic!("expected add");
        };
        let (form, at) = workout.into_form();
        assert_eq!(form.elevation, "");
        assert_eq!(at, None);
    }
}
