use crate::error::{WorkoutError, WorkoutResult};
use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a workout inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(Uuid);

impl WorkoutId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkoutId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A `(latitude, longitude)` pair in degrees. Persisted as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn validate(self) -> WorkoutResult<Self> {
        let lat = require_finite("latitude", self.lat)?;
        let lng = require_finite("longitude", self.lng)?;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(WorkoutError::InvalidWorkoutInput {
                field: "latitude",
                value: lat,
            });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(WorkoutError::InvalidWorkoutInput {
                field: "longitude",
                value: lng,
            });
        }
        Ok(self)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

impl FromStr for Coordinates {
    type Err = String;

    /// Parses `"LAT,LNG"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG but got {s:?}"))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad latitude {lat:?}: {e}"))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad longitude {lng:?}: {e}"))?;
        Ok(Self { lat, lng })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    pub const fn popup_class(self) -> &'static str {
        match self {
            Self::Running => "running-popup",
            Self::Cycling => "cycling-popup",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for WorkoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "cycling" => Ok(Self::Cycling),
            other => Err(format!("unknown workout kind {other:?}")),
        }
    }
}

/// Kind-specific input and derived metric of a workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

/// Pace in min/km for running, speed in km/h for cycling.
pub fn derive_metric(kind: WorkoutKind, distance_km: f64, duration_min: f64) -> f64 {
    match kind {
        WorkoutKind::Running => duration_min / distance_km,
        WorkoutKind::Cycling => distance_km / (duration_min / 60.0),
    }
}

/// `"<Kind> on <Month> <Day>"`, from the calendar date of `created_at` in its own offset.
pub fn describe(kind: WorkoutKind, created_at: DateTime<FixedOffset>) -> String {
    format!("{} on {}", kind.label(), created_at.format("%B %-d"))
}

/// Current time with the local UTC offset attached.
pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

pub(crate) fn require_finite(field: &'static str, value: f64) -> WorkoutResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(WorkoutError::InvalidWorkoutInput { field, value })
    }
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> WorkoutResult<f64> {
    let value = require_finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(WorkoutError::InvalidWorkoutInput { field, value })
    }
}

/// Raw inputs for one workout, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewWorkout {
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub coords: Coordinates,
    /// Cadence (spm) for running, elevation gain (m) for cycling.
    pub extra: f64,
}

impl NewWorkout {
    pub fn validate(&self) -> WorkoutResult<()> {
        require_positive("distance", self.distance_km)?;
        require_positive("duration", self.duration_min)?;
        match self.kind {
            WorkoutKind::Running => require_positive("cadence", self.extra)?,
            WorkoutKind::Cycling => require_finite("elevation", self.extra)?,
        };
        self.coords.validate()?;

        // Finite inputs can still overflow the quotient, e.g. 1e10 min over 1e-300 km.
        let metric_field = match self.kind {
            WorkoutKind::Running => "pace",
            WorkoutKind::Cycling => "speed",
        };
        require_finite(
            metric_field,
            derive_metric(self.kind, self.distance_km, self.duration_min),
        )?;
        Ok(())
    }
}

/// One logged activity. Every field is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<FixedOffset>,
    distance_km: f64,
    duration_min: f64,
    coords: Coordinates,
    description: String,
    activity: Activity,
}

impl Workout {
    /// Validates `input` again; nothing is built from invalid numbers.
    pub(crate) fn build(
        id: WorkoutId,
        created_at: DateTime<FixedOffset>,
        input: &NewWorkout,
    ) -> WorkoutResult<Self> {
        input.validate()?;

        let metric = derive_metric(input.kind, input.distance_km, input.duration_min);
        let activity = match input.kind {
            WorkoutKind::Running => Activity::Running {
                cadence_spm: input.extra,
                pace_min_per_km: metric,
            },
            WorkoutKind::Cycling => Activity::Cycling {
                elevation_gain_m: input.extra,
                speed_km_per_h: metric,
            },
        };

        Ok(Self {
            id,
            created_at,
            distance_km: input.distance_km,
            duration_min: input.duration_min,
            coords: input.coords,
            description: describe(input.kind, created_at),
            activity,
        })
    }

    pub const fn id(&self) -> WorkoutId {
        self.id
    }

    pub const fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    pub const fn kind(&self) -> WorkoutKind {
        match self.activity {
            Activity::Running { .. } => WorkoutKind::Running,
            Activity::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub const fn coords(&self) -> Coordinates {
        self.coords
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn activity(&self) -> Activity {
        self.activity
    }

    /// Cadence for running, elevation gain for cycling.
    pub const fn extra(&self) -> f64 {
        match self.activity {
            Activity::Running { cadence_spm, .. } => cadence_spm,
            Activity::Cycling {
                elevation_gain_m, ..
            } => elevation_gain_m,
        }
    }

    /// Pace for running, speed for cycling.
    pub const fn metric(&self) -> f64 {
        match self.activity {
            Activity::Running {
                pace_min_per_km, ..
            } => pace_min_per_km,
            Activity::Cycling { speed_km_per_h, .. } => speed_km_per_h,
        }
    }

    pub const fn pace_min_per_km(&self) -> Option<f64> {
        match self.activity {
            Activity::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            Activity::Cycling { .. } => None,
        }
    }

    pub const fn speed_km_per_h(&self) -> Option<f64> {
        match self.activity {
            Activity::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
            Activity::Running { .. } => None,
        }
    }
}
