//! Ordered, identity-keyed collection of workouts and its persisted form.

use crate::dlog;
use crate::error::{WorkoutError, WorkoutResult};
use crate::types::{
    Coordinates, NewWorkout, Workout, WorkoutId, WorkoutKind, derive_metric, local_now,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Relative tolerance when checking a stored derived metric against its recomputation.
const METRIC_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
    index: HashMap<WorkoutId, usize>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a workout created now.
    pub fn add(
        &mut self,
        kind: WorkoutKind,
        distance_km: f64,
        duration_min: f64,
        coords: Coordinates,
        extra: f64,
    ) -> WorkoutResult<&Workout> {
        let input = NewWorkout {
            kind,
            distance_km,
            duration_min,
            coords,
            extra,
        };
        self.add_at(&input, local_now())
    }

    /// Like [`add`](Self::add) with an explicit creation time.
    pub fn add_at(
        &mut self,
        input: &NewWorkout,
        created_at: DateTime<FixedOffset>,
    ) -> WorkoutResult<&Workout> {
        input.validate()?;

        let mut id = WorkoutId::random();
        while self.index.contains_key(&id) {
            id = WorkoutId::random();
        }

        let workout = Workout::build(id, created_at, input)?;
        Ok(self.push(workout))
    }

    fn push(&mut self, workout: Workout) -> &Workout {
        let pos = self.workouts.len();
        self.index.insert(workout.id(), pos);
        self.workouts.push(workout);
        &self.workouts[pos]
    }

    pub fn find_by_id(&self, id: &WorkoutId) -> WorkoutResult<&Workout> {
        self.index
            .get(id)
            .map(|&pos| &self.workouts[pos])
            .ok_or(WorkoutError::NotFound { id: *id })
    }

    /// Workouts in insertion order.
    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
        self.index.clear();
    }

    /// Plain-data form of every workout, kind tag and derived metric included.
    pub fn serialize(&self) -> JsonValue {
        let records: Vec<WorkoutRecord> = self.workouts.iter().map(WorkoutRecord::from).collect();
        serde_json::to_value(records).unwrap_or_else(|e| {
            // Records hold only validated finite numbers, strings and timestamps.
            tracing::error!(err = %e, "serializing workouts failed");
            JsonValue::Array(Vec::new())
        })
    }

    /// Rebuilds a store from [`serialize`](Self::serialize) output.
    ///
    /// `null` is a first run and yields an empty store. Every record goes
    /// through the same validation as [`add`](Self::add); the whole value is
    /// rejected if any record fails.
    pub fn deserialize(value: JsonValue) -> WorkoutResult<Self> {
        if value.is_null() {
            return Ok(Self::new());
        }

        let records: Vec<WorkoutRecord> = serde_json::from_value(value)
            .map_err(|e| WorkoutError::corrupt(format!("malformed workout records: {e}")))?;

        let mut store = Self::new();
        for (i, record) in records.into_iter().enumerate() {
            let id = record.id;
            if store.index.contains_key(&id) {
                return Err(WorkoutError::corrupt(format!(
                    "record {i}: duplicate id {id}"
                )));
            }
            let workout = record
                .rehydrate()
                .map_err(|e| WorkoutError::corrupt(format!("record {i} ({id}): {e}")))?;
            store.push(workout);
        }

        dlog!("deserialized workouts count={}", store.len());
        Ok(store)
    }

    /// [`deserialize`](Self::deserialize), degrading to an empty store on corrupt data.
    pub fn restore(value: Option<JsonValue>) -> Self {
        let Some(value) = value else {
            return Self::new();
        };
        match Self::deserialize(value) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(err = %e, "discarding persisted workouts");
                Self::new()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutRecord {
    id: WorkoutId,
    created_at: DateTime<FixedOffset>,
    distance_km: f64,
    duration_min: f64,
    coords: Coordinates,
    description: String,
    #[serde(flatten)]
    details: RecordDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RecordDetails {
    #[serde(rename_all = "camelCase")]
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    #[serde(rename_all = "camelCase")]
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

impl From<&Workout> for WorkoutRecord {
    fn from(w: &Workout) -> Self {
        let details = match w.kind() {
            WorkoutKind::Running => RecordDetails::Running {
                cadence_spm: w.extra(),
                pace_min_per_km: w.metric(),
            },
            WorkoutKind::Cycling => RecordDetails::Cycling {
                elevation_gain_m: w.extra(),
                speed_km_per_h: w.metric(),
            },
        };
        Self {
            id: w.id(),
            created_at: w.created_at(),
            distance_km: w.distance_km(),
            duration_min: w.duration_min(),
            coords: w.coords(),
            description: w.description().to_string(),
            details,
        }
    }
}

impl WorkoutRecord {
    /// record -> validate -> reconstruct; stored derived values must agree with recomputation.
    fn rehydrate(self) -> WorkoutResult<Workout> {
        let (kind, extra, stored_metric) = match self.details {
            RecordDetails::Running {
                cadence_spm,
                pace_min_per_km,
            } => (WorkoutKind::Running, cadence_spm, pace_min_per_km),
            RecordDetails::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => (WorkoutKind::Cycling, elevation_gain_m, speed_km_per_h),
        };

        let input = NewWorkout {
            kind,
            distance_km: self.distance_km,
            duration_min: self.duration_min,
            coords: self.coords,
            extra,
        };
        let workout = Workout::build(self.id, self.created_at, &input)?;

        let expected = derive_metric(kind, self.distance_km, self.duration_min);
        if !metric_matches(stored_metric, expected) {
            return Err(WorkoutError::corrupt(format!(
                "stored {kind} metric {stored_metric} disagrees with {expected}"
            )));
        }
        if workout.description() != self.description {
            return Err(WorkoutError::corrupt(format!(
                "stored description {:?} disagrees with {:?}",
                self.description,
                workout.description()
            )));
        }

        Ok(workout)
    }
}

fn metric_matches(stored: f64, expected: f64) -> bool {
    stored.is_finite() && (stored - expected).abs() <= METRIC_TOLERANCE * expected.abs().max(1.0)
}
