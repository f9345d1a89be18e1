use proptest::prelude::*;
use waypost::types::{NewWorkout, local_now};
use waypost::{Coordinates, WorkoutError, WorkoutKind, WorkoutStore};

fn positive() -> impl Strategy<Value = f64> {
    1e-3_f64..1e4
}

/// Anything strictly positive and finite, subnormals and `f64::MAX` included.
fn any_positive() -> impl Strategy<Value = f64> {
    prop_oneof![
        positive(),
        Just(f64::from_bits(1)),
        f64::from_bits(1)..f64::MIN_POSITIVE,
        f64::MIN_POSITIVE..1e-3,
        1e4_f64..f64::MAX,
        Just(f64::MAX),
    ]
}

fn coords() -> impl Strategy<Value = Coordinates> {
    (-90.0_f64..=90.0, -180.0_f64..=180.0).prop_map(|(lat, lng)| Coordinates::new(lat, lng))
}

fn new_workout() -> impl Strategy<Value = NewWorkout> {
    prop_oneof![
        (any_positive(), any_positive(), coords(), positive()).prop_map(|(d, t, c, cadence)| NewWorkout {
            kind: WorkoutKind::Running,
            distance_km: d,
            duration_min: t,
            coords: c,
            extra: cadence,
        }),
        (any_positive(), any_positive(), coords(), -500.0_f64..5000.0).prop_map(|(d, t, c, elevation)| {
            NewWorkout {
                kind: WorkoutKind::Cycling,
                distance_km: d,
                duration_min: t,
                coords: c,
                extra: elevation,
            }
        }),
    ]
}

proptest! {
    #[test]
    fn running_pace_is_duration_over_distance(
        d in positive(), t in positive(), cadence in positive(), c in coords()
    ) {
        let mut store = WorkoutStore::new();
        let w = store.add(WorkoutKind::Running, d, t, c, cadence).unwrap();
        prop_assert_eq!(w.pace_min_per_km(), Some(t / d));
    }

    #[test]
    fn cycling_speed_is_distance_over_hours(
        d in positive(), t in positive(), elevation in -500.0_f64..5000.0, c in coords()
    ) {
        let mut store = WorkoutStore::new();
        let w = store.add(WorkoutKind::Cycling, d, t, c, elevation).unwrap();
        prop_assert_eq!(w.speed_km_per_h(), Some(d / (t / 60.0)));
    }

    #[test]
    fn serialize_then_deserialize_is_identity(inputs in prop::collection::vec(new_workout(), 0..12)) {
        let mut store = WorkoutStore::new();
        for input in &inputs {
            // Overflowing metrics are rejected; whatever was accepted must survive.
            let _ = store.add_at(input, local_now());
        }
        let restored = WorkoutStore::deserialize(store.serialize()).unwrap();
        prop_assert_eq!(restored, store);
    }

    #[test]
    fn accepted_workouts_always_have_a_finite_metric(input in new_workout()) {
        let mut store = WorkoutStore::new();
        match store.add_at(&input, local_now()) {
            Ok(w) => {
                let metric = w.pace_min_per_km().or(w.speed_km_per_h()).unwrap();
                prop_assert!(metric.is_finite());
            }
            Err(err) => {
                let is_metric = matches!(
                    err,
                    WorkoutError::InvalidWorkoutInput { field: "pace" | "speed", .. }
                );
                prop_assert!(is_metric);
                prop_assert!(store.is_empty());
            }
        }
    }

    #[test]
    fn non_positive_distance_or_duration_never_inserts(
        bad in prop_oneof![Just(0.0_f64), -1e4_f64..=0.0, Just(f64::NAN), Just(f64::INFINITY)],
        good in positive(),
        distance_is_bad in any::<bool>(),
    ) {
        let mut store = WorkoutStore::new();
        store.add(WorkoutKind::Running, 5.0, 30.0, Coordinates::new(0.0, 0.0), 170.0).unwrap();
        let (d, t) = if distance_is_bad { (bad, good) } else { (good, bad) };
        let err = store
            .add(WorkoutKind::Cycling, d, t, Coordinates::new(0.0, 0.0), 10.0)
            .unwrap_err();
        let is_invalid = matches!(err, WorkoutError::InvalidWorkoutInput { .. });
        prop_assert!(is_invalid);
        prop_assert_eq!(store.len(), 1);
    }
}
