//! Event-driven orchestration of one logging session.
//!
//! The controller owns the [`WorkoutStore`] and the three collaborators that
//! mirror it: the map, the list and persistence. Each event runs to
//! completion inside [`SessionController::handle`]; the store is updated in a
//! single step before any collaborator sees it.

use crate::dlog;
use crate::error::WorkoutError;
use crate::location::LocationProvider;
use crate::persistence::{Persistence, StorageResult};
use crate::render::{ListRenderer, MapRenderer, Marker, PanOptions};
use crate::store::WorkoutStore;
use crate::types::{Coordinates, NewWorkout, WorkoutId, WorkoutKind, local_now};

pub const DEFAULT_ZOOM: u8 = 13;
pub const DEFAULT_PAN_DURATION_S: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub zoom: u8,
    pub pan_duration_s: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            pan_duration_s: DEFAULT_PAN_DURATION_S,
        }
    }
}

/// Placement session state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Idle,
    AwaitingSubmission(Coordinates),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapStatus {
    /// Location requested, no answer yet.
    Locating,
    Ready(Coordinates),
    /// Location failed; list-only mode.
    Unavailable,
}

/// Raw form fields as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub kind: WorkoutKind,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl FormInput {
    pub fn new(kind: WorkoutKind) -> Self {
        Self {
            kind,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
        }
    }

    /// The extra field shown for the selected kind; the other one is hidden.
    pub fn visible_extra_field(&self) -> &str {
        match self.kind {
            WorkoutKind::Running => &self.cadence,
            WorkoutKind::Cycling => &self.elevation,
        }
    }

    pub fn to_new_workout(&self, coords: Coordinates) -> NewWorkout {
        NewWorkout {
            kind: self.kind,
            distance_km: coerce_number(&self.distance),
            duration_min: coerce_number(&self.duration),
            coords,
            extra: coerce_number(self.visible_extra_field()),
        }
    }
}

/// Blank input is `0`, anything unparsable is `NaN`; validation decides the rest.
pub fn coerce_number(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }
    raw.parse::<f64>().unwrap_or(f64::NAN)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LocationResolved(Coordinates),
    LocationFailed(WorkoutError),
    MapClicked(Coordinates),
    FormSubmitted(FormInput),
    FormCancelled,
    WorkoutClicked(WorkoutId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    MapReady { markers: usize },
    LocationFailed { message: String },
    FormOpened(Coordinates),
    /// `saved` is false when persistence rejected the write; the workout stays in memory.
    WorkoutAdded { id: WorkoutId, saved: bool },
    Rejected { message: String, error: WorkoutError },
    FormClosed,
    Centered(Coordinates),
    Ignored,
}

pub struct SessionController<P, M, L> {
    config: SessionConfig,
    store: WorkoutStore,
    placement: Placement,
    map_status: MapStatus,
    persistence: P,
    map: M,
    list: L,
}

impl<P, M, L> SessionController<P, M, L>
where
    P: Persistence,
    M: MapRenderer,
    L: ListRenderer,
{
    /// Restores persisted workouts and replays them to the list.
    ///
    /// Markers are replayed once the map is ready.
    pub fn start(config: SessionConfig, mut persistence: P, map: M, mut list: L) -> Self {
        let loaded = persistence.load().unwrap_or_else(|e| {
            tracing::warn!(err = %e, "reading persisted workouts failed");
            None
        });
        let store = WorkoutStore::restore(loaded);

        for workout in store.all() {
            list.append(workout);
        }
        tracing::info!(workouts = store.len(), "session started");

        Self {
            config,
            store,
            placement: Placement::Idle,
            map_status: MapStatus::Locating,
            persistence,
            map,
            list,
        }
    }

    /// Hands the collaborators back, ending the session.
    pub fn into_parts(self) -> (P, M, L) {
        (self.persistence, self.map, self.list)
    }

    pub const fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub const fn placement(&self) -> Placement {
        self.placement
    }

    pub const fn map_status(&self) -> MapStatus {
        self.map_status
    }

    pub const fn map(&self) -> &M {
        &self.map
    }

    pub const fn list(&self) -> &L {
        &self.list
    }

    /// Asks `provider` for a position and feeds the answer back as an event.
    ///
    /// A map that is already shown stays shown whatever the answer.
    pub fn request_location(&mut self, provider: &mut impl LocationProvider) -> SessionOutcome {
        if !matches!(self.map_status, MapStatus::Ready(_)) {
            self.map_status = MapStatus::Locating;
        }
        let event = match provider.locate() {
            Ok(coords) => SessionEvent::LocationResolved(coords),
            Err(e) => SessionEvent::LocationFailed(e),
        };
        self.handle(event)
    }

    pub fn handle(&mut self, event: SessionEvent) -> SessionOutcome {
        match event {
            SessionEvent::LocationResolved(center) => self.show_map(center),
            SessionEvent::LocationFailed(error) => {
                if let MapStatus::Ready(_) = self.map_status {
                    dlog!("late location failure ignored; map already shown: {error}");
                    return SessionOutcome::Ignored;
                }
                tracing::warn!(err = %error, "location unavailable; list-only mode");
                self.map_status = MapStatus::Unavailable;
                self.placement = Placement::Idle;
                SessionOutcome::LocationFailed {
                    message: error.user_message(),
                }
            }
            SessionEvent::MapClicked(coords) => self.open_form(coords),
            SessionEvent::FormSubmitted(form) => self.submit(&form),
            SessionEvent::FormCancelled => match self.placement {
                Placement::AwaitingSubmission(_) => {
                    self.placement = Placement::Idle;
                    SessionOutcome::FormClosed
                }
                Placement::Idle => SessionOutcome::Ignored,
            },
            SessionEvent::WorkoutClicked(id) => self.jump_to(id),
        }
    }

    fn show_map(&mut self, center: Coordinates) -> SessionOutcome {
        if let MapStatus::Ready(_) = self.map_status {
            dlog!("location resolved again; map already shown");
            return SessionOutcome::Ignored;
        }

        self.map.show(center, self.config.zoom);
        for workout in self.store.all() {
            self.map.add_marker(&Marker::from(workout));
        }
        self.map_status = MapStatus::Ready(center);
        tracing::info!(center = %center, markers = self.store.len(), "map ready");

        SessionOutcome::MapReady {
            markers: self.store.len(),
        }
    }

    fn open_form(&mut self, coords: Coordinates) -> SessionOutcome {
        if !matches!(self.map_status, MapStatus::Ready(_)) {
            dlog!("map click ignored status={:?}", self.map_status);
            return SessionOutcome::Ignored;
        }
        self.placement = Placement::AwaitingSubmission(coords);
        SessionOutcome::FormOpened(coords)
    }

    fn submit(&mut self, form: &FormInput) -> SessionOutcome {
        let Placement::AwaitingSubmission(coords) = self.placement else {
            dlog!("form submitted without a pending placement");
            return SessionOutcome::Ignored;
        };

        let input = form.to_new_workout(coords);
        let workout = match self.store.add_at(&input, local_now()) {
            Ok(w) => w,
            Err(error) => {
                tracing::info!(err = %error, kind = %form.kind, "workout rejected");
                return SessionOutcome::Rejected {
                    message: error.user_message(),
                    error,
                };
            }
        };

        self.map.add_marker(&Marker::from(workout));
        self.list.append(workout);
        let id = workout.id();
        tracing::info!(id = %id, kind = %form.kind, "workout added");

        self.placement = Placement::Idle;
        let saved = self.persist();
        SessionOutcome::WorkoutAdded { id, saved }
    }

    fn jump_to(&mut self, id: WorkoutId) -> SessionOutcome {
        if !matches!(self.map_status, MapStatus::Ready(_)) {
            return SessionOutcome::Ignored;
        }
        let coords = match self.store.find_by_id(&id) {
            Ok(w) => w.coords(),
            Err(e) => {
                dlog!("jump ignored: {e}");
                return SessionOutcome::Ignored;
            }
        };
        let pan = PanOptions {
            animate: true,
            duration_s: self.config.pan_duration_s,
        };
        self.map.center_on(coords, self.config.zoom, pan);
        SessionOutcome::Centered(coords)
    }

    fn persist(&mut self) -> bool {
        let value = self.store.serialize();
        match self.persistence.save(&value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(err = %e, "saving workouts failed");
                false
            }
        }
    }

    /// Drops every workout, from memory, both views and persistence.
    ///
    /// Storage is cleared first; if that fails nothing else is touched.
    pub fn reset(&mut self) -> StorageResult<()> {
        self.persistence.clear()?;
        self.store.clear();
        self.placement = Placement::Idle;
        self.list.clear();
        self.map.clear_markers();
        tracing::info!("all workouts cleared");
        Ok(())
    }
}
