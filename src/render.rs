use crate::types::{Coordinates, Workout};

/// What the map shows for one workout.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coords: Coordinates,
    pub icon: &'static str,
    pub description: String,
    pub popup_class: &'static str,
}

impl From<&Workout> for Marker {
    fn from(w: &Workout) -> Self {
        Self {
            coords: w.coords(),
            icon: w.kind().icon(),
            description: w.description().to_string(),
            popup_class: w.kind().popup_class(),
        }
    }
}

impl Marker {
    pub fn popup_text(&self) -> String {
        format!("{} {}", self.icon, self.description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanOptions {
    pub animate: bool,
    pub duration_s: f64,
}

pub trait MapRenderer {
    /// Map becomes visible, centred on the user's position.
    fn show(&mut self, center: Coordinates, zoom: u8);

    fn add_marker(&mut self, marker: &Marker);

    fn center_on(&mut self, coords: Coordinates, zoom: u8, pan: PanOptions);

    fn clear_markers(&mut self);
}

pub trait ListRenderer {
    fn append(&mut self, workout: &Workout);

    fn clear(&mut self);
}

/// One list row: icon, distance, duration, derived metric, kind-specific input.
pub fn format_row(w: &Workout) -> String {
    let head = format!(
        "{}  {}\n    {} {} km  ⏱ {} min",
        w.id(),
        w.description(),
        w.kind().icon(),
        w.distance_km(),
        w.duration_min()
    );
    match (w.pace_min_per_km(), w.speed_km_per_h()) {
        (Some(pace), _) => format!("{head}  ⚡️ {pace:.1} min/km  🦶🏼 {} spm", w.extra()),
        (_, Some(speed)) => format!("{head}  ⚡️ {speed:.1} km/h  ⛰ {} m", w.extra()),
        (None, None) => head,
    }
}

/// Map renderer that records the map as text lines.
#[derive(Debug, Default)]
pub struct TextMap {
    view: Option<(Coordinates, u8)>,
    markers: Vec<Marker>,
    log: Vec<String>,
}

impl TextMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current centre and zoom, if the map has been shown.
    pub const fn view(&self) -> Option<(Coordinates, u8)> {
        self.view
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn lines(&self) -> &[String] {
        &self.log
    }
}

impl MapRenderer for TextMap {
    fn show(&mut self, center: Coordinates, zoom: u8) {
        self.view = Some((center, zoom));
        self.log.push(format!("map @ {center} zoom {zoom}"));
    }

    fn add_marker(&mut self, marker: &Marker) {
        self.log
            .push(format!("marker @ {} [{}] {}", marker.coords, marker.popup_class, marker.popup_text()));
        self.markers.push(marker.clone());
    }

    fn center_on(&mut self, coords: Coordinates, zoom: u8, pan: PanOptions) {
        self.view = Some((coords, zoom));
        self.log.push(format!(
            "centre @ {coords} zoom {zoom} (pan {}s)",
            pan.duration_s
        ));
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
        self.log.push("markers cleared".to_string());
    }
}

/// List renderer that keeps formatted rows in display order.
#[derive(Debug, Default)]
pub struct TextList {
    rows: Vec<String>,
}

impl TextList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }
}

impl ListRenderer for TextList {
    fn append(&mut self, workout: &Workout) {
        self.rows.push(format_row(workout));
    }

    fn clear(&mut self) {
        self.rows.clear();
    }
}
