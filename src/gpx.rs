use crate::types::Workout;
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const CREATOR: &str = concat!("waypost ", env!("CARGO_PKG_VERSION"));

/// Writes every workout as a GPX 1.1 waypoint, in store order.
pub fn write_gpx<W: Write>(workouts: &[Workout], out: W) -> Result<()> {
    let mut xml = Writer::new_with_indent(out, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("version", "1.1"));
    gpx.push_attribute(("creator", CREATOR));
    gpx.push_attribute(("xmlns", "http://www.topografix.com/GPX/1/1"));
    xml.write_event(Event::Start(gpx))?;

    for w in workouts {
        write_waypoint(&mut xml, w)?;
    }

    xml.write_event(Event::End(BytesEnd::new("gpx")))?;
    xml.into_inner().flush()?;
    Ok(())
}

fn write_waypoint<W: Write>(xml: &mut Writer<W>, w: &Workout) -> Result<()> {
    let coords = w.coords();
    let lat = coords.lat.to_string();
    let lon = coords.lng.to_string();

    let mut wpt = BytesStart::new("wpt");
    wpt.push_attribute(("lat", lat.as_str()));
    wpt.push_attribute(("lon", lon.as_str()));
    xml.write_event(Event::Start(wpt))?;

    let time = w
        .created_at()
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true);
    let desc = match (w.pace_min_per_km(), w.speed_km_per_h()) {
        (Some(pace), _) => format!(
            "{} km in {} min, {pace:.1} min/km, {} spm",
            w.distance_km(),
            w.duration_min(),
            w.extra()
        ),
        (_, Some(speed)) => format!(
            "{} km in {} min, {speed:.1} km/h, {} m gain",
            w.distance_km(),
            w.duration_min(),
            w.extra()
        ),
        (None, None) => format!("{} km in {} min", w.distance_km(), w.duration_min()),
    };
    let id = w.id().to_string();

    for (tag, text) in [
        ("time", time.as_str()),
        ("name", w.description()),
        ("desc", desc.as_str()),
        ("type", w.kind().slug()),
        ("cmt", id.as_str()),
    ] {
        xml.write_event(Event::Start(BytesStart::new(tag)))?;
        xml.write_event(Event::Text(BytesText::new(text)))?;
        xml.write_event(Event::End(BytesEnd::new(tag)))?;
    }

    xml.write_event(Event::End(BytesEnd::new("wpt")))?;
    Ok(())
}

pub fn export_gpx(path: &Path, workouts: &[Workout]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating GPX file: {}", path.display()))?;
    write_gpx(workouts, BufWriter::new(file))
        .with_context(|| format!("writing GPX file: {}", path.display()))?;
    tracing::info!(path = %path.display(), waypoints = workouts.len(), "exported GPX");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WorkoutStore;
    use crate::types::{Coordinates, WorkoutKind};
    use quick_xml::reader::Reader;

    fn waypoint_attrs(bytes: &[u8]) -> Vec<(f64, f64)> {
        let mut xml = Reader::from_reader(bytes);
        xml.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut out = Vec::new();
        loop {
            match xml.read_event_into(&mut buf).unwrap() {
                Event::Eof => break,
                Event::Start(e) if e.name().as_ref() == b"wpt" => {
                    let mut lat = None;
                    let mut lon = None;
                    for a in e.attributes().flatten() {
                        let v = a.unescape_value().unwrap().parse::<f64>().ok();
                        match a.key.as_ref() {
                            b"lat" => lat = v,
                            b"lon" => lon = v,
                            _ => {}
                        }
                    }
                    out.push((lat.unwrap(), lon.unwrap()));
                }
                _ => {}
            }
            buf.clear();
        }
        out
    }

    #[test]
    fn one_waypoint_per_workout_in_order() {
        let mut store = WorkoutStore::new();
        store
            .add(WorkoutKind::Running, 5.0, 30.0, Coordinates::new(51.5, -0.12), 170.0)
            .unwrap();
        store
            .add(WorkoutKind::Cycling, 20.0, 60.0, Coordinates::new(48.85, 2.35), 150.0)
            .unwrap();

        let mut out = Vec::new();
        write_gpx(store.all(), &mut out).unwrap();

        assert_eq!(waypoint_attrs(&out), vec![(51.5, -0.12), (48.85, 2.35)]);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("<type>running</type>"));
        assert!(text.contains("20.0 km/h"));
        assert!(text.contains(&store.all()[1].id().to_string()));
    }

    #[test]
    fn empty_store_is_a_valid_document() {
        let mut out = Vec::new();
        write_gpx(&[], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<gpx"));
        assert!(waypoint_attrs(text.as_bytes()).is_empty());
    }
}
