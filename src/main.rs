#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use waypost::location::FixedLocation;
use waypost::persistence::SqliteStorage;
use waypost::render::{TextList, TextMap};
use waypost::session::{SessionConfig, SessionController, SessionEvent, SessionOutcome};
use waypost::{cli, gpx, utils};

#[macro_use]
extern crate waypost;

type Session = SessionController<SqliteStorage, TextMap, TextList>;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let storage = SqliteStorage::open(&cli.db)
        .with_context(|| format!("opening workout database: {}", cli.db.display()))?;
    let config = SessionConfig {
        zoom: cli.zoom,
        ..SessionConfig::default()
    };
    let mut location = FixedLocation(cli.position());
    dlog!(
        "db={} position={:?} zoom={}",
        cli.db.display(),
        location.0,
        cli.zoom
    );

    let mut session = SessionController::start(config, storage, TextMap::new(), TextList::new());

    match cli.cmd {
        cli::Cmd::List => {
            if session.list().rows().is_empty() {
                println!("No workouts yet.");
            }
            for row in session.list().rows() {
                println!("{row}");
            }
        }
        cli::Cmd::Add { workout } => {
            let center = open_map(&mut session, &mut location)?;
            let (form, at) = workout.into_form();

            session.handle(SessionEvent::MapClicked(at.unwrap_or(center)));
            match session.handle(SessionEvent::FormSubmitted(form)) {
                SessionOutcome::WorkoutAdded { id, saved } => {
                    if !saved {
                        tracing::warn!(id = %id, "workout logged but not saved");
                    }
                    if let Ok(w) = session.store().find_by_id(&id) {
                        println!("{}", waypost::render::format_row(w));
                    }
                }
                SessionOutcome::Rejected { message, error } => {
                    dlog!("rejected: {error}");
                    bail!("{message}");
                }
                other => bail!("workout not logged: {other:?}"),
            }
        }
        cli::Cmd::Show { id } => {
            open_map(&mut session, &mut location)?;
            match session.handle(SessionEvent::WorkoutClicked(id)) {
                SessionOutcome::Centered(coords) => println!("{coords}"),
                _ => tracing::info!(id = %id, "nothing to show"),
            }
        }
        cli::Cmd::ExportGpx { path } => {
            gpx::export_gpx(&path, session.store().all())?;
        }
        cli::Cmd::Reset => {
            session.reset().context("clearing saved workouts")?;
            println!("All workouts deleted.");
        }
    }

    let (_, map, _) = session.into_parts();
    for line in map.lines() {
        dlog!("{line}");
    }
    Ok(())
}

/// Resolves the device position and shows the map, or fails with the user-facing message.
fn open_map(session: &mut Session, location: &mut FixedLocation) -> Result<waypost::Coordinates> {
    match session.request_location(location) {
        SessionOutcome::MapReady { markers } => {
            dlog!("map ready markers={markers}");
        }
        SessionOutcome::LocationFailed { message } => bail!("{message}"),
        other => bail!("map not available: {other:?}"),
    }
    match session.map_status() {
        waypost::session::MapStatus::Ready(center) => Ok(center),
        status => bail!("map not available: {status:?}"),
    }
}
