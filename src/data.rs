//! Snapshot sources: the hourly HTTP feed, series files, and a synthetic demo.
//!
//! Everything here finishes before the viewer starts; the engine only ever
//! sees a loaded [`SnapshotSeries`].

use crate::config::DataSource;
use crate::engine::geo::{normalize_lon, Coordinate};
use crate::engine::{Snapshot, SnapshotSeries};
use crate::error::{Error, Result};
use chrono::{DurationRound, TimeDelta, Utc};
use rand::prelude::*;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Load a series from any configured source
pub fn load(source: &DataSource) -> Result<SnapshotSeries> {
    let series = match source {
        DataSource::Demo { balloons, hours, seed } => demo_series(*balloons, *hours, *seed),
        DataSource::Remote { base_url, hours, timeout, altitude_unit_meters } => {
            fetch_remote(base_url, *hours, *timeout, *altitude_unit_meters)?
        }
        DataSource::File(path) => read_series(path)?,
    };

    if series.is_empty() || series.object_count() == 0 {
        return Err(Error::data("no balloons in the loaded series"));
    }

    info!(
        hours = series.len(),
        objects = series.object_count(),
        present_now = series.latest().map(Snapshot::present).unwrap_or(0),
        "snapshot series loaded"
    );
    Ok(series)
}

/// Parse one hour of the feed: a JSON array of `[lat, lon, alt]` entries.
///
/// Entries that are not three finite numbers in range become empty slots so
/// that every other balloon keeps its index.
pub fn parse_feed(body: &str, altitude_unit_meters: f64) -> Result<Snapshot> {
    let value: Value = serde_json::from_str(body)?;
    let Value::Array(entries) = value else {
        return Err(Error::data("feed body is not a JSON array"));
    };

    Ok(entries
        .iter()
        .map(|entry| parse_entry(entry, altitude_unit_meters))
        .collect())
}

fn parse_entry(entry: &Value, altitude_unit_meters: f64) -> Option<Coordinate> {
    let fields = entry.as_array()?;
    if fields.len() < 3 {
        return None;
    }
    let lat = fields[0].as_f64()?;
    let lon = fields[1].as_f64()?;
    let alt = fields[2].as_f64()? * altitude_unit_meters;

    let coord = Coordinate::new(lat, lon, alt);
    let in_range = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) && alt >= 0.0;
    (coord.is_finite() && in_range).then_some(coord)
}

/// Feed URL for the snapshot `hours_ago` hours before now
pub fn feed_url(base_url: &str, hours_ago: usize) -> String {
    format!("{}/{:02}.json", base_url.trim_end_matches('/'), hours_ago)
}

/// Download `hours` hourly files. Hours that fail become empty snapshots; the
/// load only fails when nothing could be fetched.
pub fn fetch_remote(
    base_url: &str,
    hours: usize,
    timeout: Duration,
    altitude_unit_meters: f64,
) -> Result<SnapshotSeries> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let mut newest_first = Vec::with_capacity(hours);
    let mut last_error = None;

    for hours_ago in 0..hours {
        let url = feed_url(base_url, hours_ago);
        let fetched = agent
            .get(&url)
            .call()
            .map_err(|e| Error::http(&url, e))
            .and_then(|resp| resp.into_string().map_err(|e| Error::http(&url, e)))
            .and_then(|body| parse_feed(&body, altitude_unit_meters));

        match fetched {
            Ok(snapshot) => {
                debug!(%url, balloons = snapshot.present(), "fetched hour");
                newest_first.push(snapshot);
            }
            Err(e) => {
                warn!(%url, error = %e, "hour unavailable, leaving it empty");
                newest_first.push(Snapshot::default());
                last_error = Some(e);
            }
        }
    }

    if newest_first.iter().all(|s| s.present() == 0) {
        return Err(last_error.unwrap_or_else(|| Error::data("feed returned no balloons")));
    }

    let series = SnapshotSeries::from_newest_first(newest_first);
    Ok(match Utc::now().duration_trunc(TimeDelta::hours(1)) {
        Ok(hour) => series.with_latest_at(hour),
        Err(_) => series,
    })
}

pub fn read_series(path: &Path) -> Result<SnapshotSeries> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn write_series(path: &Path, series: &SnapshotSeries) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, series)?;
    Ok(())
}

/// Fraction of demo fixes dropped to exercise missing-data handling
const DEMO_DROPOUT: f64 = 0.02;

/// Synthetic balloons riding zonal winds. The first two start just west of
/// the antimeridian so the seam is always exercised.
pub fn demo_series(balloons: usize, hours: usize, seed: Option<u64>) -> SnapshotSeries {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    struct Drift {
        lat: f64,
        lon: f64,
        alt: f64,
        dlat: f64,
        dlon: f64,
    }

    let mut drifts: Vec<Drift> = (0..balloons)
        .map(|i| {
            let lat: f64 = rng.gen_range(-65.0..65.0);
            // Westerlies at mid latitudes, easterlies in the tropics
            let eastward = lat.abs() > 25.0;
            let speed: f64 = rng.gen_range(1.0..5.0);
            Drift {
                lat,
                lon: if i < 2 { 172.0 + i as f64 } else { rng.gen_range(-180.0..180.0) },
                alt: rng.gen_range(8_000.0..22_000.0),
                dlat: rng.gen_range(-0.6..0.6),
                dlon: if eastward || i < 2 { speed } else { -speed },
            }
        })
        .collect();

    let mut snapshots = Vec::with_capacity(hours);
    for _ in 0..hours {
        let snapshot: Snapshot = drifts
            .iter()
            .map(|d| {
                (!rng.gen_bool(DEMO_DROPOUT)).then(|| Coordinate::new(d.lat, d.lon, d.alt))
            })
            .collect();
        snapshots.push(snapshot);

        for d in &mut drifts {
            d.lat = (d.lat + d.dlat + rng.gen_range(-0.3..0.3)).clamp(-85.0, 85.0);
            d.lon = normalize_lon(d.lon + d.dlon + rng.gen_range(-0.5..0.5));
            d.alt = (d.alt + rng.gen_range(-600.0..600.0)).clamp(1_000.0, 30_000.0);
        }
    }

    SnapshotSeries::from_oldest_first(snapshots)
}
