//! Filtering a list of known locations by distance from a geocoded point.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::io::{Read, Write};

use crate::{
    model::{LookupOutcome, PostalCode},
    provider::GeocodeProvider,
};

/// Mean Earth radius in meters, as used by web map libraries for `distanceTo`.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub const DEFAULT_DISTANCE_M: u32 = 10_000;
pub const MAX_DISTANCE_M: u32 = 10_000;

/// Great-circle distance between two points in meters.
#[inline]
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// One row of a `|`-delimited locations file. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationRecord {
    pub address: String,
    pub latitude: String,
    pub longitude: String,
}

impl LocationRecord {
    fn point(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
        let lon = self.longitude.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some((lat, lon))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyLocation {
    pub record: LocationRecord,
    pub distance_m: f64,
}

impl NearbyLocation {
    pub fn render_line(&self) -> String {
        format!(
            "{}|{}|{}|{:.0}",
            self.record.address, self.record.longitude, self.record.latitude, self.distance_m
        )
    }
}

/// Read a locations file with a header row naming `address`, `latitude` and `longitude`.
///
/// Rows that cannot be decoded are skipped with a warning.
pub fn read_locations<R: Read>(reader: R) -> Result<Vec<LocationRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read locations header row")?.clone();
    for required in ["address", "latitude", "longitude"] {
        if !headers.iter().any(|h| h == required) {
            return Err(anyhow!("Locations file is missing the '{required}' column"));
        }
    }

    let mut records = Vec::new();
    for (idx, row) in rdr.deserialize::<LocationRecord>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            // idx is 0-based over data rows; line 1 is the header.
            Err(err) => tracing::warn!(line = idx + 2, error = %err, "skipping unreadable location row"),
        }
    }

    Ok(records)
}

/// Keep the records within `max_distance_m` of `(lat, lon)`, in their original order.
pub fn within_distance(
    lat: f64,
    lon: f64,
    records: &[LocationRecord],
    max_distance_m: f64,
) -> Vec<NearbyLocation> {
    records
        .iter()
        .filter_map(|record| {
            let Some((rlat, rlon)) = record.point() else {
                tracing::warn!(address = %record.address, "invalid latitude or longitude for location");
                return None;
            };

            let distance_m = haversine_distance_m(lat, lon, rlat, rlon);
            (distance_m <= max_distance_m)
                .then(|| NearbyLocation { record: record.clone(), distance_m })
        })
        .collect()
}

/// Geocode `postal`, then write every location from `locations` within `max_distance_m`
/// of it to `out`, one line each. Returns the number of lines written.
///
/// An unknown postal code writes a single `<postal>|No results found` line and does not
/// read `locations`.
pub async fn search_nearby<R: Read, W: Write>(
    provider: &dyn GeocodeProvider,
    postal: PostalCode,
    locations: R,
    max_distance_m: f64,
    out: &mut W,
) -> Result<usize> {
    let result = match provider.search(postal).await? {
        LookupOutcome::Found(result) => result,
        not_found @ LookupOutcome::NotFound => {
            writeln!(out, "{}", not_found.render_line(postal))?;
            return Ok(0);
        }
    };

    let (Some(lat), Some(lon)) = (result.latitude.as_f64(), result.longitude.as_f64()) else {
        return Err(anyhow!(
            "OneMap returned non-numeric coordinates for {postal}: {}, {}",
            result.latitude,
            result.longitude
        ));
    };

    let records = read_locations(locations)?;
    let hits = within_distance(lat, lon, &records, max_distance_m);
    tracing::info!(%postal, address = %result.address, matches = hits.len(), "nearby search finished");

    for hit in &hits {
        writeln!(out, "{}", hit.render_line())?;
    }
    out.flush()?;

    Ok(hits.len())
}
