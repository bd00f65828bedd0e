//! Trip segmentation around the origin.
//!
//! A trip is a maximal run of consecutive fixes further than the inner buffer
//! from the origin. Fixes inside the buffer carry [`TripId::NON_TRIP`].

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::distance::{distance_to_point, DistanceMode};
use crate::error::{OptionExt, Result, TripError};
use crate::{Location, RawFix, TripId};

/// Parameters for trip segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentConfig {
    /// Fixes at or within this distance of the origin are not in a trip (meters).
    pub inner_buffer_m: f64,
    /// Time between consecutive fixes that starts a new tracking session (days).
    pub gap_limit_days: Option<f64>,
    pub mode: DistanceMode,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        crate::TripConfig::default().segment_config()
    }
}

/// A fix with its distance from origin and trip assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedFix {
    pub individual_id: String,
    pub timestamp: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    /// Distance from the individual's origin in meters
    pub dist_from_origin: f64,
    pub trip_id: TripId,
}

impl SegmentedFix {
    pub fn location(&self) -> Location {
        Location::new(self.longitude, self.latitude)
    }
}

/// Assign trip ids to a time-ordered sequence of `(timestamp, distance from origin)`.
///
/// Trip ids start at 1 and increase chronologically. A single fix inside the
/// inner buffer ends a trip, and so does a session break longer than
/// `gap_limit_days`.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use tripsplit::{assign_trip_ids, SegmentConfig, TripId};
///
/// let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let points: Vec<_> = [2.0, 10.0, 15.0, 3.0]
///     .iter()
///     .enumerate()
///     .map(|(i, d)| (t0 + Duration::hours(i as i64), *d))
///     .collect();
/// let config = SegmentConfig { inner_buffer_m: 5.0, ..Default::default() };
///
/// let ids = assign_trip_ids(&points, &config);
/// assert_eq!(ids, vec![TripId::NON_TRIP, TripId(1), TripId(1), TripId::NON_TRIP]);
/// ```
pub fn assign_trip_ids(points: &[(DateTime<Utc>, f64)], config: &SegmentConfig) -> Vec<TripId> {
    let session_limit = config.gap_limit_days.map(days_to_duration);

    let mut ids = Vec::with_capacity(points.len());
    let mut current = 0;
    let mut in_trip = false;

    for (i, (timestamp, dist)) in points.iter().enumerate() {
        let session_break = match (session_limit, i.checked_sub(1)) {
            (Some(limit), Some(prev)) => *timestamp - points[prev].0 > limit,
            _ => false,
        };

        if *dist <= config.inner_buffer_m {
            ids.push(TripId::NON_TRIP);
            in_trip = false;
            continue;
        }

        if !in_trip || session_break {
            current += 1;
            in_trip = true;
        }
        ids.push(TripId(current));
    }

    ids
}

/// Segment one individual's fixes into trips.
///
/// Fixes are stable-sorted by timestamp first. The output has exactly one
/// entry per input fix. In geodesic mode every fix must be a valid
/// longitude/latitude pair.
pub fn segment_individual(
    individual_id: &str,
    fixes: &[RawFix],
    origin: &Location,
    config: &SegmentConfig,
) -> Result<Vec<SegmentedFix>> {
    fixes.first().ok_or_insufficient_data(individual_id, 0)?;

    if config.mode == DistanceMode::Geodesic {
        if let Some(bad) = fixes.iter().find(|f| !f.location().is_valid_geographic()) {
            return Err(TripError::InvalidCoordinate {
                individual_id: individual_id.to_string(),
                longitude: bad.longitude,
                latitude: bad.latitude,
            });
        }
    }

    let mut ordered: Vec<&RawFix> = fixes.iter().collect();
    ordered.sort_by_key(|f| f.timestamp);

    let locations: Vec<Location> = ordered.iter().map(|f| f.location()).collect();
    let distances = distance_to_point(&locations, origin, config.mode);

    let points: Vec<(DateTime<Utc>, f64)> = ordered
        .iter()
        .zip(&distances)
        .map(|(f, d)| (f.timestamp, *d))
        .collect();
    let trip_ids = assign_trip_ids(&points, config);

    let segmented: Vec<SegmentedFix> = ordered
        .iter()
        .zip(distances)
        .zip(trip_ids)
        .map(|((fix, dist_from_origin), trip_id)| SegmentedFix {
            individual_id: individual_id.to_string(),
            timestamp: fix.timestamp,
            longitude: fix.longitude,
            latitude: fix.latitude,
            dist_from_origin,
            trip_id,
        })
        .collect();

    debug!(
        "[Segment] {}: {} fixes, {} trips",
        individual_id,
        segmented.len(),
        segmented.iter().map(|f| f.trip_id.0).max().unwrap_or(0).max(0)
    );

    Ok(segmented)
}

fn days_to_duration(days: f64) -> Duration {
    Duration::milliseconds((days * 86_400_000.0).round() as i64)
}
