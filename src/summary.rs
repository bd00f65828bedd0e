//! Per-trip summaries.
//!
//! Works on classified fixes and on interpolated tracks alike; both only need
//! individual, trip id, timestamp, position, distance from origin and type.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::classify::{group_indices, ClassifiedFix, TripMember};
use crate::distance::{path_length, DistanceMode};
use crate::error::TripError;
use crate::{Location, TripId, TripType};

/// A fix that can be summarized into a trip row.
pub trait SummaryInput: TripMember {
    fn trip_type(&self) -> TripType;
}

impl SummaryInput for ClassifiedFix {
    fn trip_type(&self) -> TripType {
        self.trip_type
    }
}

/// One row per (individual, trip id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub individual_id: String,
    pub trip_id: TripId,
    /// Number of fixes in the summarized track
    pub n_locs: usize,
    /// Fix count of the raw trip, when the summarized track was interpolated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_n_locs: Option<usize>,
    pub departure: DateTime<Utc>,
    #[serde(rename = "return")]
    pub return_time: DateTime<Utc>,
    pub duration_hours: f64,
    pub max_dist_km: f64,
    /// Path length along the fixes
    pub total_dist_km: f64,
    #[serde(rename = "complete")]
    pub trip_type: TripType,
}

/// Summaries plus the per-trip problems that kept rows out.
#[derive(Debug, Clone, Default)]
pub struct SummaryReport {
    pub summaries: Vec<TripSummary>,
    pub issues: Vec<TripError>,
}

impl SummaryReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn find(&self, individual_id: &str, trip_id: TripId) -> Option<&TripSummary> {
        self.summaries
            .iter()
            .find(|s| s.individual_id == individual_id && s.trip_id == trip_id)
    }
}

/// Reduce every (individual, trip id) group to a [`TripSummary`].
///
/// Rows follow first appearance in `fixes`. A group with more than one trip
/// type is reported as [`TripError::HeterogeneousTripType`] and has no row.
pub fn summarize_trips<F: SummaryInput>(fixes: &[F], mode: DistanceMode) -> SummaryReport {
    let mut report = SummaryReport::default();

    for mut indices in group_indices(fixes) {
        indices.sort_by_key(|&i| fixes[i].timestamp());
        let first = &fixes[indices[0]];

        let mut types: Vec<TripType> = Vec::new();
        for &i in &indices {
            let t = fixes[i].trip_type();
            if !types.contains(&t) {
                types.push(t);
            }
        }
        if types.len() > 1 {
            let issue = TripError::HeterogeneousTripType {
                individual_id: first.individual_id().to_string(),
                trip_id: first.trip_id(),
                types,
            };
            warn!("[Summary] {}", issue);
            report.issues.push(issue);
            continue;
        }

        let departure = first.timestamp();
        let return_time = fixes[indices[indices.len() - 1]].timestamp();
        let max_dist = indices
            .iter()
            .map(|&i| fixes[i].dist_from_origin())
            .fold(0.0, f64::max);
        let locations: Vec<Location> = indices.iter().map(|&i| fixes[i].location()).collect();

        report.summaries.push(TripSummary {
            individual_id: first.individual_id().to_string(),
            trip_id: first.trip_id(),
            n_locs: indices.len(),
            raw_n_locs: None,
            departure,
            return_time,
            duration_hours: (return_time - departure).num_milliseconds() as f64 / 3_600_000.0,
            max_dist_km: max_dist / 1000.0,
            total_dist_km: path_length(&locations, mode) / 1000.0,
            trip_type: types[0],
        });
    }

    report
}

/// Summarize an interpolated track, carrying each trip's raw fix count.
///
/// Raw counts are joined by (individual, trip id). An interpolated trip with
/// no raw counterpart is reported as [`TripError::MissingRawCount`] and left
/// out rather than given an invented count.
pub fn summarize_interpolated<I, R>(interpolated: &[I], raw: &[R], mode: DistanceMode) -> SummaryReport
where
    I: SummaryInput,
    R: TripMember,
{
    let mut raw_counts: HashMap<(&str, TripId), usize> = HashMap::new();
    for fix in raw {
        *raw_counts
            .entry((fix.individual_id(), fix.trip_id()))
            .or_insert(0) += 1;
    }

    let base = summarize_trips(interpolated, mode);
    let mut report = SummaryReport {
        summaries: Vec::with_capacity(base.summaries.len()),
        issues: base.issues,
    };

    for mut summary in base.summaries {
        let raw_count = raw_counts
            .get(&(summary.individual_id.as_str(), summary.trip_id))
            .copied();
        match raw_count {
            Some(count) => {
                summary.raw_n_locs = Some(count);
                report.summaries.push(summary);
            }
            None => {
                let issue = TripError::MissingRawCount {
                    individual_id: summary.individual_id,
                    trip_id: summary.trip_id,
                };
                warn!("[Summary] {}", issue);
                report.issues.push(issue);
            }
        }
    }

    report
}
