//! Interpolation seam.
//!
//! Track interpolation (e.g. a continuous-time correlated random walk) is an
//! external engine. It receives classified fixes of the selected trip types
//! and returns a regular-interval track with the same individual, trip id,
//! timestamp and distance shape, which the summarizer accepts unchanged.
//!
//! [`LinearInterpolator`] is a deterministic stand-in: straight lines between
//! bracketing fixes, no motion model.

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::classify::{group_indices, ClassifiedFix, TripMember};
use crate::distance::{distance_between, DistanceMode};
use crate::error::{Result, TripError};
use crate::origin::OriginResolver;
use crate::summary::SummaryInput;
use crate::{Location, TripId, TripType};

/// A fix produced by an interpolation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedFix {
    pub individual_id: String,
    pub trip_id: TripId,
    pub timestamp: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    pub dist_from_origin: f64,
    pub trip_type: TripType,
}

impl TripMember for InterpolatedFix {
    fn individual_id(&self) -> &str {
        &self.individual_id
    }
    fn trip_id(&self) -> TripId {
        self.trip_id
    }
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
    fn location(&self) -> Location {
        Location::new(self.longitude, self.latitude)
    }
    fn dist_from_origin(&self) -> f64 {
        self.dist_from_origin
    }
}

impl SummaryInput for InterpolatedFix {
    fn trip_type(&self) -> TripType {
        self.trip_type
    }
}

/// An engine that resamples trips at a regular time step.
pub trait Interpolator {
    fn interpolate(
        &self,
        fixes: &[ClassifiedFix],
        time_step: Duration,
    ) -> Result<Vec<InterpolatedFix>>;
}

/// Fixes whose trip type is one of `types`.
pub fn select_trip_types(fixes: &[ClassifiedFix], types: &[TripType]) -> Vec<ClassifiedFix> {
    fixes
        .iter()
        .filter(|f| types.contains(&f.trip_type))
        .cloned()
        .collect()
}

/// Straight-line interpolation between consecutive fixes of a trip.
///
/// Distance from origin is recomputed for every interpolated position.
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    pub origins: OriginResolver,
    pub mode: DistanceMode,
}

impl LinearInterpolator {
    pub fn new(origins: OriginResolver, mode: DistanceMode) -> Self {
        Self { origins, mode }
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(
        &self,
        fixes: &[ClassifiedFix],
        time_step: Duration,
    ) -> Result<Vec<InterpolatedFix>> {
        if time_step <= Duration::zero() {
            return Err(TripError::InvalidConfig {
                field: "time_step",
                value: time_step.num_milliseconds() as f64,
            });
        }

        let mut output = Vec::new();
        for mut indices in group_indices(fixes) {
            indices.sort_by_key(|&i| fixes[i].timestamp);
            let track: Vec<&ClassifiedFix> = indices.iter().map(|&i| &fixes[i]).collect();
            let origin = self.origins.resolve(&track[0].individual_id)?;

            let before = output.len();
            let end = track[track.len() - 1].timestamp;
            let mut t = track[0].timestamp;
            let mut seg = 0;

            while t <= end {
                // Advance to the segment [seg, seg + 1] containing t
                while seg + 1 < track.len() - 1 && track[seg + 1].timestamp < t {
                    seg += 1;
                }
                let location = position_at(&track, seg, t);
                output.push(InterpolatedFix {
                    individual_id: track[0].individual_id.clone(),
                    trip_id: track[0].trip_id,
                    timestamp: t,
                    longitude: location.longitude,
                    latitude: location.latitude,
                    dist_from_origin: distance_between(&location, &origin, self.mode),
                    trip_type: track[0].trip_type,
                });
                // Steps past the last representable instant end the track
                match t.checked_add_signed(time_step) {
                    Some(next) => t = next,
                    None => break,
                }
            }

            debug!(
                "[Interpolate] {} trip {}: {} -> {} fixes",
                track[0].individual_id,
                track[0].trip_id,
                track.len(),
                output.len() - before
            );
        }

        Ok(output)
    }
}

/// Position at time `t` on the segment starting at `track[seg]`.
fn position_at(track: &[&ClassifiedFix], seg: usize, t: DateTime<Utc>) -> Location {
    let a = track[seg];
    let Some(b) = track.get(seg + 1) else {
        return a.location();
    };

    let span = (b.timestamp - a.timestamp).num_milliseconds();
    if span <= 0 {
        return b.location();
    }
    let ratio = ((t - a.timestamp).num_milliseconds() as f64 / span as f64).clamp(0.0, 1.0);

    Location::new(
        a.longitude + ratio * (b.longitude - a.longitude),
        a.latitude + ratio * (b.latitude - a.latitude),
    )
}
