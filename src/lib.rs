//! # Trip Split
//!
//! Trip segmentation and classification for central-place foraging GPS tracks.
//!
//! Animals tracked from a colony or nest leave, forage and return. This library
//! turns an ordered set of fixes into discrete trips:
//! - Distance from origin for every fix (geodesic or planar)
//! - Trip segmentation with an inner buffer around the origin
//! - Gap detection and trip sections
//! - Trip classification: `Non-trip`, `Gappy`, `Incomplete`, `Complete`
//! - Per-trip summaries, including for interpolated tracks
//! - Parallel processing per individual
//!
//! ## Features
//!
//! - **`parallel`** - Process individuals in parallel with rayon (default)
//! - **`synthetic`** - Seeded synthetic foraging tracks for tests and benches
//! - **`cli`** - The `tripsplit-cli` binary (CSV in, CSV out)
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use tripsplit::{split_trips, Location, RawFix, TripConfig, TripType};
//!
//! let colony = Location::new(-5.0, 56.0);
//! let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
//! let offsets = [0.0, 0.05, 0.1, 0.15, 0.1, 0.05, 0.0];
//!
//! let fixes: Vec<RawFix> = offsets
//!     .iter()
//!     .enumerate()
//!     .map(|(i, dlat)| {
//!         RawFix::new("bird-1", start + Duration::hours(i as i64), -5.0, 56.0 + dlat)
//!             .with_origin(colony)
//!     })
//!     .collect();
//!
//! let output = split_trips(&fixes, &TripConfig::default()).unwrap();
//! assert_eq!(output.summaries.len(), 2);
//! assert!(output
//!     .summaries
//!     .iter()
//!     .any(|s| s.trip_type == TripType::Complete));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, TripError};

// Distance from origin and between consecutive fixes
pub mod distance;
pub use distance::{
    distance_between, distance_to_point, pairwise_consecutive_distance, path_length, DistanceMode,
};

// Colony / nest lookup
pub mod origin;
pub use origin::OriginResolver;

// Trip segmentation around the origin
pub mod segment;
pub use segment::{assign_trip_ids, segment_individual, SegmentConfig, SegmentedFix};

// Gap detection and trip classification
pub mod classify;
pub use classify::{
    classify_trips, retain_trips, trip_type_counts, ClassifiedFix, ClassifyConfig, TripMember,
    TripRule,
};

// Per-trip summaries
pub mod summary;
pub use summary::{
    summarize_interpolated, summarize_trips, SummaryInput, SummaryReport, TripSummary,
};

// Injected collaborators
pub mod interpolate;
pub mod projection;
pub use interpolate::{select_trip_types, InterpolatedFix, Interpolator, LinearInterpolator};
pub use projection::Projection;

// End-to-end orchestration
pub mod pipeline;
pub use pipeline::{split_trips, PipelineOutput, TripPipeline};

// Synthetic foraging tracks
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A position as longitude/latitude in degrees, or x/y in metres once projected.
///
/// # Example
/// ```
/// use tripsplit::Location;
/// let colony = Location::new(-5.0, 56.0);
/// assert!(colony.is_valid_geographic());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Check the location is a finite longitude/latitude pair.
    pub fn is_valid_geographic(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One imported GPS fix.
///
/// Coordinates must be present and timestamps absolute; rows failing that
/// are filtered by whatever imports the data. The origin columns are
/// optional when origins are supplied separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFix {
    pub individual_id: String,
    pub timestamp: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_latitude: Option<f64>,
}

impl RawFix {
    /// Create a fix without origin columns.
    pub fn new(
        individual_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        longitude: f64,
        latitude: f64,
    ) -> Self {
        Self {
            individual_id: individual_id.into(),
            timestamp,
            longitude,
            latitude,
            origin_longitude: None,
            origin_latitude: None,
        }
    }

    /// Attach the origin recorded for this fix.
    pub fn with_origin(mut self, origin: Location) -> Self {
        self.origin_longitude = Some(origin.longitude);
        self.origin_latitude = Some(origin.latitude);
        self
    }

    pub fn location(&self) -> Location {
        Location::new(self.longitude, self.latitude)
    }

    /// The recorded origin, if both coordinates are present.
    pub fn origin(&self) -> Option<Location> {
        match (self.origin_longitude, self.origin_latitude) {
            (Some(lon), Some(lat)) => Some(Location::new(lon, lat)),
            _ => None,
        }
    }
}

/// Trip number within one individual's track.
///
/// Trips count up from 1 in chronological order; [`TripId::NON_TRIP`] marks
/// fixes at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub i32);

impl TripId {
    pub const NON_TRIP: TripId = TripId(-1);

    pub fn is_trip(&self) -> bool {
        *self != Self::NON_TRIP
    }
}

impl std::fmt::Display for TripId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quality class of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TripType {
    #[serde(rename = "Non-trip")]
    NonTrip,
    Gappy,
    Incomplete,
    Complete,
}

impl TripType {
    pub const ALL: [TripType; 4] = [
        TripType::NonTrip,
        TripType::Gappy,
        TripType::Incomplete,
        TripType::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::NonTrip => "Non-trip",
            TripType::Gappy => "Gappy",
            TripType::Incomplete => "Incomplete",
            TripType::Complete => "Complete",
        }
    }
}

impl std::fmt::Display for TripType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TripType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "non-trip" | "nontrip" | "non_trip" => Ok(TripType::NonTrip),
            "gappy" => Ok(TripType::Gappy),
            "incomplete" => Ok(TripType::Incomplete),
            "complete" => Ok(TripType::Complete),
            other => Err(format!("unknown trip type '{}'", other)),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Thresholds for splitting and classifying trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripConfig {
    /// Fixes within this distance of the origin are not part of a trip.
    /// Default: 1000.0 meters
    pub inner_buffer_m: f64,

    /// A trip starting or ending beyond this distance is incomplete.
    /// Default: 10000.0 meters
    pub return_buffer_m: f64,

    /// Minimum time between fixes for a gap.
    /// Default: 2.0 hours
    pub gap_time_hours: f64,

    /// Minimum distance between fixes for a gap.
    /// Default: 5000.0 meters
    pub gap_dist_m: f64,

    /// Consecutive fixes further apart than this are separate tracking sessions,
    /// and no trip spans them. `None` disables the split.
    /// Default: 100 days
    pub gap_limit_days: Option<f64>,

    /// How coordinates are measured. Ignored when a projection is injected.
    pub distance_mode: DistanceMode,

    /// Drop `Non-trip` fixes from the classified output.
    pub remove_non_trip: bool,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            inner_buffer_m: 1_000.0,
            return_buffer_m: 10_000.0,
            gap_time_hours: 2.0,
            gap_dist_m: 5_000.0,
            gap_limit_days: Some(100.0),
            distance_mode: DistanceMode::Geodesic,
            remove_non_trip: false,
        }
    }
}

impl TripConfig {
    /// Reject negative or non-finite thresholds.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("inner_buffer_m", self.inner_buffer_m),
            ("return_buffer_m", self.return_buffer_m),
            ("gap_time_hours", self.gap_time_hours),
            ("gap_dist_m", self.gap_dist_m),
            ("gap_limit_days", self.gap_limit_days.unwrap_or(0.0)),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(TripError::InvalidConfig { field, value });
            }
        }
        Ok(())
    }

    pub fn segment_config(&self) -> SegmentConfig {
        SegmentConfig {
            inner_buffer_m: self.inner_buffer_m,
            gap_limit_days: self.gap_limit_days,
            mode: self.distance_mode,
        }
    }

    pub fn classify_config(&self) -> ClassifyConfig {
        ClassifyConfig {
            gap_time_hours: self.gap_time_hours,
            gap_dist_m: self.gap_dist_m,
            return_buffer_m: self.return_buffer_m,
            mode: self.distance_mode,
        }
    }
}
