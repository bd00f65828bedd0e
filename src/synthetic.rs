//! Synthetic foraging tracks for testing and benchmarking.
//!
//! Generates seeded out-and-back trips from a colony with known ground truth:
//! every trip's id and expected type are recorded alongside the fixes.
//!
//! Feature-gated behind `synthetic`; not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use tripsplit::synthetic::SyntheticColony;
//! use tripsplit::{split_trips, TripConfig};
//!
//! let colony = SyntheticColony {
//!     individual_count: 3,
//!     trips_per_individual: 4,
//!     ..SyntheticColony::default()
//! };
//! let dataset = colony.generate();
//! assert_eq!(dataset.expected_trips.len(), 12);
//!
//! let output = split_trips(&dataset.fixes, &TripConfig::default()).unwrap();
//! assert!(output.issues.is_empty());
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use crate::{Location, RawFix, TripId, TripType};

/// Outbound fixes removed to open a gap. With 15 minute fixes and 1.5 km
/// steps this exceeds the default gap thresholds (2 h, 5 km).
const GAP_DROPPED_FIXES: usize = 9;

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

// ============================================================================
// Types
// ============================================================================

/// Ground truth for one generated trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedTrip {
    pub individual_id: String,
    pub trip_id: TripId,
    pub trip_type: TripType,
}

/// A generated dataset with ground truth.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    /// Fixes for all individuals, each carrying the colony as origin.
    pub fixes: Vec<RawFix>,
    pub expected_trips: Vec<ExpectedTrip>,
}

impl SyntheticDataset {
    pub fn expected_of(&self, trip_type: TripType) -> usize {
        self.expected_trips
            .iter()
            .filter(|t| t.trip_type == trip_type)
            .count()
    }
}

/// Scenario for a colony of central-place foragers.
#[derive(Debug, Clone)]
pub struct SyntheticColony {
    pub origin: Location,
    pub individual_count: usize,
    pub trips_per_individual: usize,
    /// Fixes recorded at the colony before each trip.
    pub colony_fixes: usize,
    /// Fixes per outbound (and inbound) leg.
    pub steps_per_leg: usize,
    pub fix_interval_minutes: i64,
    pub min_range_m: f64,
    pub max_range_m: f64,
    /// Every n-th trip loses part of its outbound leg.
    pub gap_every: Option<usize>,
    /// The last trip of each individual never returns.
    pub unfinished_last_trip: bool,
    pub gps_noise_sigma_meters: f64,
    pub start: DateTime<Utc>,
    pub seed: u64,
}

impl Default for SyntheticColony {
    fn default() -> Self {
        Self {
            origin: Location::new(-5.5, 56.2),
            individual_count: 10,
            trips_per_individual: 5,
            colony_fixes: 4,
            steps_per_leg: 20,
            fix_interval_minutes: 15,
            min_range_m: 30_000.0,
            max_range_m: 80_000.0,
            gap_every: None,
            unfinished_last_trip: false,
            gps_noise_sigma_meters: 20.0,
            start: Utc
                .with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
            seed: 42,
        }
    }
}

// ============================================================================
// Coordinate Helpers
// ============================================================================

fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

fn meters_to_deg_lng(meters: f64, latitude: f64) -> f64 {
    let meters_per_deg_lng = METERS_PER_DEG_LAT * latitude.to_radians().cos();
    if meters_per_deg_lng.abs() < 1e-10 {
        return 0.0;
    }
    meters / meters_per_deg_lng
}

/// Point `distance` meters from `origin` along `heading` (radians from north).
fn offset(origin: &Location, distance: f64, heading: f64) -> Location {
    Location::new(
        origin.longitude + meters_to_deg_lng(distance * heading.sin(), origin.latitude),
        origin.latitude + meters_to_deg_lat(distance * heading.cos()),
    )
}

/// Gaussian GPS noise (Box-Muller).
fn add_gps_noise(p: Location, sigma_meters: f64, rng: &mut StdRng) -> Location {
    if sigma_meters <= 0.0 {
        return p;
    }
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.gen();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    let z1 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin();

    Location::new(
        p.longitude + meters_to_deg_lng(z1 * sigma_meters, p.latitude),
        p.latitude + meters_to_deg_lat(z0 * sigma_meters),
    )
}

// ============================================================================
// Generation
// ============================================================================

impl SyntheticColony {
    /// Generate fixes and ground truth for every individual.
    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut fixes = Vec::new();
        let mut expected_trips = Vec::new();
        let step = Duration::minutes(self.fix_interval_minutes);

        for individual in 0..self.individual_count {
            let id = format!("ind-{:03}", individual + 1);
            let mut t = self.start + Duration::minutes(rng.gen_range(0..60));

            let mut push = |t: DateTime<Utc>, p: Location, rng: &mut StdRng| {
                let p = add_gps_noise(p, self.gps_noise_sigma_meters, rng);
                fixes.push(
                    RawFix::new(id.as_str(), t, p.longitude, p.latitude).with_origin(self.origin),
                );
            };

            for trip in 1..=self.trips_per_individual {
                for _ in 0..self.colony_fixes {
                    push(t, self.origin, &mut rng);
                    t = t + step;
                }

                let heading = rng.gen_range(0.0..2.0 * PI);
                let range = rng.gen_range(self.min_range_m..=self.max_range_m);
                let leg = self.steps_per_leg as f64;

                let gappy = self
                    .gap_every
                    .is_some_and(|n| n > 0 && trip % n == 0)
                    && self.steps_per_leg >= GAP_DROPPED_FIXES + 3;
                let unfinished = self.unfinished_last_trip && trip == self.trips_per_individual;

                for s in 1..=self.steps_per_leg {
                    let dropped = gappy && (2..2 + GAP_DROPPED_FIXES).contains(&s);
                    if !dropped {
                        push(t, offset(&self.origin, range * s as f64 / leg, heading), &mut rng);
                    }
                    t = t + step;
                }
                if !unfinished {
                    for s in (0..self.steps_per_leg).rev() {
                        push(t, offset(&self.origin, range * s as f64 / leg, heading), &mut rng);
                        t = t + step;
                    }
                }

                let trip_type = if gappy {
                    TripType::Gappy
                } else if unfinished {
                    TripType::Incomplete
                } else {
                    TripType::Complete
                };
                expected_trips.push(ExpectedTrip {
                    individual_id: id.clone(),
                    trip_id: TripId(trip as i32),
                    trip_type,
                });
            }
        }

        SyntheticDataset {
            fixes,
            expected_trips,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
