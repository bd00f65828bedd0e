//! Distance calculations between fixes and to a fixed reference point.
//!
//! The caller picks the [`DistanceMode`]; nothing here guesses whether
//! coordinates are geographic or already projected.

use geo::{Distance, Euclidean, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::Location;

/// How coordinates are interpreted when measuring distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMode {
    /// Longitude/latitude in degrees, great-circle (haversine) distance.
    #[default]
    Geodesic,
    /// Projected x/y in metres, Euclidean distance.
    Planar,
}

impl DistanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMode::Geodesic => "geodesic",
            DistanceMode::Planar => "planar",
        }
    }
}

impl std::fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DistanceMode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "geodesic" | "geographic" | "haversine" => Ok(DistanceMode::Geodesic),
            "planar" | "projected" | "euclidean" => Ok(DistanceMode::Planar),
            other => Err(format!("unknown distance mode '{}'", other)),
        }
    }
}

/// Distance in metres between two locations.
pub fn distance_between(a: &Location, b: &Location, mode: DistanceMode) -> f64 {
    let p1 = Point::new(a.longitude, a.latitude);
    let p2 = Point::new(b.longitude, b.latitude);
    match mode {
        DistanceMode::Geodesic => Haversine::distance(p1, p2),
        DistanceMode::Planar => Euclidean::distance(p1, p2),
    }
}

/// Distance from each point to its predecessor.
///
/// The result has the same length as `points`. Element 0 is always `None`,
/// and an input shorter than two points yields only `None` values.
pub fn pairwise_consecutive_distance(points: &[Location], mode: DistanceMode) -> Vec<Option<f64>> {
    let mut distances = Vec::with_capacity(points.len());
    if points.is_empty() {
        return distances;
    }
    distances.push(None);
    distances.extend(
        points
            .windows(2)
            .map(|w| Some(distance_between(&w[0], &w[1], mode))),
    );
    distances
}

/// Distance from every point to a fixed reference, e.g. the colony.
pub fn distance_to_point(points: &[Location], reference: &Location, mode: DistanceMode) -> Vec<f64> {
    points
        .iter()
        .map(|p| distance_between(p, reference, mode))
        .collect()
}

/// Total path length of an ordered sequence of points in metres.
pub fn path_length(points: &[Location], mode: DistanceMode) -> f64 {
    points
        .windows(2)
        .map(|w| distance_between(&w[0], &w[1], mode))
        .sum()
}
