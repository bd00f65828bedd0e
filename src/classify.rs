//! Gap detection, trip sections and trip classification.
//!
//! Each (individual, trip id) group is ordered by time and walked once:
//! - Δt and Δdistance to the previous fix in the group
//! - a gap where both exceed their thresholds
//! - trip section = 1 + gaps seen so far
//! - one trip type per group from [`TripRule::ORDERED`]

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::distance::{pairwise_consecutive_distance, DistanceMode};
use crate::segment::SegmentedFix;
use crate::{Location, TripId, TripType};

/// Fewer fixes than this and a run is never a trip.
pub const MIN_TRIP_FIXES: usize = 3;

/// Parameters for gap detection and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyConfig {
    pub gap_time_hours: f64,
    pub gap_dist_m: f64,
    pub return_buffer_m: f64,
    pub mode: DistanceMode,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        crate::TripConfig::default().classify_config()
    }
}

/// Anything carrying a trip assignment that can be (re)classified.
pub trait TripMember {
    fn individual_id(&self) -> &str;
    fn trip_id(&self) -> TripId;
    fn timestamp(&self) -> DateTime<Utc>;
    fn location(&self) -> Location;
    fn dist_from_origin(&self) -> f64;
}

impl TripMember for SegmentedFix {
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
        SegmentedFix::location(self)
    }
    fn dist_from_origin(&self) -> f64 {
        self.dist_from_origin
    }
}

/// A fix with gap, section and trip type annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedFix {
    pub individual_id: String,
    pub timestamp: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    pub dist_from_origin: f64,
    pub trip_id: TripId,
    /// Starts at 1, +1 at every gap within the trip
    pub trip_section: u32,
    /// Hours since the previous fix of the same trip (0 for the first)
    pub dt_hours: f64,
    /// Meters from the previous fix of the same trip (None for the first)
    pub step_distance: Option<f64>,
    /// This fix starts a new section
    pub gap: bool,
    pub trip_type: TripType,
}

impl ClassifiedFix {
    pub fn location(&self) -> Location {
        Location::new(self.longitude, self.latitude)
    }
}

impl TripMember for ClassifiedFix {
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
        ClassifiedFix::location(self)
    }
    fn dist_from_origin(&self) -> f64 {
        self.dist_from_origin
    }
}

/// What the classification rules need to know about a trip group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupFacts {
    pub trip_id: TripId,
    pub fix_count: usize,
    pub has_gap: bool,
    pub first_dist: f64,
    pub last_dist: f64,
}

/// Classification rules, evaluated in [`TripRule::ORDERED`] order; the first
/// match decides the trip type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripRule {
    /// Fixes inside the inner buffer.
    NonTripId,
    /// Fewer than [`MIN_TRIP_FIXES`] fixes.
    TooFewFixes,
    /// At least one gap.
    HasGap,
    /// Starts or ends beyond the return buffer.
    OutsideReturnBuffer,
    /// Everything else.
    RoundTrip,
}

impl TripRule {
    pub const ORDERED: [TripRule; 5] = [
        TripRule::NonTripId,
        TripRule::TooFewFixes,
        TripRule::HasGap,
        TripRule::OutsideReturnBuffer,
        TripRule::RoundTrip,
    ];

    pub fn matches(&self, facts: &GroupFacts, config: &ClassifyConfig) -> bool {
        match self {
            TripRule::NonTripId => !facts.trip_id.is_trip(),
            TripRule::TooFewFixes => facts.fix_count < MIN_TRIP_FIXES,
            TripRule::HasGap => facts.has_gap,
            TripRule::OutsideReturnBuffer => {
                facts.first_dist > config.return_buffer_m || facts.last_dist > config.return_buffer_m
            }
            TripRule::RoundTrip => true,
        }
    }

    pub fn trip_type(&self) -> TripType {
        match self {
            TripRule::NonTripId | TripRule::TooFewFixes => TripType::NonTrip,
            TripRule::HasGap => TripType::Gappy,
            TripRule::OutsideReturnBuffer => TripType::Incomplete,
            TripRule::RoundTrip => TripType::Complete,
        }
    }
}

/// The first rule that matches a group.
pub fn classify_group(facts: &GroupFacts, config: &ClassifyConfig) -> TripRule {
    TripRule::ORDERED
        .into_iter()
        .find(|rule| rule.matches(facts, config))
        .unwrap_or(TripRule::RoundTrip)
}

/// Indices of each (individual, trip id) group in first-appearance order.
pub(crate) fn group_indices<F: TripMember>(fixes: &[F]) -> Vec<Vec<usize>> {
    let mut lookup: HashMap<(&str, TripId), usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (i, fix) in fixes.iter().enumerate() {
        let key = (fix.individual_id(), fix.trip_id());
        let slot = *lookup.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }

    groups
}

/// Detect gaps, number trip sections and classify every trip.
///
/// Accepts segmented fixes or already classified ones; classifying the
/// output again with the same config returns the same annotations. Output
/// order and length match the input.
pub fn classify_trips<F: TripMember>(fixes: &[F], config: &ClassifyConfig) -> Vec<ClassifiedFix> {
    let mut classified: Vec<Option<ClassifiedFix>> = (0..fixes.len()).map(|_| None).collect();

    for mut indices in group_indices(fixes) {
        indices.sort_by_key(|&i| fixes[i].timestamp());

        let locations: Vec<Location> = indices.iter().map(|&i| fixes[i].location()).collect();
        let steps = pairwise_consecutive_distance(&locations, config.mode);

        let mut dts = Vec::with_capacity(indices.len());
        let mut gaps = Vec::with_capacity(indices.len());
        for (pos, &i) in indices.iter().enumerate() {
            let dt_hours = match pos.checked_sub(1) {
                Some(prev) => hours_between(fixes[indices[prev]].timestamp(), fixes[i].timestamp()),
                None => 0.0,
            };
            let is_gap = dt_hours > config.gap_time_hours
                && steps[pos].is_some_and(|d| d > config.gap_dist_m);
            dts.push(dt_hours);
            gaps.push(is_gap);
        }

        let first = &fixes[indices[0]];
        let last = &fixes[indices[indices.len() - 1]];
        let facts = GroupFacts {
            trip_id: first.trip_id(),
            fix_count: indices.len(),
            has_gap: gaps.iter().any(|g| *g),
            first_dist: first.dist_from_origin(),
            last_dist: last.dist_from_origin(),
        };
        let trip_type = classify_group(&facts, config).trip_type();

        let mut section = 1;
        for (pos, &i) in indices.iter().enumerate() {
            if gaps[pos] {
                section += 1;
            }
            let fix = &fixes[i];
            let location = fix.location();
            classified[i] = Some(ClassifiedFix {
                individual_id: fix.individual_id().to_string(),
                timestamp: fix.timestamp(),
                longitude: location.longitude,
                latitude: location.latitude,
                dist_from_origin: fix.dist_from_origin(),
                trip_id: fix.trip_id(),
                trip_section: section,
                dt_hours: dts[pos],
                step_distance: steps[pos],
                gap: gaps[pos],
                trip_type,
            });
        }
    }

    classified.into_iter().flatten().collect()
}

/// Keep only fixes belonging to real trips.
pub fn retain_trips(fixes: &[ClassifiedFix]) -> Vec<ClassifiedFix> {
    fixes
        .iter()
        .filter(|f| f.trip_type != TripType::NonTrip)
        .cloned()
        .collect()
}

/// Number of distinct trips per type (the non-trip group of an individual counts once).
pub fn trip_type_counts(fixes: &[ClassifiedFix]) -> HashMap<TripType, usize> {
    let mut counts = HashMap::new();
    for indices in group_indices(fixes) {
        *counts.entry(fixes[indices[0]].trip_type).or_insert(0) += 1;
    }
    counts
}

fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(trip_id: i32, fix_count: usize, has_gap: bool, first: f64, last: f64) -> GroupFacts {
        GroupFacts {
            trip_id: TripId(trip_id),
            fix_count,
            has_gap,
            first_dist: first,
            last_dist: last,
        }
    }

    #[test]
    fn test_rule_priority() {
        let config = ClassifyConfig {
            return_buffer_m: 100.0,
            ..Default::default()
        };

        assert_eq!(classify_group(&facts(-1, 10, true, 500.0, 500.0), &config), TripRule::NonTripId);
        assert_eq!(classify_group(&facts(1, 2, true, 500.0, 500.0), &config), TripRule::TooFewFixes);
        assert_eq!(classify_group(&facts(1, 5, true, 500.0, 500.0), &config), TripRule::HasGap);
        assert_eq!(
            classify_group(&facts(1, 5, false, 50.0, 500.0), &config),
            TripRule::OutsideReturnBuffer
        );
        assert_eq!(classify_group(&facts(1, 5, false, 50.0, 50.0), &config), TripRule::RoundTrip);
    }

    #[test]
    fn test_return_buffer_is_exclusive() {
        let config = ClassifyConfig {
            return_buffer_m: 100.0,
            ..Default::default()
        };
        let rule = classify_group(&facts(1, 3, false, 100.0, 100.0), &config);
        assert_eq!(rule.trip_type(), TripType::Complete);
    }
}
