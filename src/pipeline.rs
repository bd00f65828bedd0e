//! End-to-end trip splitting.
//!
//! Individuals are independent: each one is segmented and classified on its
//! own (in parallel with the `parallel` feature), then the results are merged
//! and re-sorted by (individual, timestamp) before summarizing.

use std::collections::BTreeMap;

use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::classify::{classify_trips, retain_trips, trip_type_counts, ClassifiedFix};
use crate::distance::DistanceMode;
use crate::error::{OptionExt, Result, TripError};
use crate::origin::OriginResolver;
use crate::projection::{project_checked, Projection};
use crate::segment::segment_individual;
use crate::summary::{summarize_trips, TripSummary};
use crate::{Location, RawFix, TripConfig, TripType};

/// Classified fixes, trip summaries and everything that went wrong per
/// individual or per trip.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Sorted by (individual, timestamp). Coordinates are projected when the
    /// pipeline has a projection; see [`TripPipeline::output_origins`].
    pub fixes: Vec<ClassifiedFix>,
    pub summaries: Vec<TripSummary>,
    pub issues: Vec<TripError>,
}

impl PipelineOutput {
    /// Summaries of a given trip type.
    pub fn summaries_of(&self, trip_type: TripType) -> impl Iterator<Item = &TripSummary> {
        self.summaries
            .iter()
            .filter(move |s| s.trip_type == trip_type)
    }

    /// Number of trips, excluding each individual's non-trip group.
    pub fn trip_count(&self) -> usize {
        self.summaries.iter().filter(|s| s.trip_id.is_trip()).count()
    }
}

/// Runs segmentation, classification and summary with one configuration.
pub struct TripPipeline {
    config: TripConfig,
    projection: Option<Box<dyn Projection>>,
}

impl TripPipeline {
    pub fn new(config: TripConfig) -> Self {
        Self {
            config,
            projection: None,
        }
    }

    /// Project fixes and origins before measuring; distances become planar.
    pub fn with_projection(mut self, projection: impl Projection + 'static) -> Self {
        self.projection = Some(Box::new(projection));
        self
    }

    pub fn config(&self) -> &TripConfig {
        &self.config
    }

    /// The distance mode actually used, accounting for an injected projection.
    pub fn distance_mode(&self) -> DistanceMode {
        if self.projection.is_some() {
            DistanceMode::Planar
        } else {
            self.config.distance_mode
        }
    }

    /// Origins in the coordinate space of this pipeline's output fixes.
    ///
    /// Without a projection this is `origins` unchanged. Downstream stages that
    /// measure against output fixes (interpolation, re-summarizing) need these
    /// together with [`TripPipeline::distance_mode`].
    pub fn output_origins(&self, origins: &OriginResolver) -> Result<OriginResolver> {
        match &self.projection {
            Some(projection) => {
                origins.try_map_locations(|points| project_checked(projection.as_ref(), points))
            }
            None => Ok(origins.clone()),
        }
    }

    /// Segment and classify one individual.
    ///
    /// Only this individual's fixes need to be in memory, so callers can stream
    /// a large dataset one individual at a time.
    pub fn process_individual(
        &self,
        individual_id: &str,
        fixes: &[RawFix],
        origins: &OriginResolver,
    ) -> Result<Vec<ClassifiedFix>> {
        fixes.first().ok_or_insufficient_data(individual_id, 0)?;

        let origin = origins.resolve(individual_id)?;
        let mode = self.distance_mode();
        let mut segment_config = self.config.segment_config();
        segment_config.mode = mode;
        let mut classify_config = self.config.classify_config();
        classify_config.mode = mode;

        let segmented = match &self.projection {
            Some(projection) => {
                let (projected, origin) = project_fixes(projection.as_ref(), fixes, origin)?;
                segment_individual(individual_id, &projected, &origin, &segment_config)?
            }
            None => segment_individual(individual_id, fixes, &origin, &segment_config)?,
        };

        let classified = classify_trips(&segmented, &classify_config);
        debug!(
            "[Pipeline] {}: {} fixes classified",
            individual_id,
            classified.len()
        );

        if self.config.remove_non_trip {
            Ok(retain_trips(&classified))
        } else {
            Ok(classified)
        }
    }

    /// Process every individual in `fixes` and summarize their trips.
    ///
    /// Per-individual failures are collected in [`PipelineOutput::issues`].
    /// Invalid configuration, empty input and collaborator failures abort.
    pub fn run(&self, fixes: &[RawFix], origins: &OriginResolver) -> Result<PipelineOutput> {
        self.config.validate()?;
        if fixes.is_empty() {
            return Err(TripError::EmptyInput);
        }

        let mut by_individual: BTreeMap<&str, Vec<RawFix>> = BTreeMap::new();
        for fix in fixes {
            by_individual
                .entry(fix.individual_id.as_str())
                .or_default()
                .push(fix.clone());
        }

        let mut issues = Vec::new();
        for id in origins.individuals() {
            if let Err(issue) = by_individual.get(id).ok_or_insufficient_data(id, 0) {
                warn!("[Pipeline] {}", issue);
                issues.push(issue);
            }
        }

        info!(
            "[Pipeline] Processing {} fixes from {} individuals ({} origin, {} distances)",
            fixes.len(),
            by_individual.len(),
            if origins.is_multi_origin() {
                "per-individual"
            } else {
                "shared"
            },
            self.distance_mode()
        );

        let groups: Vec<(&str, Vec<RawFix>)> = by_individual.into_iter().collect();

        #[cfg(feature = "parallel")]
        let results: Vec<Result<Vec<ClassifiedFix>>> = groups
            .par_iter()
            .map(|(id, group)| self.process_individual(id, group, origins))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let results: Vec<Result<Vec<ClassifiedFix>>> = groups
            .iter()
            .map(|(id, group)| self.process_individual(id, group, origins))
            .collect();

        let mut classified = Vec::with_capacity(fixes.len());
        for result in results {
            match result {
                Ok(group) => classified.extend(group),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("[Pipeline] {}", e);
                    issues.push(e);
                }
            }
        }

        // Groups finish in any order when parallel
        classified.sort_by(|a, b| {
            a.individual_id
                .cmp(&b.individual_id)
                .then(a.timestamp.cmp(&b.timestamp))
        });

        let report = summarize_trips(&classified, self.distance_mode());
        issues.extend(report.issues);

        let output = PipelineOutput {
            fixes: classified,
            summaries: report.summaries,
            issues,
        };

        let counts = trip_type_counts(&output.fixes);
        info!(
            "[Pipeline] {} trips: {} complete, {} incomplete, {} gappy; {} issues",
            output.trip_count(),
            counts.get(&TripType::Complete).unwrap_or(&0),
            counts.get(&TripType::Incomplete).unwrap_or(&0),
            counts.get(&TripType::Gappy).unwrap_or(&0),
            output.issues.len()
        );

        Ok(output)
    }
}

/// Split trips using origins recorded on the fixes themselves.
pub fn split_trips(fixes: &[RawFix], config: &TripConfig) -> Result<PipelineOutput> {
    let origins = OriginResolver::from_raw_fixes(fixes);
    TripPipeline::new(config.clone()).run(fixes, &origins)
}

fn project_fixes(
    projection: &dyn Projection,
    fixes: &[RawFix],
    origin: Location,
) -> Result<(Vec<RawFix>, Location)> {
    let mut points: Vec<Location> = fixes.iter().map(|f| f.location()).collect();
    points.push(origin);
    let mut projected = project_checked(projection, &points)?;
    let origin = projected.pop().unwrap_or(origin);

    let fixes = fixes
        .iter()
        .zip(projected)
        .map(|(fix, p)| RawFix {
            longitude: p.longitude,
            latitude: p.latitude,
            ..fix.clone()
        })
        .collect();
    Ok((fixes, origin))
}
