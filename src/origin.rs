//! Origin (colony or nest) resolution per individual.
//!
//! A dataset either shares one colony between all individuals, or carries one
//! nest per individual. [`OriginResolver`] captures which case applies so the
//! rest of the pipeline never branches on how many origin rows were supplied.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::{OptionExt, Result, TripError};
use crate::{Location, RawFix};

/// Maps individuals to the reference point trips are measured from.
#[derive(Debug, Clone, PartialEq)]
pub enum OriginResolver {
    /// Exactly one distinct origin across the dataset.
    Shared(Location),
    /// One origin per individual. Each entry holds the distinct candidates
    /// recorded for that individual; more than one is an ambiguity.
    PerIndividual(HashMap<String, Vec<Location>>),
}

impl OriginResolver {
    /// A single colony for every individual.
    pub fn shared(origin: Location) -> Self {
        OriginResolver::Shared(origin)
    }

    /// Build a resolver from `(individual_id, origin)` candidates.
    ///
    /// If all candidates are the same point the result is [`OriginResolver::Shared`],
    /// regardless of which individuals supplied them.
    pub fn from_candidates<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = (S, Location)>,
        S: Into<String>,
    {
        let mut per_individual: HashMap<String, Vec<Location>> = HashMap::new();
        for (id, origin) in candidates {
            let entry = per_individual.entry(id.into()).or_default();
            if !entry.contains(&origin) {
                entry.push(origin);
            }
        }

        let mut distinct: HashSet<(u64, u64)> = HashSet::new();
        let mut first = None;
        for origin in per_individual.values().flatten() {
            if distinct.insert(location_key(origin)) && first.is_none() {
                first = Some(*origin);
            }
        }

        if let (1, Some(origin)) = (distinct.len(), first) {
            debug!("Single shared origin at {:?}", origin);
            return OriginResolver::Shared(origin);
        }

        debug!(
            "{} distinct origins across {} individuals",
            distinct.len(),
            per_individual.len()
        );
        OriginResolver::PerIndividual(per_individual)
    }

    /// Build a resolver from the origin columns of imported fixes.
    /// Rows without both origin coordinates contribute no candidate.
    pub fn from_raw_fixes(fixes: &[RawFix]) -> Self {
        Self::from_candidates(
            fixes
                .iter()
                .filter_map(|f| f.origin().map(|o| (f.individual_id.as_str(), o))),
        )
    }

    /// Apply `transform` to every origin in one call, keeping the resolver's shape.
    ///
    /// Used to move origins into the same coordinate space as projected fixes.
    pub fn try_map_locations<F>(&self, transform: F) -> Result<Self>
    where
        F: FnOnce(&[Location]) -> Result<Vec<Location>>,
    {
        match self {
            OriginResolver::Shared(origin) => {
                let mapped = transform(std::slice::from_ref(origin))?;
                match mapped.as_slice() {
                    [origin] => Ok(OriginResolver::Shared(*origin)),
                    other => Err(TripError::Projection {
                        message: format!("expected 1 mapped origin, got {}", other.len()),
                    }),
                }
            }
            OriginResolver::PerIndividual(map) => {
                let entries: Vec<(&String, &Vec<Location>)> = map.iter().collect();
                let flat: Vec<Location> = entries
                    .iter()
                    .flat_map(|(_, candidates)| candidates.iter().copied())
                    .collect();
                let mapped = transform(&flat)?;
                if mapped.len() != flat.len() {
                    return Err(TripError::Projection {
                        message: format!(
                            "expected {} mapped origins, got {}",
                            flat.len(),
                            mapped.len()
                        ),
                    });
                }

                let mut rest = mapped.into_iter();
                let map = entries
                    .into_iter()
                    .map(|(id, candidates)| {
                        let mapped: Vec<Location> = rest.by_ref().take(candidates.len()).collect();
                        (id.clone(), mapped)
                    })
                    .collect();
                Ok(OriginResolver::PerIndividual(map))
            }
        }
    }

    /// True when origins are resolved per individual.
    pub fn is_multi_origin(&self) -> bool {
        matches!(self, OriginResolver::PerIndividual(_))
    }

    /// The origin of `individual_id`.
    pub fn resolve(&self, individual_id: &str) -> Result<Location> {
        match self {
            OriginResolver::Shared(origin) => Ok(*origin),
            OriginResolver::PerIndividual(map) => {
                let candidates = map
                    .get(individual_id)
                    .filter(|c| !c.is_empty())
                    .ok_or_unresolved_origin(individual_id)?;
                if candidates.len() > 1 {
                    return Err(TripError::AmbiguousOrigin {
                        individual_id: individual_id.to_string(),
                        origins: candidates.clone(),
                    });
                }
                Ok(candidates[0])
            }
        }
    }

    /// Individuals with an explicit entry, sorted. Empty for a shared origin.
    pub fn individuals(&self) -> Vec<&str> {
        match self {
            OriginResolver::Shared(_) => Vec::new(),
            OriginResolver::PerIndividual(map) => {
                let mut ids: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
                ids.sort_unstable();
                ids
            }
        }
    }
}

/// Hashable identity of a location; `-0.0` and `0.0` compare equal.
fn location_key(location: &Location) -> (u64, u64) {
    (
        (location.longitude + 0.0).to_bits(),
        (location.latitude + 0.0).to_bits(),
    )
}
