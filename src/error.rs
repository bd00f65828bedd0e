//! Unified error handling for trip segmentation.
//!
//! Per-individual and per-trip failures are collected as issues by the
//! pipeline and summarizer; only run-level failures abort processing.

use crate::{Location, TripId, TripType};
use thiserror::Error;

/// Errors raised while segmenting, classifying or summarizing trips.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TripError {
    /// Multi-origin dataset and the individual has no origin candidate.
    #[error("no origin for individual '{individual_id}' in a multi-origin dataset")]
    UnresolvedOrigin { individual_id: String },

    /// The individual carries more than one distinct origin.
    #[error("individual '{individual_id}' has {} distinct origins", .origins.len())]
    AmbiguousOrigin {
        individual_id: String,
        origins: Vec<Location>,
    },

    /// Not enough fixes to process an individual.
    #[error("individual '{individual_id}' has {fix_count} fixes, skipped")]
    InsufficientData {
        individual_id: String,
        fix_count: usize,
    },

    /// A fix outside the longitude/latitude range while measuring geodesically.
    #[error("individual '{individual_id}' has out-of-range fix ({longitude}, {latitude})")]
    InvalidCoordinate {
        individual_id: String,
        longitude: f64,
        latitude: f64,
    },

    /// A trip group carries more than one trip type.
    #[error("trip {trip_id} of '{individual_id}' has mixed trip types {types:?}")]
    HeterogeneousTripType {
        individual_id: String,
        trip_id: TripId,
        types: Vec<TripType>,
    },

    /// An interpolated trip has no raw trip to take its fix count from.
    #[error("interpolated trip {trip_id} of '{individual_id}' has no raw trip")]
    MissingRawCount {
        individual_id: String,
        trip_id: TripId,
    },

    /// No fixes were supplied at all.
    #[error("input contains no fixes")]
    EmptyInput,

    #[error("invalid configuration: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    #[error("projection failed: {message}")]
    Projection { message: String },

    #[error("interpolation failed: {message}")]
    Interpolation { message: String },
}

impl TripError {
    /// Whether the error aborts the whole run rather than one individual or trip.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TripError::EmptyInput
                | TripError::InvalidConfig { .. }
                | TripError::Projection { .. }
                | TripError::Interpolation { .. }
        )
    }

    /// The individual the error is scoped to, if any.
    pub fn individual_id(&self) -> Option<&str> {
        match self {
            TripError::UnresolvedOrigin { individual_id }
            | TripError::AmbiguousOrigin { individual_id, .. }
            | TripError::InsufficientData { individual_id, .. }
            | TripError::InvalidCoordinate { individual_id, .. }
            | TripError::HeterogeneousTripType { individual_id, .. }
            | TripError::MissingRawCount { individual_id, .. } => Some(individual_id),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TripError>;

/// Convert lookups that may miss into typed errors.
pub trait OptionExt<T> {
    fn ok_or_unresolved_origin(self, individual_id: &str) -> Result<T>;
    fn ok_or_insufficient_data(self, individual_id: &str, fix_count: usize) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_unresolved_origin(self, individual_id: &str) -> Result<T> {
        self.ok_or_else(|| TripError::UnresolvedOrigin {
            individual_id: individual_id.to_string(),
        })
    }

    fn ok_or_insufficient_data(self, individual_id: &str, fix_count: usize) -> Result<T> {
        self.ok_or_else(|| TripError::InsufficientData {
            individual_id: individual_id.to_string(),
            fix_count,
        })
    }
}
