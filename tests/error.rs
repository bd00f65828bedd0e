//! Tests for error module

use tripsplit::error::{OptionExt, TripError};
use tripsplit::{TripId, TripType};

#[test]
fn test_error_display() {
    let err = TripError::InsufficientData {
        individual_id: "bird-1".to_string(),
        fix_count: 0,
    };
    assert!(err.to_string().contains("bird-1"));
    assert!(err.to_string().contains("0 fixes"));

    let err = TripError::HeterogeneousTripType {
        individual_id: "bird-2".to_string(),
        trip_id: TripId(3),
        types: vec![TripType::Complete, TripType::Gappy],
    };
    assert!(err.to_string().contains("trip 3"));
}

#[test]
fn test_option_ext() {
    let none: Option<i32> = None;
    assert!(matches!(
        none.ok_or_unresolved_origin("bird-1"),
        Err(TripError::UnresolvedOrigin { .. })
    ));
    assert_eq!(Some(4).ok_or_insufficient_data("bird-1", 0), Ok(4));
}

#[test]
fn test_fatal_classification() {
    assert!(TripError::EmptyInput.is_fatal());
    assert!(TripError::InvalidConfig {
        field: "gap_dist_m",
        value: -1.0
    }
    .is_fatal());
    let per_trip = TripError::MissingRawCount {
        individual_id: "bird-1".to_string(),
        trip_id: TripId(2),
    };
    assert!(!per_trip.is_fatal());
    assert_eq!(per_trip.individual_id(), Some("bird-1"));
    assert_eq!(TripError::EmptyInput.individual_id(), None);
}

#[test]
fn test_invalid_coordinate_is_per_individual() {
    let err = TripError::InvalidCoordinate {
        individual_id: "bird-7".to_string(),
        longitude: -5.0,
        latitude: 95.0,
    };
    assert!(!err.is_fatal());
    assert_eq!(err.individual_id(), Some("bird-7"));
    assert!(err.to_string().contains("95"));
}
