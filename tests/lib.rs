//! Tests for lib.rs core types and configuration

use chrono::{TimeZone, Utc};
use tripsplit::{DistanceMode, Location, RawFix, TripConfig, TripError, TripId, TripType};

#[test]
fn test_location_validation() {
    assert!(Location::new(-5.0, 56.0).is_valid_geographic());
    assert!(!Location::new(0.0, 91.0).is_valid_geographic());
    assert!(!Location::new(181.0, 0.0).is_valid_geographic());
    assert!(!Location::new(f64::NAN, 0.0).is_valid_geographic());
}

#[test]
fn test_raw_fix_origin() {
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let fix = RawFix::new("a", t, 1.0, 2.0);
    assert_eq!(fix.origin(), None);
    assert_eq!(fix.location(), Location::new(1.0, 2.0));

    let fix = fix.with_origin(Location::new(3.0, 4.0));
    assert_eq!(fix.origin(), Some(Location::new(3.0, 4.0)));

    let partial = RawFix {
        origin_latitude: None,
        ..fix
    };
    assert_eq!(partial.origin(), None);
}

#[test]
fn test_trip_id() {
    assert!(!TripId::NON_TRIP.is_trip());
    assert!(TripId(1).is_trip());
    assert_eq!(TripId(7).to_string(), "7");
    assert_eq!(serde_json::to_string(&TripId::NON_TRIP).unwrap(), "-1");
}

#[test]
fn test_trip_type_labels() {
    for t in TripType::ALL {
        assert_eq!(t.as_str().parse::<TripType>(), Ok(t));
        assert_eq!(
            serde_json::to_string(&t).unwrap(),
            format!("\"{}\"", t.as_str())
        );
    }
    assert_eq!(TripType::NonTrip.to_string(), "Non-trip");
    assert!("roundtrip".parse::<TripType>().is_err());
}

#[test]
fn test_config_defaults_and_validation() {
    let config = TripConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.segment_config().inner_buffer_m, 1_000.0);
    assert_eq!(config.classify_config().return_buffer_m, 10_000.0);

    let bad = TripConfig {
        gap_time_hours: f64::NAN,
        ..TripConfig::default()
    };
    assert!(matches!(
        bad.validate(),
        Err(TripError::InvalidConfig {
            field: "gap_time_hours",
            ..
        })
    ));
}

#[test]
fn test_config_from_partial_json() {
    let config: TripConfig =
        serde_json::from_str(r#"{"innerBufferM": 500.0, "distanceMode": "planar"}"#).unwrap();
    assert_eq!(config.inner_buffer_m, 500.0);
    assert_eq!(config.distance_mode, DistanceMode::Planar);
    assert_eq!(config.gap_dist_m, TripConfig::default().gap_dist_m);
}
