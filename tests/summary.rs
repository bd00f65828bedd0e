//! Tests for summary module

use chrono::{DateTime, Duration, TimeZone, Utc};
use tripsplit::distance::DistanceMode;
use tripsplit::{
    classify_trips, summarize_interpolated, summarize_trips, ClassifiedFix, ClassifyConfig,
    InterpolatedFix, SegmentedFix, TripError, TripId, TripType,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap()
}

fn segmented(id: &str, trip: i32, hours: i64, x: f64) -> SegmentedFix {
    SegmentedFix {
        individual_id: id.to_string(),
        timestamp: t0() + Duration::hours(hours),
        longitude: x,
        latitude: 0.0,
        dist_from_origin: x.abs(),
        trip_id: TripId(trip),
    }
}

fn classified(fixes: &[SegmentedFix]) -> Vec<ClassifiedFix> {
    let config = ClassifyConfig {
        mode: DistanceMode::Planar,
        ..ClassifyConfig::default()
    };
    classify_trips(fixes, &config)
}

fn interpolated(id: &str, trip: i32, hours: i64, x: f64, trip_type: TripType) -> InterpolatedFix {
    InterpolatedFix {
        individual_id: id.to_string(),
        trip_id: TripId(trip),
        timestamp: t0() + Duration::hours(hours),
        longitude: x,
        latitude: 0.0,
        dist_from_origin: x.abs(),
        trip_type,
    }
}

#[test]
fn test_complete_trip_summary() {
    let fixes = classified(&[
        segmented("a", 1, 0, 2000.0),
        segmented("a", 1, 2, 25_000.0),
        segmented("a", 1, 4, 20_000.0),
        segmented("a", 1, 6, 3000.0),
    ]);
    let report = summarize_trips(&fixes, DistanceMode::Planar);

    assert!(report.is_clean());
    assert_eq!(report.summaries.len(), 1);
    let s = &report.summaries[0];
    assert_eq!(s.n_locs, 4);
    assert_eq!(s.departure, t0());
    assert_eq!(s.return_time, t0() + Duration::hours(6));
    assert_eq!(s.duration_hours, 6.0);
    assert_eq!(s.max_dist_km, 25.0);
    // 23 + 5 + 17 km
    assert_eq!(s.total_dist_km, 45.0);
    assert_eq!(s.trip_type, TripType::Complete);
    assert_eq!(s.raw_n_locs, None);
}

#[test]
fn test_summary_serializes_complete_column() {
    let fixes = classified(&[
        segmented("a", 1, 0, 2000.0),
        segmented("a", 1, 2, 25_000.0),
        segmented("a", 1, 4, 3000.0),
    ]);
    let report = summarize_trips(&fixes, DistanceMode::Planar);
    let json = serde_json::to_value(&report.summaries[0]).unwrap();
    assert_eq!(json["complete"], "Complete");
    assert_eq!(json["trip_id"], 1);
    assert!(json.get("raw_n_locs").is_none());
}

#[test]
fn test_single_fix_group_has_zero_duration() {
    let fixes = classified(&[segmented("a", 1, 0, 2000.0)]);
    let report = summarize_trips(&fixes, DistanceMode::Planar);
    let s = &report.summaries[0];
    assert_eq!(s.duration_hours, 0.0);
    assert_eq!(s.n_locs, 1);
    assert_eq!(s.trip_type, TripType::NonTrip);
}

#[test]
fn test_rows_per_individual_and_trip() {
    let fixes = classified(&[
        segmented("a", -1, 0, 10.0),
        segmented("a", 1, 1, 2000.0),
        segmented("a", 1, 2, 4000.0),
        segmented("a", 1, 3, 2000.0),
        segmented("a", -1, 4, 10.0),
        segmented("b", 1, 0, 2000.0),
        segmented("b", 1, 1, 4000.0),
        segmented("b", 1, 2, 2000.0),
    ]);
    let report = summarize_trips(&fixes, DistanceMode::Planar);
    assert_eq!(report.summaries.len(), 3);
    assert_eq!(report.find("a", TripId::NON_TRIP).unwrap().n_locs, 2);
    assert_eq!(report.find("b", TripId(1)).unwrap().trip_type, TripType::Complete);
}

#[test]
fn test_heterogeneous_trip_type_is_reported() {
    let mut fixes = classified(&[
        segmented("a", 1, 0, 2000.0),
        segmented("a", 1, 1, 4000.0),
        segmented("a", 1, 2, 2000.0),
        segmented("a", 2, 3, 2000.0),
        segmented("a", 2, 4, 4000.0),
        segmented("a", 2, 5, 2000.0),
    ]);
    fixes[1].trip_type = TripType::Gappy;

    let report = summarize_trips(&fixes, DistanceMode::Planar);
    assert_eq!(report.summaries.len(), 1);
    assert_eq!(report.summaries[0].trip_id, TripId(2));
    assert!(matches!(
        &report.issues[..],
        [TripError::HeterogeneousTripType { trip_id: TripId(1), types, .. }] if types.len() == 2
    ));
}

#[test]
fn test_interpolated_summary_keeps_raw_count() {
    let raw = classified(&[
        segmented("a", 1, 0, 2000.0),
        segmented("a", 1, 3, 25_000.0),
        segmented("a", 1, 6, 3000.0),
    ]);
    let interp: Vec<InterpolatedFix> = (0..=6)
        .map(|h| interpolated("a", 1, h, 2000.0 + 1000.0 * h as f64, TripType::Complete))
        .collect();

    let report = summarize_interpolated(&interp, &raw, DistanceMode::Planar);
    assert!(report.is_clean());
    let s = &report.summaries[0];
    assert_eq!(s.n_locs, 7);
    assert_eq!(s.raw_n_locs, Some(3));
    assert_eq!(s.duration_hours, 6.0);
}

#[test]
fn test_missing_raw_count_excludes_row() {
    let raw = classified(&[
        segmented("a", 1, 0, 2000.0),
        segmented("a", 1, 1, 4000.0),
        segmented("a", 1, 2, 2000.0),
    ]);
    let interp = vec![
        interpolated("a", 1, 0, 2000.0, TripType::Complete),
        interpolated("a", 1, 1, 3000.0, TripType::Complete),
        interpolated("a", 7, 5, 2000.0, TripType::Complete),
        interpolated("a", 7, 6, 3000.0, TripType::Complete),
    ];

    let report = summarize_interpolated(&interp, &raw, DistanceMode::Planar);
    assert_eq!(report.summaries.len(), 1);
    assert_eq!(
        report.issues,
        vec![TripError::MissingRawCount {
            individual_id: "a".to_string(),
            trip_id: TripId(7),
        }]
    );
}
