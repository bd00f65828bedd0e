//! Tests for origin module

use chrono::{TimeZone, Utc};
use tripsplit::{Location, OriginResolver, RawFix, TripError};

#[test]
fn test_single_distinct_origin_is_shared() {
    let colony = Location::new(-5.0, 56.0);
    let resolver = OriginResolver::from_candidates(vec![("a", colony), ("b", colony)]);

    assert!(!resolver.is_multi_origin());
    assert_eq!(resolver, OriginResolver::Shared(colony));
    // Individuals without their own record still resolve
    assert_eq!(resolver.resolve("zzz").unwrap(), colony);
}

#[test]
fn test_per_individual_origins() {
    let nest_a = Location::new(-5.0, 56.0);
    let nest_b = Location::new(-5.1, 56.1);
    let resolver = OriginResolver::from_candidates(vec![("a", nest_a), ("b", nest_b), ("a", nest_a)]);

    assert!(resolver.is_multi_origin());
    assert_eq!(resolver.resolve("a").unwrap(), nest_a);
    assert_eq!(resolver.resolve("b").unwrap(), nest_b);
    assert_eq!(resolver.individuals(), vec!["a", "b"]);
}

#[test]
fn test_unresolved_origin() {
    let resolver = OriginResolver::from_candidates(vec![
        ("a", Location::new(0.0, 0.0)),
        ("b", Location::new(1.0, 1.0)),
    ]);
    assert_eq!(
        resolver.resolve("c"),
        Err(TripError::UnresolvedOrigin {
            individual_id: "c".to_string()
        })
    );
}

#[test]
fn test_ambiguous_origin() {
    let resolver = OriginResolver::from_candidates(vec![
        ("a", Location::new(0.0, 0.0)),
        ("a", Location::new(1.0, 1.0)),
        ("b", Location::new(2.0, 2.0)),
    ]);
    assert!(matches!(
        resolver.resolve("a"),
        Err(TripError::AmbiguousOrigin { ref origins, .. }) if origins.len() == 2
    ));
    assert!(resolver.resolve("b").is_ok());
}

#[test]
fn test_from_raw_fixes_skips_missing_origin() {
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let nest = Location::new(3.0, 50.0);
    let fixes = vec![
        RawFix::new("a", t, 3.1, 50.1).with_origin(nest),
        RawFix::new("b", t, 3.2, 50.2),
    ];
    let resolver = OriginResolver::from_raw_fixes(&fixes);
    assert_eq!(resolver, OriginResolver::Shared(nest));
    assert_eq!(resolver.resolve("b").unwrap(), nest);
}

#[test]
fn test_no_candidates_fails() {
    let resolver = OriginResolver::from_candidates(Vec::<(String, Location)>::new());
    assert!(resolver.resolve("a").is_err());
}

#[test]
fn test_per_nest_dataset_from_many_fixes() {
    let t = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let nest = |i: usize| Location::new(-5.0 + i as f64 * 0.001, 56.0);
    let fixes: Vec<RawFix> = (0..300)
        .flat_map(|i| {
            (0..20).map(move |_| {
                RawFix::new(format!("bird-{:03}", i), t, -5.0, 56.0).with_origin(nest(i))
            })
        })
        .collect();

    let resolver = OriginResolver::from_raw_fixes(&fixes);
    assert!(resolver.is_multi_origin());
    assert_eq!(resolver.individuals().len(), 300);
    assert_eq!(resolver.resolve("bird-042").unwrap(), nest(42));
    assert_eq!(resolver.resolve("bird-299").unwrap(), nest(299));
}

#[test]
fn test_signed_zero_origins_are_one_colony() {
    let resolver = OriginResolver::from_candidates(vec![
        ("a", Location::new(0.0, 51.5)),
        ("b", Location::new(-0.0, 51.5)),
    ]);
    assert!(!resolver.is_multi_origin());
}

#[test]
fn test_try_map_locations_keeps_shape() {
    let resolver = OriginResolver::from_candidates(vec![
        ("a", Location::new(1.0, 2.0)),
        ("b", Location::new(3.0, 4.0)),
    ]);
    let doubled = resolver
        .try_map_locations(|points| {
            Ok(points
                .iter()
                .map(|p| Location::new(p.longitude * 2.0, p.latitude * 2.0))
                .collect())
        })
        .unwrap();
    assert_eq!(doubled.resolve("a").unwrap(), Location::new(2.0, 4.0));
    assert_eq!(doubled.resolve("b").unwrap(), Location::new(6.0, 8.0));

    let dropped = resolver.try_map_locations(|_| Ok(Vec::new()));
    assert!(matches!(dropped, Err(TripError::Projection { .. })));
}
