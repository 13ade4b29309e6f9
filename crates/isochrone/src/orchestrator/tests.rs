//! Scenario tests against synthetic travel-time fields.

use super::*;
use crate::geodesy::{bearing, bearing_delta, distance_miles};
use crate::oracle::{NoPause, TravelTime};
use std::cell::Cell;

const CHICAGO: GeoPoint = GeoPoint::new(41.8781, -87.6298);

/// Oracle whose duration is `minutes_per_mile × crow-flies distance`, labelling
/// each destination by its exact coordinates.
struct SpeedField {
    minutes_per_mile: f64,
    calls: Cell<usize>,
    /// `(round, spoke)` answered with a per-element failure.
    fail_at: Option<(usize, usize)>,
}

impl SpeedField {
    fn new(minutes_per_mile: f64) -> Self {
        Self {
            minutes_per_mile,
            calls: Cell::new(0),
            fail_at: None,
        }
    }
}

fn coordinate(loc: &Location) -> GeoPoint {
    match loc {
        Location::Coordinate(p) => *p,
        Location::Address(a) => panic!("unexpected address destination {a}"),
    }
}

impl TravelTimeOracle for SpeedField {
    fn travel_times(
        &self,
        origin: GeoPoint,
        destinations: &[Location],
    ) -> Result<Vec<TravelTime>, ProviderError> {
        let round = self.calls.get() + 1;
        self.calls.set(round);
        Ok(destinations
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let p = coordinate(d);
                let minutes = if self.fail_at == Some((round, i)) {
                    None
                } else {
                    Some(distance_miles(origin, p) * self.minutes_per_mile)
                };
                TravelTime::new(p.to_string(), minutes)
            })
            .collect())
    }
}

/// Always `minutes`, with a fresh label every element so nothing freezes.
struct ConstantField {
    minutes: f64,
    calls: Cell<usize>,
    labels: Cell<usize>,
}

impl TravelTimeOracle for ConstantField {
    fn travel_times(
        &self,
        _origin: GeoPoint,
        destinations: &[Location],
    ) -> Result<Vec<TravelTime>, ProviderError> {
        self.calls.set(self.calls.get() + 1);
        Ok(destinations
            .iter()
            .map(|_| {
                let n = self.labels.get();
                self.labels.set(n + 1);
                TravelTime::new(format!("probe-{n}"), Some(self.minutes))
            })
            .collect())
    }
}

/// Parses `"lat,lng"` labels; anything else resolves to `fallback`.
struct LabelGeocoder {
    fallback: GeoPoint,
    calls: Cell<usize>,
}

impl LabelGeocoder {
    fn new(fallback: GeoPoint) -> Self {
        Self {
            fallback,
            calls: Cell::new(0),
        }
    }
}

impl Geocoder for LabelGeocoder {
    fn resolve(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        self.calls.set(self.calls.get() + 1);
        if address.trim().is_empty() {
            return Err(ProviderError::EmptyAddress);
        }
        match address.parse::<Location>() {
            Ok(Location::Coordinate(p)) => Ok(p),
            _ => Ok(self.fallback),
        }
    }
}

#[derive(Default)]
struct CountingPause(Cell<usize>);

impl Pause for CountingPause {
    fn pause(&self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn chicago_four_spokes_at_fifteen_mph() {
    let cfg = IsochroneCfg::new(15.0).with_spokes(4);
    let oracle = SpeedField::new(4.0);
    let geocoder = LabelGeocoder::new(CHICAGO);
    let iso = solve(
        &Location::Coordinate(CHICAGO),
        cfg,
        &geocoder,
        &oracle,
        &NoPause,
    )
    .unwrap();

    assert_eq!(iso.origin, CHICAGO);
    assert_eq!(iso.points.len(), 4);
    assert!(iso.rounds <= 30);
    assert_eq!(oracle.calls.get(), iso.rounds);
    for s in &iso.spokes {
        assert!(
            (s.radius_miles - 3.75).abs() <= 0.1 / 4.0 + 1e-9,
            "radius {}",
            s.radius_miles
        );
        assert!((s.minutes - 15.0).abs() <= 0.1);
    }
    let expected = [0.0, 90.0, 180.0, 270.0];
    for (p, want) in iso.points.iter().zip(expected) {
        let got = bearing(CHICAGO, *p);
        assert!(bearing_delta(got, want).abs() < 0.5, "got {got} want {want}");
    }
    let bearings: Vec<f64> = iso.points.iter().map(|p| bearing(CHICAGO, *p)).collect();
    assert!(bearings.windows(2).all(|w| w[0] <= w[1]), "{bearings:?}");
}

#[test]
fn twelve_spokes_default_resolution() {
    let oracle = SpeedField::new(2.0);
    let geocoder = LabelGeocoder::new(CHICAGO);
    let iso = solve(
        &Location::Coordinate(CHICAGO),
        IsochroneCfg::new(30.0),
        &geocoder,
        &oracle,
        &NoPause,
    )
    .unwrap();
    assert_eq!(iso.points.len(), 12);
    for s in &iso.spokes {
        assert!((s.radius_miles - 15.0).abs() <= 0.05 + 1e-9);
    }
}

#[test]
fn request_solves_like_the_free_function() {
    let req = IsochroneRequest::new(CHICAGO, IsochroneCfg::new(15.0).with_spokes(6));
    let geocoder = LabelGeocoder::new(CHICAGO);
    let a = req.solve(&geocoder, &SpeedField::new(4.0), &NoPause).unwrap();
    let b = solve(&req.origin, req.cfg, &geocoder, &SpeedField::new(4.0), &NoPause).unwrap();
    assert_eq!(a, b);
}

#[test]
fn timeout_after_exactly_thirty_batches() {
    let cfg = IsochroneCfg::new(15.0).with_spokes(4);
    let oracle = ConstantField {
        minutes: 16.0,
        calls: Cell::new(0),
        labels: Cell::new(0),
    };
    let geocoder = LabelGeocoder::new(CHICAGO);
    let err = solve(
        &Location::Coordinate(CHICAGO),
        cfg,
        &geocoder,
        &oracle,
        &NoPause,
    )
    .unwrap_err();
    assert_eq!(err, IsochroneError::ConvergenceTimeout { rounds: 30 });
    assert_eq!(oracle.calls.get(), 30);
    assert_eq!(geocoder.calls.get(), 0);
}

#[test]
fn single_failed_destination_is_absorbed() {
    let cfg = IsochroneCfg::new(15.0).with_spokes(4);
    let mut oracle = SpeedField::new(4.0);
    // Round 2 probes 10 miles, already past the target, so the sentinel's
    // inward move matches what a real answer would have done.
    oracle.fail_at = Some((2, 2));
    let geocoder = LabelGeocoder::new(CHICAGO);
    let iso = solve(
        &Location::Coordinate(CHICAGO),
        cfg,
        &geocoder,
        &oracle,
        &NoPause,
    )
    .unwrap();
    assert_eq!(iso.points.len(), 4);
    for s in &iso.spokes {
        assert!((s.minutes - 15.0).abs() <= 0.1, "spoke {s:?}");
    }
}

#[test]
fn invalid_settings_make_no_external_calls() {
    let oracle = SpeedField::new(4.0);
    let geocoder = LabelGeocoder::new(CHICAGO);
    let origin = Location::Address("1 N State St Chicago IL".into());
    for cfg in [
        IsochroneCfg::new(15.0).with_spokes(2),
        IsochroneCfg::new(0.0),
        IsochroneCfg::new(15.0).with_tolerance(f64::NAN),
    ] {
        let err = solve(&origin, cfg, &geocoder, &oracle, &NoPause).unwrap_err();
        assert!(matches!(err, IsochroneError::InvalidInput(_)));
    }
    let blank = Location::Address("  ".into());
    let err = solve(&blank, IsochroneCfg::new(15.0), &geocoder, &oracle, &NoPause).unwrap_err();
    assert!(matches!(err, IsochroneError::InvalidInput(_)));
    assert_eq!(oracle.calls.get(), 0);
    assert_eq!(geocoder.calls.get(), 0);
}

#[test]
fn address_origin_is_geocoded_once_and_vertices_paced() {
    let cfg = IsochroneCfg::new(15.0).with_spokes(5);
    let oracle = SpeedField::new(4.0);
    let geocoder = LabelGeocoder::new(CHICAGO);
    let pause = CountingPause::default();
    let origin = Location::Address("Willis Tower".into());
    let iso = solve(&origin, cfg, &geocoder, &oracle, &pause).unwrap();
    assert_eq!(iso.origin, CHICAGO);
    // origin + one per vertex
    assert_eq!(geocoder.calls.get(), 1 + 5);
    assert_eq!(pause.0.get(), 4);
}

#[test]
fn batch_level_failure_aborts() {
    struct Down;
    impl TravelTimeOracle for Down {
        fn travel_times(
            &self,
            _origin: GeoPoint,
            _destinations: &[Location],
        ) -> Result<Vec<TravelTime>, ProviderError> {
            Err(ProviderError::Status {
                status: "OVER_QUERY_LIMIT".into(),
            })
        }
    }
    let geocoder = LabelGeocoder::new(CHICAGO);
    let err = solve(
        &Location::Coordinate(CHICAGO),
        IsochroneCfg::new(15.0),
        &geocoder,
        &Down,
        &NoPause,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        IsochroneError::Provider(ProviderError::Status { .. })
    ));
}

#[test]
fn short_batch_is_a_provider_error() {
    struct Short;
    impl TravelTimeOracle for Short {
        fn travel_times(
            &self,
            _origin: GeoPoint,
            destinations: &[Location],
        ) -> Result<Vec<TravelTime>, ProviderError> {
            Ok(destinations
                .iter()
                .skip(1)
                .map(|_| TravelTime::new("x", Some(1.0)))
                .collect())
        }
    }
    let geocoder = LabelGeocoder::new(CHICAGO);
    let err = solve(
        &Location::Coordinate(CHICAGO),
        IsochroneCfg::new(15.0),
        &geocoder,
        &Short,
        &NoPause,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        IsochroneError::Provider(ProviderError::InvalidResponse(_))
    ));
}

/// Two radii snapping to one provider label stop the spoke early; the
/// result converges but need not meet the tolerance.
#[test]
fn snapped_labels_can_freeze_a_spoke() {
    struct Snapping;
    impl TravelTimeOracle for Snapping {
        fn travel_times(
            &self,
            origin: GeoPoint,
            destinations: &[Location],
        ) -> Result<Vec<TravelTime>, ProviderError> {
            Ok(destinations
                .iter()
                .map(|d| {
                    let p = coordinate(d);
                    let miles = distance_miles(origin, p);
                    // Everything beyond 5 miles snaps to one interchange.
                    let label = if miles > 5.0 {
                        "Interchange".to_string()
                    } else {
                        p.to_string()
                    };
                    TravelTime::new(label, Some(miles * 0.5))
                })
                .collect())
        }
    }
    let geocoder = LabelGeocoder::new(CHICAGO);
    let cfg = IsochroneCfg::new(15.0).with_spokes(3);
    let iso = solve(
        &Location::Coordinate(CHICAGO),
        cfg,
        &geocoder,
        &Snapping,
        &NoPause,
    )
    .unwrap();
    for s in &iso.spokes {
        assert_eq!(s.address, "Interchange");
        assert!(s.minutes < 15.0 - cfg.tolerance_minutes);
    }
}
