//! Spherical geodesy on a fixed-radius Earth.
//!
//! Purpose
//! - Project a point a given distance along an initial bearing (direct problem).
//! - Compute the initial great-circle bearing between two points.
//!
//! Model
//! - Sphere of radius `EARTH_RADIUS_MILES`; all distances are in miles.
//! - Degrees at the API boundary, radians inside.
//!
//! Code cross-refs: `orchestrator` (projection per round), `sort::sort_points`.

use serde::Serialize;
use std::fmt;

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3963.1676;

/// Geographic position `(lat, lng)` in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the usual WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Point reached from `origin` after `distance` miles on initial bearing `bearing_deg`.
///
/// Pre: `distance >= 0` (callers validate; negative distances are a bug).
/// Post: `distance == 0` returns `origin` up to rounding.
pub fn destination_point(origin: GeoPoint, bearing_deg: f64, distance: f64) -> GeoPoint {
    debug_assert!(distance >= 0.0, "negative distance {distance}");
    let delta = distance / EARTH_RADIUS_MILES;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lng1 = origin.lng.to_radians();

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lng2 = lng1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(lat2.to_degrees(), lng2.to_degrees())
}

/// Initial great-circle bearing from `from` to `to`, in degrees on `[0, 360)`.
///
/// Coincident points give `atan2(0, 0)`; the value is unspecified but finite.
pub fn bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlng = (to.lng - from.lng).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Great-circle (haversine) distance between two points, in miles.
pub fn distance_miles(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = (to.lat - from.lat).to_radians();
    let dlng = (to.lng - from.lng).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().min(1.0).asin()
}

/// Signed smallest difference `a - b` between two bearings, on `(-180, 180]`.
#[cfg(test)]
pub(crate) fn bearing_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Unit, UnitQuaternion, Vector3};
    use proptest::prelude::*;

    const CHICAGO: GeoPoint = GeoPoint::new(41.8781, -87.6298);

    fn to_unit(p: GeoPoint) -> Vector3<f64> {
        let (lat, lng) = (p.lat.to_radians(), p.lng.to_radians());
        Vector3::new(lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin())
    }

    fn from_unit(v: Vector3<f64>) -> GeoPoint {
        GeoPoint::new(v.z.asin().to_degrees(), v.y.atan2(v.x).to_degrees())
    }

    /// Independent construction: rotate the origin about the axis orthogonal to
    /// the local direction of travel.
    fn destination_by_rotation(origin: GeoPoint, bearing_deg: f64, distance: f64) -> GeoPoint {
        let p = to_unit(origin);
        let north = Vector3::z() - p * p.z;
        let north = north.normalize();
        let east = north.cross(&p);
        let theta = bearing_deg.to_radians();
        let dir = north * theta.cos() + east * theta.sin();
        let axis = Unit::new_normalize(p.cross(&dir));
        let rot = UnitQuaternion::from_axis_angle(&axis, distance / EARTH_RADIUS_MILES);
        from_unit(rot * p)
    }

    #[test]
    fn zero_distance_is_identity() {
        for b in [0.0, 45.0, 90.0, 180.0, 271.5, 359.9, 720.0, -30.0] {
            let q = destination_point(CHICAGO, b, 0.0);
            assert!((q.lat - CHICAGO.lat).abs() < 1e-12, "lat at bearing {b}");
            assert!((q.lng - CHICAGO.lng).abs() < 1e-12, "lng at bearing {b}");
        }
    }

    #[test]
    fn cardinal_projections() {
        let origin = GeoPoint::new(0.0, 0.0);
        // One degree of arc on this sphere.
        let deg = EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0;
        let n = destination_point(origin, 0.0, deg);
        assert!((n.lat - 1.0).abs() < 1e-9 && n.lng.abs() < 1e-9);
        let e = destination_point(origin, 90.0, deg);
        assert!(e.lat.abs() < 1e-9 && (e.lng - 1.0).abs() < 1e-9);
        let s = destination_point(origin, 180.0, deg);
        assert!((s.lat + 1.0).abs() < 1e-9 && s.lng.abs() < 1e-9);
        let w = destination_point(origin, 270.0, deg);
        assert!(w.lat.abs() < 1e-9 && (w.lng + 1.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_cardinal_directions() {
        let o = GeoPoint::new(10.0, 10.0);
        assert!(bearing(o, GeoPoint::new(11.0, 10.0)).abs() < 1e-9);
        assert!((bearing(o, GeoPoint::new(9.0, 10.0)) - 180.0).abs() < 1e-9);
        let east = bearing(o, GeoPoint::new(10.0, 11.0));
        assert!(east > 89.0 && east < 90.0, "east bearing {east}");
        let west = bearing(o, GeoPoint::new(10.0, 9.0));
        assert!(west > 270.0 && west < 271.0, "west bearing {west}");
    }

    #[test]
    fn bearing_just_west_of_north_stays_below_360() {
        let o = GeoPoint::new(0.0, 0.0);
        for dlng in [-1e-15, -1e-13, -1e-11] {
            let b = bearing(o, GeoPoint::new(1.0, dlng));
            assert!((0.0..360.0).contains(&b), "dlng {dlng} bearing {b}");
        }
    }

    #[test]
    fn bearing_of_coincident_points_is_finite() {
        let b = bearing(CHICAGO, CHICAGO);
        assert!(b.is_finite());
        assert!((0.0..360.0).contains(&b));
    }

    #[test]
    fn distance_round_trips_projection() {
        for (b, d) in [(0.0, 3.75), (90.0, 3.75), (200.0, 12.0), (333.0, 0.5)] {
            let q = destination_point(CHICAGO, b, d);
            assert!((distance_miles(CHICAGO, q) - d).abs() < 1e-9, "b={b} d={d}");
        }
        assert_eq!(distance_miles(CHICAGO, CHICAGO), 0.0);
    }

    #[test]
    fn bearing_delta_wraps() {
        assert!((bearing_delta(1.0, 359.0) - 2.0).abs() < 1e-12);
        assert!((bearing_delta(359.0, 1.0) + 2.0).abs() < 1e-12);
        assert!((bearing_delta(180.0, 0.0) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn point_validity() {
        assert!(CHICAGO.is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }

    proptest! {
        #[test]
        fn bearing_inverts_projection(
            lat in -70.0f64..70.0,
            lng in -179.0f64..179.0,
            b in 0.0f64..360.0,
            d in 0.01f64..20.0,
        ) {
            let origin = GeoPoint::new(lat, lng);
            let q = destination_point(origin, b, d);
            let back = bearing(origin, q);
            prop_assert!(bearing_delta(back, b).abs() < 1e-6, "b={} back={}", b, back);
        }

        #[test]
        fn projection_matches_rotation(
            lat in -80.0f64..80.0,
            lng in -170.0f64..170.0,
            b in 0.0f64..360.0,
            d in 0.0f64..500.0,
        ) {
            let origin = GeoPoint::new(lat, lng);
            let q = destination_point(origin, b, d);
            let r = destination_by_rotation(origin, b, d);
            prop_assert!((q.lat - r.lat).abs() < 1e-8);
            prop_assert!(bearing_delta(q.lng, r.lng).abs() < 1e-8);
        }
    }
}
