//! Angular ordering of contour vertices around the origin.

use crate::geodesy::{bearing, GeoPoint};

/// Sort `points` by ascending bearing from `origin`; ties keep input order.
///
/// Resolved addresses can drift off their nominal spoke bearing; ordering by
/// the actual bearing keeps the polygon walk monotone around the origin.
pub fn sort_points(origin: GeoPoint, points: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut keyed: Vec<(f64, GeoPoint)> = points.iter().map(|&p| (bearing(origin, p), p)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, p)| p).collect()
}
