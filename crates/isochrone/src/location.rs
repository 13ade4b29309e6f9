//! Origin/destination input: either a free-form address or a coordinate pair.
//!
//! Everything downstream of the boundary works on [`GeoPoint`]; a `Location`
//! is resolved exactly once before any geodesy runs.

use std::fmt;
use std::str::FromStr;

use crate::error::{IsochroneError, Result};
use crate::geodesy::GeoPoint;
use crate::oracle::Geocoder;

/// Address string or `(lat, lng)` coordinate.
#[derive(Clone, Debug, PartialEq)]
pub enum Location {
    Address(String),
    Coordinate(GeoPoint),
}

impl Location {
    /// Resolve to a point, consulting `geocoder` only for addresses.
    pub fn resolve<G: Geocoder + ?Sized>(&self, geocoder: &G) -> Result<GeoPoint> {
        match self {
            Location::Coordinate(p) => {
                if !p.is_valid() {
                    return Err(IsochroneError::InvalidInput(format!(
                        "coordinate out of range: {p}"
                    )));
                }
                Ok(*p)
            }
            Location::Address(a) => {
                if a.trim().is_empty() {
                    return Err(IsochroneError::InvalidInput(
                        "origin cannot be blank".to_string(),
                    ));
                }
                Ok(geocoder.resolve(a)?)
            }
        }
    }
}

impl From<GeoPoint> for Location {
    fn from(p: GeoPoint) -> Self {
        Location::Coordinate(p)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Address(a) => f.write_str(a),
            Location::Coordinate(p) => write!(f, "{p}"),
        }
    }
}

/// `"lat,lng"` with two finite in-range numbers parses as a coordinate; any
/// other non-blank text is an address.
impl FromStr for Location {
    type Err = IsochroneError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IsochroneError::InvalidInput(
                "location cannot be blank".to_string(),
            ));
        }
        if let Some((a, b)) = s.split_once(',') {
            if let (Ok(lat), Ok(lng)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
                let p = GeoPoint::new(lat, lng);
                if p.is_valid() {
                    return Ok(Location::Coordinate(p));
                }
                return Err(IsochroneError::InvalidInput(format!(
                    "coordinate out of range: {s}"
                )));
            }
        }
        Ok(Location::Address(s.to_string()))
    }
}
