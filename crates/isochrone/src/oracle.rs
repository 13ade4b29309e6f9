//! Collaborator seams: geocoding, batched travel times, and courtesy pauses.
//!
//! Implementations live in [`crate::provider`] (Google Maps) and in tests
//! (synthetic fields). The orchestrator depends only on these traits.

use std::time::Duration;

use crate::error::ProviderError;
use crate::geodesy::GeoPoint;
use crate::location::Location;

/// Duration substituted when the provider fails for one destination of a batch.
pub const SENTINEL_MINUTES: f64 = 9999.0;

/// Address → coordinate resolution.
pub trait Geocoder {
    /// Resolve `address`; blank input is [`ProviderError::EmptyAddress`].
    fn resolve(&self, address: &str) -> Result<GeoPoint, ProviderError>;
}

/// One element of a batched travel-time answer.
#[derive(Clone, Debug, PartialEq)]
pub struct TravelTime {
    /// Provider-resolved label for the destination.
    pub address: String,
    /// Travel time in minutes, or `None` if the provider failed for this element.
    pub minutes: Option<f64>,
}

impl TravelTime {
    pub fn new(address: impl Into<String>, minutes: Option<f64>) -> Self {
        Self {
            address: address.into(),
            minutes,
        }
    }

    /// Minutes with per-destination failures mapped to [`SENTINEL_MINUTES`].
    #[inline]
    pub fn minutes_or_sentinel(&self) -> f64 {
        match self.minutes {
            Some(m) if m.is_finite() => m,
            _ => SENTINEL_MINUTES,
        }
    }
}

/// Batched origin → many destinations travel-time service.
pub trait TravelTimeOracle {
    /// Returns one [`TravelTime`] per destination, in the same order.
    fn travel_times(
        &self,
        origin: GeoPoint,
        destinations: &[Location],
    ) -> Result<Vec<TravelTime>, ProviderError>;
}

/// Delay strategy between successive geocoder calls.
pub trait Pause {
    fn pause(&self);
}

/// No delay; used by tests and offline runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPause;

impl Pause for NoPause {
    #[inline]
    fn pause(&self) {}
}

/// Blocking sleep of a fixed length.
#[derive(Clone, Copy, Debug)]
pub struct FixedPause(pub Duration);

impl Default for FixedPause {
    fn default() -> Self {
        Self(Duration::from_millis(100))
    }
}

impl Pause for FixedPause {
    fn pause(&self) {
        if !self.0.is_zero() {
            std::thread::sleep(self.0);
        }
    }
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn resolve(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        (**self).resolve(address)
    }
}

impl<T: TravelTimeOracle + ?Sized> TravelTimeOracle for &T {
    fn travel_times(
        &self,
        origin: GeoPoint,
        destinations: &[Location],
    ) -> Result<Vec<TravelTime>, ProviderError> {
        (**self).travel_times(origin, destinations)
    }
}
