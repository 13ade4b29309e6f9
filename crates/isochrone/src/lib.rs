//! Isochrone estimation by per-bearing binary search against a travel-time oracle.
//!
//! Layout
//! - `geodesy`: spherical destination point, bearing, and distance.
//! - `engine`: per-spoke radius brackets and the convergence state machine.
//! - `orchestrator`: the round loop (`solve`).
//! - `sort`: angular ordering of the contour.
//! - `oracle`, `location`: collaborator traits and the address/coordinate input.
//! - `provider`: Google Maps geocoder and Distance Matrix adapters.

pub mod engine;
pub mod error;
pub mod geodesy;
pub mod location;
pub mod oracle;
pub mod orchestrator;
pub mod provider;
pub mod sort;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use engine::IsochroneCfg;
pub use error::{IsochroneError, ProviderError};
pub use geodesy::GeoPoint;
pub use location::Location;
pub use orchestrator::{solve, Isochrone, IsochroneRequest};

/// Common exports for callers.
pub mod prelude {
    pub use crate::engine::{ConvergenceEngine, IsochroneCfg, Progress, SpokeState, SpokeStatus};
    pub use crate::error::{IsochroneError, ProviderError};
    pub use crate::geodesy::{bearing, destination_point, distance_miles, GeoPoint};
    pub use crate::location::Location;
    pub use crate::oracle::{FixedPause, Geocoder, NoPause, Pause, TravelTime, TravelTimeOracle};
    pub use crate::orchestrator::{solve, Isochrone, IsochroneRequest, SpokeSummary};
    pub use crate::sort::sort_points;
}
