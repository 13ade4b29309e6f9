//! Google Maps adapters for the geocoder and travel-time oracle seams.
//!
//! ```no_run
//! use std::path::Path;
//! use isochrone::provider::{AccessType, Credentials, GoogleMaps, ReqwestClient};
//!
//! let creds = Credentials::load_from_dir(Path::new("config"), AccessType::Personal)?;
//! let maps = GoogleMaps::new(ReqwestClient::new()?, creds)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod credentials;
mod google;
mod http;
mod signing;

pub use credentials::{AccessType, ConfigError, Credentials, CREDENTIALS_FILE};
pub use google::GoogleMaps;
pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use signing::UrlSigner;
