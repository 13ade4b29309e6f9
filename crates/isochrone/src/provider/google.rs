//! Google Maps Distance Matrix oracle and Geocoding geocoder.
//!
//! # Endpoints
//!
//! - Distance Matrix: `https://maps.googleapis.com/maps/api/distancematrix/json`
//!   with `mode=driving`, `units=imperial`, `avoid=tolls|ferries`.
//! - Geocoding: `https://maps.googleapis.com/maps/api/geocode/json?address=...`
//!
//! # Authentication
//!
//! - Personal: `&key=<api key>`.
//! - Business: `&client=<client id>` plus an HMAC-SHA1 `&signature=`; distance
//!   requests also carry `departure_time=<now>` so that
//!   `duration_in_traffic` is reported and preferred.
//!
//! Query values are form-urlencoded before signing: provider labels such as
//! `"W Madison St & N State St"` or `"Main St #4"` are sent verbatim.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use super::credentials::{ConfigError, Credentials};
use super::http::HttpClient;
use super::signing::UrlSigner;
use crate::error::ProviderError;
use crate::geodesy::GeoPoint;
use crate::location::Location;
use crate::oracle::{Geocoder, TravelTime, TravelTimeOracle};

const HOST: &str = "https://maps.googleapis.com";
const MATRIX_PATH: &str = "/maps/api/distancematrix/json";
const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const MATRIX_PARAMS: [(&str, &str); 3] = [
    ("mode", "driving"),
    ("units", "imperial"),
    ("avoid", "tolls|ferries"),
];

/// Google Maps client implementing both collaborator traits.
#[derive(Debug)]
pub struct GoogleMaps<C: HttpClient> {
    http: C,
    credentials: Credentials,
    signer: Option<UrlSigner>,
    departure_time: Option<u64>,
}

impl<C: HttpClient> GoogleMaps<C> {
    /// Business credentials are validated here (the signing key is decoded once).
    pub fn new(http: C, credentials: Credentials) -> Result<Self, ConfigError> {
        let signer = match &credentials {
            Credentials::Business { crypto_key, .. } => Some(UrlSigner::new(crypto_key)?),
            Credentials::Personal { .. } => None,
        };
        Ok(Self {
            http,
            credentials,
            signer,
            departure_time: None,
        })
    }

    /// Pin `departure_time` (Unix seconds) instead of using the current time.
    pub fn with_departure_time(mut self, unix_secs: u64) -> Self {
        self.departure_time = Some(unix_secs);
        self
    }

    fn departure_time(&self) -> u64 {
        self.departure_time.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        })
    }

    /// Build `HOST + path` with `pairs` and the account's authentication
    /// parameters, every value form-urlencoded. Business URLs are signed over
    /// the encoded `path?query`.
    fn request_url(
        &self,
        path: &str,
        mut pairs: Vec<(&'static str, String)>,
        with_departure: bool,
    ) -> Result<String, ProviderError> {
        match &self.credentials {
            Credentials::Personal { api_key } => pairs.push(("key", api_key.clone())),
            Credentials::Business { client_id, .. } => {
                if with_departure {
                    pairs.push(("departure_time", self.departure_time().to_string()));
                }
                pairs.push(("client", client_id.clone()));
            }
        }
        let url = Url::parse_with_params(&format!("{HOST}{path}"), &pairs)
            .map_err(|e| ProviderError::Http(format!("invalid request URL: {e}")))?;
        Ok(match &self.signer {
            Some(signer) => signer.sign(url.as_str()),
            None => url.into(),
        })
    }

    pub(crate) fn matrix_url(
        &self,
        origin: GeoPoint,
        destinations: &[Location],
    ) -> Result<String, ProviderError> {
        let dests: Vec<String> = destinations.iter().map(query_value).collect();
        let mut pairs: Vec<(&'static str, String)> = MATRIX_PARAMS
            .iter()
            .map(|&(k, v)| (k, v.to_string()))
            .collect();
        pairs.push(("origins", query_value(&Location::Coordinate(origin))));
        pairs.push(("destinations", dests.join("|")));
        self.request_url(MATRIX_PATH, pairs, true)
    }

    pub(crate) fn geocode_url(&self, address: &str) -> Result<String, ProviderError> {
        let pairs = vec![("address", address.trim().to_string())];
        self.request_url(GEOCODE_PATH, pairs, false)
    }

    fn fetch<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, ProviderError> {
        let body = self.http.get(url)?;
        serde_json::from_slice(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("undecodable JSON: {e}")))
    }
}

/// Unencoded query value of a location: `lat,lng`, or the trimmed address.
fn query_value(loc: &Location) -> String {
    match loc {
        Location::Coordinate(p) => format!("{},{}", p.lat, p.lng),
        Location::Address(a) => a.trim().to_string(),
    }
}

fn check_status(status: &str, message: Option<&str>) -> Result<(), ProviderError> {
    if status == "OK" {
        return Ok(());
    }
    if let Some(m) = message {
        warn!(status, message = m, "provider rejected request");
    }
    Err(ProviderError::Status {
        status: status.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    destination_addresses: Vec<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    #[serde(default)]
    duration: Option<ValueField>,
    #[serde(default)]
    duration_in_traffic: Option<ValueField>,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    /// Seconds.
    value: f64,
}

impl MatrixElement {
    fn minutes(&self) -> Option<f64> {
        if self.status != "OK" {
            return None;
        }
        self.duration_in_traffic
            .as_ref()
            .or(self.duration.as_ref())
            .map(|d| d.value / 60.0)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl<C: HttpClient> TravelTimeOracle for GoogleMaps<C> {
    fn travel_times(
        &self,
        origin: GeoPoint,
        destinations: &[Location],
    ) -> Result<Vec<TravelTime>, ProviderError> {
        let url = self.matrix_url(origin, destinations)?;
        let resp: MatrixResponse = self.fetch(&url)?;
        check_status(&resp.status, resp.error_message.as_deref())?;

        let elements = resp
            .rows
            .into_iter()
            .next()
            .map(|r| r.elements)
            .unwrap_or_default();
        if elements.len() != destinations.len()
            || resp.destination_addresses.len() != destinations.len()
        {
            return Err(ProviderError::InvalidResponse(format!(
                "asked for {} destinations, got {} elements and {} addresses",
                destinations.len(),
                elements.len(),
                resp.destination_addresses.len()
            )));
        }

        let out: Vec<TravelTime> = resp
            .destination_addresses
            .into_iter()
            .zip(elements)
            .map(|(address, el)| {
                let minutes = el.minutes();
                if minutes.is_none() {
                    debug!(status = %el.status, address = %address, "element failed");
                }
                TravelTime { address, minutes }
            })
            .collect();
        Ok(out)
    }
}

impl<C: HttpClient> Geocoder for GoogleMaps<C> {
    fn resolve(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        if address.trim().is_empty() {
            return Err(ProviderError::EmptyAddress);
        }
        let resp: GeocodeResponse = self.fetch(&self.geocode_url(address)?)?;
        check_status(&resp.status, resp.error_message.as_deref())?;
        let first = resp.results.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse(format!("no geocode results for '{address}'"))
        })?;
        let loc = first.geometry.location;
        debug!(address, lat = loc.lat, lng = loc.lng, "geocoded");
        Ok(GeoPoint::new(loc.lat, loc.lng))
    }
}
