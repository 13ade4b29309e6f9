//! HTTP client abstraction for testability.

use std::time::Duration;

use tracing::{debug, trace};

use crate::error::ProviderError;

/// Blocking HTTP GET.
///
/// Providers take any implementation so tests can inject canned responses.
pub trait HttpClient {
    /// Fetch `url` and return the body; non-2xx statuses are errors.
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        (**self).get(url)
    }
}

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Real HTTP client implementation using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("isochrone/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        debug!(url = redact(url), "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ProviderError::Http(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http(format!(
                "HTTP {} from {}",
                status,
                redact(url)
            )));
        }

        let body = response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| ProviderError::Http(format!("failed to read response: {e}")))?;
        trace!(bytes = body.len(), "response");
        Ok(body)
    }
}

/// Drop credentials from a URL before it reaches logs or error messages.
pub(crate) fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let kept: Vec<String> = query
        .split('&')
        .map(|kv| match kv.split_once('=') {
            Some((k, _)) if matches!(k, "key" | "signature" | "client") => format!("{k}=***"),
            _ => kv.to_string(),
        })
        .collect();
    format!("{base}?{}", kept.join("&"))
}
