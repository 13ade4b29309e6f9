//! HMAC-SHA1 URL signing for Google Maps business accounts.
//!
//! The signature covers `path?query` only and is appended as
//! `&signature=<url-safe base64>`.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::credentials::ConfigError;

type HmacSha1 = Hmac<Sha1>;

/// Decode a url-safe base64 signing key.
pub(crate) fn decode_key(crypto_key: &str) -> Result<Vec<u8>, ConfigError> {
    URL_SAFE
        .decode(crypto_key.trim())
        .map_err(|e| ConfigError::InvalidKey(e.to_string()))
}

/// Keyed signer; cloned per request.
#[derive(Clone)]
pub struct UrlSigner {
    mac: HmacSha1,
}

impl UrlSigner {
    pub fn new(crypto_key: &str) -> Result<Self, ConfigError> {
        let key = decode_key(crypto_key)?;
        let mac = HmacSha1::new_from_slice(&key).map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Url-safe base64 HMAC-SHA1 of `data`.
    pub fn signature(&self, data: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(data.as_bytes());
        URL_SAFE.encode(mac.finalize().into_bytes())
    }

    /// Append `&signature=` computed over the path and query of `url`.
    pub fn sign(&self, url: &str) -> String {
        let sig = self.signature(path_and_query(url));
        format!("{url}&signature={sig}")
    }
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UrlSigner { .. }")
    }
}

/// `/path?query` portion of an absolute URL.
fn path_and_query(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(0, |i| i + 3);
    match url[after_scheme..].find('/') {
        Some(i) => &url[after_scheme + i..],
        None => "",
    }
}
