//! Google Maps credentials from an ini file (`google_maps.cfg`).
//!
//! Personal accounts:
//!
//! ```ini
//! [api]
//! api_number=<api key>
//! ```
//!
//! Business (Maps for Work) accounts, which also get traffic-aware durations:
//!
//! ```ini
//! [api]
//! client_id=<client id>
//! crypto_key=<url-safe base64 signing key>
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

/// Conventional file name inside the config directory.
pub const CREDENTIALS_FILE: &str = "google_maps.cfg";
const SECTION: &str = "api";

/// Credential file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the file
    #[error("failed to read credentials file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// A required key is absent
    #[error("missing [{section}] {key} in {path}")]
    MissingKey {
        path: PathBuf,
        section: String,
        key: String,
    },

    /// Access type other than personal/business
    #[error("access type must be 'personal' or 'business', got '{0}'")]
    InvalidAccessType(String),

    /// Signing key is not valid url-safe base64
    #[error("invalid crypto_key: {0}")]
    InvalidKey(String),
}

/// Which kind of Google account signs the requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessType {
    #[default]
    Personal,
    Business,
}

impl FromStr for AccessType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(AccessType::Personal),
            "business" => Ok(AccessType::Business),
            other => Err(ConfigError::InvalidAccessType(other.to_string())),
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessType::Personal => "personal",
            AccessType::Business => "business",
        })
    }
}

/// Resolved credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Personal { api_key: String },
    Business { client_id: String, crypto_key: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Personal { .. } => f.write_str("Credentials::Personal { .. }"),
            Credentials::Business { client_id, .. } => f
                .debug_struct("Credentials::Business")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    pub fn access_type(&self) -> AccessType {
        match self {
            Credentials::Personal { .. } => AccessType::Personal,
            Credentials::Business { .. } => AccessType::Business,
        }
    }

    /// Load the keys needed for `access` from the ini file at `path`.
    pub fn load_from(path: &Path, access: AccessType) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini, path, access)
    }

    /// Load from `<dir>/google_maps.cfg`.
    pub fn load_from_dir(dir: &Path, access: AccessType) -> Result<Self, ConfigError> {
        Self::load_from(&dir.join(CREDENTIALS_FILE), access)
    }

    fn from_ini(ini: &Ini, path: &Path, access: AccessType) -> Result<Self, ConfigError> {
        let get = |key: &str| -> Result<String, ConfigError> {
            ini.get_from(Some(SECTION), key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingKey {
                    path: path.to_path_buf(),
                    section: SECTION.to_string(),
                    key: key.to_string(),
                })
        };
        match access {
            AccessType::Personal => Ok(Credentials::Personal {
                api_key: get("api_number")?,
            }),
            AccessType::Business => {
                let client_id = get("client_id")?;
                let crypto_key = get("crypto_key")?;
                super::signing::decode_key(&crypto_key)?;
                Ok(Credentials::Business {
                    client_id,
                    crypto_key,
                })
            }
        }
    }
}
