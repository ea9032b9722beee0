//! Persisted pin configuration.
//!
//! The on-disk form is a flat JSON object:
//!
//! ```json
//! {
//!   "hashes": [{"algo": "sha256", "hash": "<base64>"}],
//!   "include-subdomains": false,
//!   "max-age": 5184000,
//!   "report-only": false,
//!   "report-uri": "https://..."
//! }
//! ```
//!
//! Every key is optional on load; missing keys take the builder defaults.
//! Saving writes the full current state so a reload compiles the same header.

use std::fmt;
use std::path::Path;

use hpkp_core::{Configuration, DEFAULT_MAX_AGE_SECONDS, HeaderBuilder, PinEntry, PinError};
use serde::{Deserialize, Serialize};

// --- Document -----------------------------------------------------------

/// One persisted pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRecord {
    pub algo: String,
    /// Standard base64 once saved; hex or stripped base64 are accepted on load.
    pub hash: String,
}

/// Serialized configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PinConfigDocument {
    #[serde(default)]
    pub hashes: Vec<PinRecord>,
    #[serde(default)]
    pub include_subdomains: bool,
    #[serde(default = "default_max_age")]
    pub max_age: u64,
    #[serde(default)]
    pub report_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_uri: Option<String>,
}

fn default_max_age() -> u64 {
    DEFAULT_MAX_AGE_SECONDS
}

impl Default for PinConfigDocument {
    fn default() -> Self {
        Self::from_configuration(&Configuration::default())
    }
}

impl PinConfigDocument {
    pub fn from_configuration(config: &Configuration) -> Self {
        Self {
            hashes: config
                .pins
                .iter()
                .map(|pin| PinRecord {
                    algo: pin.algorithm().as_str().to_string(),
                    hash: pin.digest().to_string(),
                })
                .collect(),
            include_subdomains: config.include_subdomains,
            max_age: config.max_age_seconds,
            report_only: config.report_only,
            report_uri: config.report_uri.clone(),
        }
    }

    pub fn from_builder(builder: &HeaderBuilder) -> Self {
        Self::from_configuration(builder.configuration())
    }

    /// Rebuild the in-memory configuration, normalizing each stored hash.
    ///
    /// Fails on the first pin with an unsupported algorithm or undecodable hash.
    pub fn to_configuration(&self) -> Result<Configuration, ConfigError> {
        let pins = self
            .hashes
            .iter()
            .map(|record| PinEntry::new(&record.hash, &record.algo))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Configuration {
            pins,
            include_subdomains: self.include_subdomains,
            max_age_seconds: self.max_age,
            report_only: self.report_only,
            report_uri: self.report_uri.clone(),
        })
    }

    pub fn to_builder(&self) -> Result<HeaderBuilder, ConfigError> {
        Ok(HeaderBuilder::from_configuration(self.to_configuration()?))
    }
}

// --- Errors -------------------------------------------------------------

/// Error loading or saving a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration file does not exist.
    Missing { path: String },
    Io { path: String, reason: String },
    /// Document is not valid JSON or has the wrong shape.
    Parse { reason: String },
    /// A stored pin was rejected by the normalizer.
    Pin(PinError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing { path } => write!(f, "{path} does not exist"),
            ConfigError::Io { path, reason } => write!(f, "config io error on {path}: {reason}"),
            ConfigError::Parse { reason } => write!(f, "config parse error: {reason}"),
            ConfigError::Pin(err) => write!(f, "config contains invalid pin: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Pin(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PinError> for ConfigError {
    fn from(err: PinError) -> Self {
        ConfigError::Pin(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse {
            reason: err.to_string(),
        }
    }
}

// --- Load / save --------------------------------------------------------

/// Parse a JSON document into a builder.
pub fn load_from_str(json: &str) -> Result<HeaderBuilder, ConfigError> {
    let doc: PinConfigDocument = serde_json::from_str(json)?;
    doc.to_builder()
}

/// Serialize a builder's current configuration as JSON.
pub fn to_json_string(builder: &HeaderBuilder) -> Result<String, ConfigError> {
    Ok(serde_json::to_string(&PinConfigDocument::from_builder(
        builder,
    ))?)
}

/// Load a builder from a JSON file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<HeaderBuilder, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::Missing {
            path: path.display().to_string(),
        });
    }
    let json = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    load_from_str(&json)
}

/// Write a builder's configuration to a JSON file, creating parent directories.
pub fn save_to_path(builder: &HeaderBuilder, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
    }
    let json = to_json_string(builder)?;
    std::fs::write(path, json).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, err: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
