//! Configuration management
//!
//! This module holds the explicit configuration handed to the router and the
//! storage backends. Values come from an optional TOML file at
//! ~/.config/backup/config.toml, overlaid with environment variables.
//!
//! PROTECTED FILE: Changes to schema_version require migration support.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Default S3 region
const DEFAULT_REGION: &str = "us-east-1";

/// S3 access key ID
pub const ENV_AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
/// S3 secret access key
pub const ENV_AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
/// S3 bucket receiving media files
pub const ENV_AWS_S3_BUCKET: &str = "AWS_S3_BUCKET";
/// S3 region
pub const ENV_AWS_REGION: &str = "AWS_REGION";
/// Endpoint of an S3-compatible service
pub const ENV_AWS_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";
/// GCS bucket receiving documents
pub const ENV_GCP_BUCKET: &str = "GCP_BUCKET";
/// Path to the service account JSON file
pub const ENV_GCP_CREDENTIALS_FILE: &str = "GCP_CREDENTIALS_FILE";
/// Fallback for [`ENV_GCP_CREDENTIALS_FILE`]
pub const ENV_GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
/// Endpoint of a GCS-compatible service, e.g. an emulator
pub const ENV_GCS_ENDPOINT_URL: &str = "GCS_ENDPOINT_URL";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Destination for media files
    #[serde(default)]
    pub s3: S3Config,

    /// Destination for documents
    #[serde(default)]
    pub gcs: GcsConfig,
}

/// Settings for the S3-compatible media store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Access key ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    /// Secret access key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Bucket name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Settings for the GCS-compatible document store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GcsConfig {
    /// Bucket name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Service account key file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,

    /// Custom endpoint, mostly useful against an emulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            access_key: None,
            secret_key: None,
            bucket: None,
            region: default_region(),
            endpoint: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            s3: S3Config::default(),
            gcs: GcsConfig::default(),
        }
    }
}

fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Config(format!("{what} is not set"))),
    }
}

fn validate_endpoint(endpoint: Option<&str>) -> Result<()> {
    if let Some(endpoint) = endpoint {
        url::Url::parse(endpoint)?;
    }
    Ok(())
}

impl S3Config {
    /// Access key and secret key, both required to open a session
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let access_key = required(&self.access_key, ENV_AWS_ACCESS_KEY_ID)?;
        let secret_key = required(&self.secret_key, ENV_AWS_SECRET_ACCESS_KEY)?;
        Ok((access_key, secret_key))
    }

    /// Bucket name, required to open a session
    pub fn bucket(&self) -> Result<&str> {
        required(&self.bucket, ENV_AWS_S3_BUCKET)
    }
}

impl GcsConfig {
    /// Bucket name, required to open a session
    pub fn bucket(&self) -> Result<&str> {
        required(&self.bucket, ENV_GCP_BUCKET)
    }

    /// Service account key file, required to open a session
    pub fn credentials_file(&self) -> Result<&PathBuf> {
        self.credentials_file
            .as_ref()
            .ok_or_else(|| Error::Config(format!("{ENV_GCP_CREDENTIALS_FILE} is not set")))
    }
}

impl Config {
    /// Overlay values from the environment
    ///
    /// `lookup` is normally `|key| std::env::var(key).ok()`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_AWS_ACCESS_KEY_ID) {
            self.s3.access_key = Some(v);
        }
        if let Some(v) = get(ENV_AWS_SECRET_ACCESS_KEY) {
            self.s3.secret_key = Some(v);
        }
        if let Some(v) = get(ENV_AWS_S3_BUCKET) {
            self.s3.bucket = Some(v);
        }
        if let Some(v) = get(ENV_AWS_REGION) {
            self.s3.region = v;
        }
        if let Some(v) = get(ENV_AWS_ENDPOINT_URL) {
            self.s3.endpoint = Some(v);
        }
        if let Some(v) = get(ENV_GCP_BUCKET) {
            self.gcs.bucket = Some(v);
        }
        if let Some(v) =
            get(ENV_GCP_CREDENTIALS_FILE).or_else(|| get(ENV_GOOGLE_APPLICATION_CREDENTIALS))
        {
            self.gcs.credentials_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_GCS_ENDPOINT_URL) {
            self.gcs.endpoint = Some(v);
        }
    }

    /// Check values that can be checked without contacting a backend
    ///
    /// Missing credentials and buckets are not checked here: they only matter
    /// once a batch for that backend needs a session.
    pub fn validate(&self) -> Result<()> {
        validate_endpoint(self.s3.endpoint.as_deref())?;
        validate_endpoint(self.gcs.endpoint.as_deref())?;
        Ok(())
    }
}

/// Configuration manager handles loading the config file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("backup").join("config.toml");
        Ok(Self {
            config_path,
            explicit: false,
        })
    }

    /// Create a ConfigManager for a path given by the user
    ///
    /// Unlike the default location, this file must exist.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            explicit: true,
        }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the default configuration file doesn't exist, returns a default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            if self.explicit {
                return Err(Error::Config(format!(
                    "Configuration file not found: {}",
                    self.config_path.display()
                )));
            }
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade backup.",
                config.schema_version, SCHEMA_VERSION
            )));
        }
        // Nothing to migrate yet; older files are read as-is.
        config.schema_version = SCHEMA_VERSION;

        Ok(config)
    }
}
