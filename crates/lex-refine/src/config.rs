//! Configuration types for the refining pipeline.
//!
//! [`PipelineConfig`] tunes the cleaning stages and is built with a fluent
//! builder. [`Settings`] holds the connection details for the HTTP resource
//! source and is read from the environment.

use serde::{Deserialize, Serialize};

/// Conventional cut-off for the modified z-score.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.5;

/// Default delta degrees of freedom for the normalizer's standard deviation.
pub const DEFAULT_STD_DDOF: u8 = 1;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.example.com";
pub const DEFAULT_API_USERNAME: &str = "user";
pub const DEFAULT_API_PASSWORD: &str = "pass";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the cleaning stages.
///
/// # Example
///
/// ```rust,ignore
/// use lex_refine::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .outlier_threshold(3.0)
///     .std_ddof(0)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rows whose absolute modified z-score exceeds this value in any
    /// numeric column are dropped.
    /// Default: 3.5
    pub outlier_threshold: f64,

    /// Delta degrees of freedom for the standard deviation used by the
    /// normalizer: 1 for the sample estimator, 0 for the population one.
    /// Default: 1
    pub std_ddof: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            std_ddof: DEFAULT_STD_DDOF,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.outlier_threshold.is_finite() || self.outlier_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "outlier_threshold".to_string(),
                value: self.outlier_threshold,
            });
        }

        if self.std_ddof > 1 {
            return Err(ConfigValidationError::InvalidDdof(self.std_ddof));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be a finite number above 0.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid std ddof: {0} (must be 0 or 1)")]
    InvalidDdof(u8),

    #[error("Invalid TIMEOUT '{0}' (must be a positive integer)")]
    InvalidTimeout(String),

    #[error("No data source configured")]
    MissingSource,
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    outlier_threshold: Option<f64>,
    std_ddof: Option<u8>,
}

impl PipelineConfigBuilder {
    /// Set the modified z-score cut-off for outlier rows.
    pub fn outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = Some(threshold);
        self
    }

    /// Set the delta degrees of freedom used by the normalizer.
    pub fn std_ddof(mut self, ddof: u8) -> Self {
        self.std_ddof = Some(ddof);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            outlier_threshold: self.outlier_threshold.unwrap_or(DEFAULT_OUTLIER_THRESHOLD),
            std_ddof: self.std_ddof.unwrap_or(DEFAULT_STD_DDOF),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Connection settings for the HTTP resource source.
///
/// Read from `API_ENDPOINT`, `API_USERNAME`, `API_PASSWORD` and `TIMEOUT`
/// (seconds). Unset variables fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub api_endpoint: String,
    pub api_username: String,
    #[serde(skip_serializing, default)]
    pub api_password: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_username: DEFAULT_API_USERNAME.to_string(),
            api_password: DEFAULT_API_PASSWORD.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout_secs = match lookup("TIMEOUT") {
            Some(raw) => parse_timeout(&raw)?,
            None => defaults.timeout_secs,
        };

        Ok(Self {
            api_endpoint: lookup("API_ENDPOINT").unwrap_or(defaults.api_endpoint),
            api_username: lookup("API_USERNAME").unwrap_or(defaults.api_username),
            api_password: lookup("API_PASSWORD").unwrap_or(defaults.api_password),
            timeout_secs,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => Ok(secs.unsigned_abs()),
        _ => Err(ConfigValidationError::InvalidTimeout(raw.to_string())),
    }
}
