//! Configuration for the mock adapter.
//!
//! Holds the per-process mock baseline handed to the engine and the settings
//! that shape responses produced by the adapter itself.

use crate::preferences::RequestPreferences;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default name of the response header carrying encoded violations.
pub const DEFAULT_VIOLATIONS_HEADER: &str = "x-mock-violations";

/// Main configuration for the mock adapter.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    /// Baseline mock options, merged with request preferences per request
    #[serde(default)]
    pub mock: MockConfig,

    /// Adapter settings
    #[serde(default)]
    pub settings: AdapterSettings,
}

impl AdapterConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.mock
            .validate()
            .map_err(|e| anyhow::anyhow!("mock: {}", e))?;
        self.settings
            .validate()
            .map_err(|e| anyhow::anyhow!("settings: {}", e))?;
        Ok(())
    }
}

/// Mock options passed to the engine.
///
/// The process-wide instance is never modified; [`MockConfig::merge`]
/// produces the per-request copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockConfig {
    /// Enforce security schemes declared by the operation
    #[serde(default = "default_true")]
    pub check_security: bool,

    /// Validate incoming requests
    #[serde(default = "default_true")]
    pub validate_request: bool,

    /// Validate generated responses
    #[serde(default = "default_true")]
    pub validate_response: bool,

    /// Fail the request when the response breaks the contract
    #[serde(default)]
    pub errors: bool,

    /// Generate bodies from schemas instead of using static examples
    #[serde(default)]
    pub dynamic: bool,

    /// Preferred response status code
    #[serde(default)]
    pub code: Option<u16>,

    /// Preferred named example
    #[serde(default)]
    pub example_key: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            check_security: true,
            validate_request: true,
            validate_response: true,
            errors: false,
            dynamic: false,
            code: None,
            example_key: None,
        }
    }
}

impl MockConfig {
    /// Overlay request preferences on a copy of this configuration.
    ///
    /// Only preferences that are present override the baseline.
    pub fn merge(&self, preferences: &RequestPreferences) -> MockConfig {
        let mut merged = self.clone();
        if let Some(code) = preferences.code {
            merged.code = Some(code);
        }
        if let Some(dynamic) = preferences.dynamic {
            merged.dynamic = dynamic;
        }
        if let Some(example_key) = &preferences.example_key {
            merged.example_key = Some(example_key.clone());
        }
        merged
    }

    /// Validate the mock options.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(code) = self.code {
            validate_status(code)?;
        }
        Ok(())
    }
}

/// Adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterSettings {
    /// Response header carrying encoded violations
    #[serde(default = "default_violations_header")]
    pub violations_header: String,

    /// Status returned when strict mode rejects a response
    #[serde(default = "default_violations_status")]
    pub violations_status: u16,

    /// Answer CORS preflights and decorate responses with CORS headers
    #[serde(default = "default_true")]
    pub cors: bool,

    /// Base URI for problem-detail `type` members
    #[serde(default)]
    pub problem_type_base: Option<String>,
}

fn default_violations_header() -> String {
    DEFAULT_VIOLATIONS_HEADER.to_string()
}

fn default_violations_status() -> u16 {
    500
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            violations_header: default_violations_header(),
            violations_status: default_violations_status(),
            cors: true,
            problem_type_base: None,
        }
    }
}

impl AdapterSettings {
    /// Validate the settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.violations_header.is_empty()
            || !self
                .violations_header
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
        {
            anyhow::bail!("Invalid header name: {:?}", self.violations_header);
        }
        validate_status(self.violations_status)?;
        Ok(())
    }
}

fn validate_status(status: u16) -> anyhow::Result<()> {
    if !(100..=599).contains(&status) {
        anyhow::bail!("Invalid status code: {}", status);
    }
    Ok(())
}
