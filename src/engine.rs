//! The mock engine seam.
//!
//! The engine matches a normalized request against an API description,
//! produces a response and reports validation results. It lives outside this
//! crate; the adapter only drives it.

use crate::config::MockConfig;
use crate::http::HeaderMap;
use crate::request::NormalizedRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Specification-driven mock engine.
#[async_trait]
pub trait MockEngine: Send + Sync {
    /// One operation of the loaded API description.
    type Operation: Send + Sync;

    /// Produce a mocked response for `request`.
    async fn invoke(
        &self,
        request: &NormalizedRequest,
        operations: &[Self::Operation],
        config: &MockConfig,
    ) -> Result<EngineOutput, EngineFailure>;
}

/// Result of a successful engine invocation.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub status_code: u16,
    pub headers: HeaderMap,
    /// Response body; strings are emitted as-is by text and XML codecs
    pub body: Option<serde_json::Value>,
    pub validations: Validations,
}

/// Violations found while validating the request and the response.
#[derive(Debug, Clone, Default)]
pub struct Validations {
    pub input: Vec<Violation>,
    pub output: Vec<Violation>,
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        };
        f.write_str(name)
    }
}

/// A single contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Path inside the request or response, e.g. `["body", "name"]`
    pub path: Vec<String>,
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: &[&str], severity: Severity, code: &str, message: &str) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
            severity,
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

/// Failure reported by the engine.
#[derive(Debug, Clone, Default, Error)]
#[error("{message}")]
pub struct EngineFailure {
    pub message: String,
    /// Short machine code, e.g. `NO_PATH_MATCHED`
    pub code: Option<String>,
    pub title: Option<String>,
    pub status: Option<u16>,
    /// Headers to send along with the problem detail
    pub headers: HeaderMap,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }
}
