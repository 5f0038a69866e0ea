//! Main mock adapter implementation.

use crate::config::{AdapterConfig, MockConfig};
use crate::cors;
use crate::engine::{EngineOutput, MockEngine};
use crate::error::AdapterError;
use crate::http::{HttpRequest, HttpResponse};
use crate::logger::{Logger, TracingLogger};
use crate::preferences;
use crate::problem;
use crate::request::{self, NormalizedRequest};
use crate::serializer;
use crate::violations;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::Level;

/// Mock adapter
///
/// Drives a [`MockEngine`] from generic HTTP requests: normalizes the
/// request, applies client preferences, invokes the engine and turns its
/// output (or any failure) into an HTTP response.
pub struct MockAdapter<E: MockEngine> {
    config: Arc<AdapterConfig>,
    engine: Arc<E>,
    operations: Arc<[E::Operation]>,
    logger: Arc<dyn Logger>,
    /// Total requests handled.
    requests_total: AtomicU64,
    /// Requests answered with a problem detail.
    requests_failed: AtomicU64,
    /// Violations reported across all requests.
    violations_reported: AtomicU64,
}

impl<E: MockEngine> MockAdapter<E> {
    /// Create an adapter logging through `tracing`.
    pub fn new(config: AdapterConfig, engine: E, operations: Vec<E::Operation>) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            operations: operations.into(),
            logger: Arc::new(TracingLogger),
            requests_total: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            violations_reported: AtomicU64::new(0),
        }
    }

    /// Create from a YAML configuration string.
    pub fn from_yaml(yaml: &str, engine: E, operations: Vec<E::Operation>) -> anyhow::Result<Self> {
        let config = AdapterConfig::from_yaml(yaml)?;
        Ok(Self::new(config, engine, operations))
    }

    /// Use a host-provided logger.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Get total requests handled.
    pub fn total_requests(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    /// Get total requests answered with a problem detail.
    pub fn total_failed(&self) -> u64 {
        self.requests_failed.load(Ordering::Relaxed)
    }

    /// Get total violations reported.
    pub fn total_violations(&self) -> u64 {
        self.violations_reported.load(Ordering::Relaxed)
    }

    /// Handle one request. Always produces a response.
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        let settings = &self.config.settings;

        if settings.cors && cors::is_preflight(request.method.as_deref(), &request.headers) {
            self.logger.log(
                Level::DEBUG,
                &format!("Answering CORS preflight for {}", request.url),
            );
            return cors::preflight_response(&request.headers);
        }

        let mut normalized = None;
        let result = self.process(&request, &mut normalized).await;
        let mut response = match result {
            Ok(response) => response,
            Err(err) => {
                self.requests_failed.fetch_add(1, Ordering::Relaxed);
                problem::translate(&err, normalized.as_ref(), settings, self.logger.as_ref())
            }
        };

        if settings.cors {
            cors::decorate(&mut response, &request.headers);
        }

        self.logger.log(
            Level::DEBUG,
            &format!(
                "{} {} -> {}",
                normalized.as_ref().map_or("-", |r| r.method.as_str()),
                request.url,
                response.status
            ),
        );
        response
    }

    /// Run the pipeline up to a successful response.
    ///
    /// `normalized` is filled in as soon as normalization succeeds so the
    /// caller can log it with any later failure.
    async fn process(
        &self,
        request: &HttpRequest,
        normalized: &mut Option<NormalizedRequest>,
    ) -> Result<HttpResponse, AdapterError> {
        let normalized: &NormalizedRequest = normalized.insert(request::normalize(request)?);
        let preferences = preferences::resolve(&request.headers, &normalized.url.query)?;
        let config = self.config.mock.merge(&preferences);

        let output = self
            .engine
            .invoke(normalized, &self.operations, &config)
            .await?;

        self.synthesize(output, &config)
    }

    /// Build the transport response from engine output.
    fn synthesize(&self, output: EngineOutput, config: &MockConfig) -> Result<HttpResponse, AdapterError> {
        let settings = &self.config.settings;

        let found = violations::aggregate(&output.validations);
        violations::log_all(self.logger.as_ref(), &found);
        self.violations_reported
            .fetch_add(found.len() as u64, Ordering::Relaxed);

        if config.errors {
            let errors = violations::output_errors(&output.validations);
            if !errors.is_empty() {
                return Err(AdapterError::Violations {
                    status: settings.violations_status,
                    violations: errors,
                });
            }
        }

        if !(100..=599).contains(&output.status_code) {
            return Err(AdapterError::Unknown(format!(
                "Engine produced an invalid status code: {}",
                output.status_code
            )));
        }

        let body = serializer::serialize(output.body.as_ref(), output.headers.get("content-type"))?;

        let mut response = HttpResponse::new(output.status_code);
        response.headers = output.headers;
        if !found.is_empty() {
            response
                .headers
                .set(settings.violations_header.as_str(), violations::encode_header(&found));
        }
        response.body = body;
        Ok(response)
    }
}
