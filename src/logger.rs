//! Logging capability handed to the adapter at construction.
//!
//! The host owns the sink and its lifecycle; the adapter only writes to it.

use crate::error::AdapterError;
use crate::request::NormalizedRequest;
use tracing::{debug, error, info, warn, Level};

pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str);

    /// Record a request that ended in a problem detail.
    fn failure(&self, error: &AdapterError, request: Option<&NormalizedRequest>) {
        let request = request
            .and_then(|r| serde_json::to_string(r).ok())
            .unwrap_or_else(|| "<not normalized>".to_string());
        self.log(
            Level::ERROR,
            &format!("Request terminated with error: {error}; request: {request}"),
        );
    }
}

/// Default logger writing to the current `tracing` dispatcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => error!("{}", message),
            Level::WARN => warn!("{}", message),
            Level::INFO => info!("{}", message),
            _ => debug!("{}", message),
        }
    }

    fn failure(&self, err: &AdapterError, request: Option<&NormalizedRequest>) {
        match request {
            Some(request) => error!(
                error = %err,
                status = err.status(),
                method = %request.method,
                path = %request.url.path,
                request = ?request,
                "Request terminated with error"
            ),
            None => error!(
                error = %err,
                status = err.status(),
                "Request terminated with error before normalization"
            ),
        }
    }
}
