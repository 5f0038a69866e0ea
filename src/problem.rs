//! Problem-detail responses (RFC 7807).

use crate::config::AdapterSettings;
use crate::error::AdapterError;
use crate::http::HttpResponse;
use crate::logger::Logger;
use crate::request::NormalizedRequest;
use crate::violations::LocatedViolation;
use serde::Serialize;

pub const PROBLEM_JSON: &str = "application/problem+json";

/// Problem-detail body.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Vec<LocatedViolation>>,
}

impl ProblemDetail {
    pub fn from_error(error: &AdapterError, type_base: Option<&str>) -> Self {
        let kind = match type_base {
            Some(base) => format!("{}#{}", base.trim_end_matches('#'), error.code()),
            None => error.code().to_string(),
        };
        Self {
            kind,
            title: error.title().to_string(),
            status: error.status(),
            detail: error.to_string(),
            validation: error.violations().map(<[LocatedViolation]>::to_vec),
        }
    }
}

/// Turn any failure into a problem-detail response.
///
/// The failure is logged together with the request before translation.
/// This never fails.
pub fn translate(
    error: &AdapterError,
    request: Option<&NormalizedRequest>,
    settings: &AdapterSettings,
    logger: &dyn Logger,
) -> HttpResponse {
    logger.failure(error, request);

    let problem = ProblemDetail::from_error(error, settings.problem_type_base.as_deref());
    let mut response = HttpResponse::new(problem.status);

    if let Some(headers) = error.headers() {
        for (name, value) in headers.iter() {
            response.headers.append(name, value);
        }
    }
    response.headers.set("content-type", PROBLEM_JSON);
    response.body = Some(serde_json::to_string(&problem).unwrap_or_else(|_| {
        format!(
            r#"{{"type":"UNKNOWN","title":"Unexpected error","status":{}}}"#,
            problem.status
        )
    }));
    response
}
