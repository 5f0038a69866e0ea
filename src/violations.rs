//! Violation aggregation and reporting.

use crate::engine::{Severity, Validations, Violation};
use crate::logger::Logger;
use serde::Serialize;
use tracing::Level;

/// Upper bound for the encoded violations header: 8 KiB minus a margin for
/// the header name and the rest of the header block.
pub const MAX_HEADER_LENGTH: usize = 8 * 1024 - 100;

/// Prefix marking a truncated violations header.
pub const TRUNCATED_PREFIX: &str = "Too many violations! ";

/// A violation tagged with where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedViolation {
    /// `request` or `response`, followed by the violation path
    pub location: Vec<String>,
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl LocatedViolation {
    fn new(prefix: &str, violation: &Violation) -> Self {
        let mut location = Vec::with_capacity(violation.path.len() + 1);
        location.push(prefix.to_string());
        location.extend(violation.path.iter().cloned());
        Self {
            location,
            severity: violation.severity,
            code: violation.code.clone(),
            message: violation.message.clone(),
        }
    }
}

/// Input violations (prefixed `request`) followed by output violations
/// (prefixed `response`).
pub fn aggregate(validations: &Validations) -> Vec<LocatedViolation> {
    validations
        .input
        .iter()
        .map(|v| LocatedViolation::new("request", v))
        .chain(
            validations
                .output
                .iter()
                .map(|v| LocatedViolation::new("response", v)),
        )
        .collect()
}

/// Error-severity output violations, the ones strict mode rejects.
pub fn output_errors(validations: &Validations) -> Vec<LocatedViolation> {
    validations
        .output
        .iter()
        .filter(|v| v.severity == Severity::Error)
        .map(|v| LocatedViolation::new("response", v))
        .collect()
}

pub fn level_for(severity: Severity) -> Level {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARN,
        Severity::Info => Level::INFO,
    }
}

/// Log every violation on its own line at its own severity.
pub fn log_all(logger: &dyn Logger, violations: &[LocatedViolation]) {
    for violation in violations {
        logger.log(
            level_for(violation.severity),
            &format!(
                "Violation: {} {}",
                violation.location.join("."),
                violation.message
            ),
        );
    }
}

/// Encode violations for the diagnostics header.
///
/// The result never exceeds [`MAX_HEADER_LENGTH`] bytes; an oversized
/// encoding is cut and marked with [`TRUNCATED_PREFIX`].
pub fn encode_header(violations: &[LocatedViolation]) -> String {
    let encoded = serde_json::to_string(violations).unwrap_or_else(|_| "[]".to_string());
    if encoded.len() <= MAX_HEADER_LENGTH {
        return encoded;
    }

    let mut cut = MAX_HEADER_LENGTH - TRUNCATED_PREFIX.len();
    while !encoded.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", TRUNCATED_PREFIX, &encoded[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLogger {
        lines: Mutex<Vec<(Level, String)>>,
    }

    impl Logger for RecordingLogger {
        fn log(&self, level: Level, message: &str) {
            self.lines.lock().unwrap().push((level, message.to_string()));
        }
    }

    fn validations() -> Validations {
        Validations {
            input: vec![Violation::new(
                &["query", "limit"],
                Severity::Warning,
                "type",
                "must be integer",
            )],
            output: vec![
                Violation::new(&["body", "id"], Severity::Error, "required", "is required"),
                Violation::new(&["header"], Severity::Info, "deprecated", "header is deprecated"),
            ],
        }
    }

    #[test]
    fn test_aggregate_orders_input_before_output() {
        let all = aggregate(&validations());
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].location, vec!["request", "query", "limit"]);
        assert_eq!(all[1].location, vec!["response", "body", "id"]);
        assert_eq!(all[2].location, vec!["response", "header"]);
    }

    #[test]
    fn test_output_errors() {
        let errors = output_errors(&validations());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "required");
    }

    #[test]
    fn test_log_all_maps_severity() {
        let logger = RecordingLogger::default();
        log_all(&logger, &aggregate(&validations()));

        let lines = logger.lines.lock().unwrap();
        assert_eq!(
            *lines,
            vec![
                (Level::WARN, "Violation: request.query.limit must be integer".to_string()),
                (Level::ERROR, "Violation: response.body.id is required".to_string()),
                (Level::INFO, "Violation: response.header header is deprecated".to_string()),
            ]
        );
    }

    #[test]
    fn test_encode_small_list() {
        let encoded = encode_header(&aggregate(&validations()));
        let parsed: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed[0]["location"], serde_json::json!(["request", "query", "limit"]));
        assert_eq!(parsed[1]["severity"], "Error");
    }

    #[test]
    fn test_encode_truncates_large_list() {
        let many: Vec<_> = (0..500)
            .map(|i| {
                LocatedViolation::new(
                    "response",
                    &Violation::new(&["body", "items"], Severity::Error, "type", &format!("item {i} is wrong")),
                )
            })
            .collect();
        assert!(serde_json::to_string(&many).unwrap().len() > MAX_HEADER_LENGTH);

        let encoded = encode_header(&many);
        assert!(encoded.starts_with(TRUNCATED_PREFIX));
        assert!(encoded.len() <= MAX_HEADER_LENGTH);
    }

    #[test]
    fn test_encode_truncates_on_char_boundary() {
        let many: Vec<_> = (0..300)
            .map(|_| {
                LocatedViolation::new(
                    "request",
                    &Violation::new(&["body"], Severity::Warning, "format", "ünïcödé mëssägé"),
                )
            })
            .collect();
        let encoded = encode_header(&many);
        assert!(encoded.starts_with(TRUNCATED_PREFIX));
        assert!(encoded.len() <= MAX_HEADER_LENGTH);
    }
}
