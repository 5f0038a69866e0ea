//! Errors that end a request in a problem detail.

use crate::engine::EngineFailure;
use crate::http::HeaderMap;
use crate::preferences::PreferenceError;
use crate::request::InvalidBody;
use crate::serializer::SerializationError;
use crate::violations::LocatedViolation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Invalid request preferences: {0}")]
    Preference(#[from] PreferenceError),

    #[error(transparent)]
    InvalidBody(#[from] InvalidBody),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// Strict mode rejected a response with error-severity output violations.
    #[error("Response does not satisfy the contract ({} violations)", violations.len())]
    Violations {
        status: u16,
        violations: Vec<LocatedViolation>,
    },

    #[error(transparent)]
    Engine(#[from] EngineFailure),

    /// Anything else: an engine result the adapter cannot turn into HTTP,
    /// or a host's own failure routed through [`crate::problem::translate`].
    #[error("{0}")]
    Unknown(String),
}

impl AdapterError {
    /// HTTP status for the problem detail.
    pub fn status(&self) -> u16 {
        match self {
            AdapterError::Preference(_) => 422,
            AdapterError::InvalidBody(_) => 400,
            AdapterError::Serialization(_) => 500,
            AdapterError::Violations { status, .. } => *status,
            AdapterError::Engine(failure) => failure.status.unwrap_or(500),
            AdapterError::Unknown(_) => 500,
        }
    }

    /// Machine-readable error code, used as the problem `type` fragment.
    pub fn code(&self) -> &str {
        match self {
            AdapterError::Preference(_) => "UNPROCESSABLE_ENTITY",
            AdapterError::InvalidBody(_) => "BAD_REQUEST",
            AdapterError::Serialization(err) => err.tag(),
            AdapterError::Violations { .. } => "VIOLATIONS",
            AdapterError::Engine(failure) => failure.code.as_deref().unwrap_or("ENGINE"),
            AdapterError::Unknown(_) => "UNKNOWN",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            AdapterError::Preference(_) => "Invalid request preferences",
            AdapterError::InvalidBody(_) => "Invalid request body",
            AdapterError::Serialization(_) => "Response body could not be serialized",
            AdapterError::Violations { .. } => "Request/Response not valid",
            AdapterError::Engine(failure) => failure.title.as_deref().unwrap_or("Mock engine failure"),
            AdapterError::Unknown(_) => "Unexpected error",
        }
    }

    /// Extra headers to send with the problem detail.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            AdapterError::Engine(failure) => Some(&failure.headers),
            _ => None,
        }
    }

    pub fn violations(&self) -> Option<&[LocatedViolation]> {
        match self {
            AdapterError::Violations { violations, .. } => Some(violations.as_slice()),
            _ => None,
        }
    }
}
