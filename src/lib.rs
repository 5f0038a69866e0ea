//! Zentinel Mock Adapter
//!
//! Hosts a specification-driven mock engine behind a plain request/response
//! interface, without a network socket. The adapter owns everything between
//! the transport and the engine.
//!
//! # Features
//!
//! - **Request Normalization**: Lowercased method, decoded query multimap,
//!   JSON or text bodies
//! - **Preferences**: `Prefer: code=404, dynamic=true, example=name` or the
//!   `__code`, `__dynamic`, `__example` query parameters
//! - **Body Serialization**: JSON, XML and text codecs picked by content type
//! - **Violation Reporting**: Request and response violations logged and
//!   encoded into a response header
//! - **Strict Mode**: Reject responses that break the contract
//! - **Problem Details**: Every failure becomes an `application/problem+json`
//!   response
//! - **CORS**: Preflights answered in place
//!
//! # Example Configuration
//!
//! ```yaml
//! mock:
//!   validate_request: true
//!   validate_response: true
//!   errors: true
//! settings:
//!   violations_header: x-mock-violations
//!   violations_status: 500
//!   cors: true
//! ```

pub mod adapter;
pub mod config;
pub mod cors;
pub mod engine;
pub mod error;
pub mod http;
pub mod logger;
pub mod media;
pub mod preferences;
pub mod problem;
pub mod request;
pub mod serializer;
pub mod violations;

pub use adapter::MockAdapter;
pub use config::{AdapterConfig, MockConfig};
pub use engine::{EngineFailure, EngineOutput, MockEngine, Severity, Validations, Violation};
pub use error::AdapterError;
pub use http::{HeaderMap, HttpRequest, HttpResponse};
pub use logger::{Logger, TracingLogger};
pub use request::NormalizedRequest;
