//! CORS handling.

use crate::http::{HeaderMap, HttpResponse};

pub const ALLOWED_METHODS: &str = "GET,DELETE,HEAD,PATCH,POST,PUT,OPTIONS";

/// Whether a request is a CORS preflight.
pub fn is_preflight(method: Option<&str>, headers: &HeaderMap) -> bool {
    method.is_some_and(|m| m.trim().eq_ignore_ascii_case("options"))
        && headers.contains("origin")
        && headers.contains("access-control-request-method")
}

/// Answer a preflight without involving the engine.
pub fn preflight_response(request_headers: &HeaderMap) -> HttpResponse {
    let mut response = HttpResponse::new(204);
    response.headers.set(
        "access-control-allow-origin",
        request_headers.get("origin").unwrap_or("*"),
    );
    response.headers.set(
        "access-control-allow-headers",
        request_headers
            .get("access-control-request-headers")
            .unwrap_or("*"),
    );
    response
        .headers
        .set("access-control-allow-methods", ALLOWED_METHODS);
    response
        .headers
        .set("access-control-allow-credentials", "true");
    response.headers.set("access-control-expose-headers", "*");
    response
}

/// Add CORS headers the response does not already carry.
pub fn decorate(response: &mut HttpResponse, request_headers: &HeaderMap) {
    let origin = request_headers.get("origin").unwrap_or("*");
    for (name, value) in [
        ("access-control-allow-origin", origin),
        ("access-control-allow-headers", "*"),
        ("access-control-allow-credentials", "true"),
        ("access-control-expose-headers", "*"),
    ] {
        if !response.headers.contains(name) {
            response.headers.append(name, value);
        }
    }
}
