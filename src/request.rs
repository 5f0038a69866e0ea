//! Request normalization.
//!
//! Turns a transport [`HttpRequest`] into the [`NormalizedRequest`] the mock
//! engine consumes.

use crate::http::{HeaderMap, HttpRequest};
use crate::media;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Query parameter carrying an explicit base URL for the engine.
pub const SERVER_PARAM: &str = "__server";

/// Decoded query string.
pub type Query = HashMap<String, QueryValue>;

/// Value of a query parameter.
///
/// A key seen once is a scalar, a key seen more than once is a list in
/// arrival order. Consumers rely on that distinction, so it serializes
/// untagged: `a=1` is `"1"`, `a=1&a=2` is `["1","2"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl QueryValue {
    /// First value, regardless of arity.
    pub fn first(&self) -> &str {
        match self {
            QueryValue::Single(v) => v,
            QueryValue::Multi(vs) => vs.first().map(String::as_str).unwrap_or_default(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(existing) => {
                *self = QueryValue::Multi(vec![std::mem::take(existing), value]);
            }
            QueryValue::Multi(vs) => vs.push(value),
        }
    }
}

/// Request body after content negotiation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestUrl {
    pub path: String,
    /// Base URL requested through the `__server` query parameter
    #[serde(rename = "baseUrl", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub query: Query,
}

/// Canonical request model handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRequest {
    /// Lowercased method token
    pub method: String,
    pub url: RequestUrl,
    /// Lowercased header names; repeated headers are joined with `", "`
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
}

/// The request body could not be decoded.
#[derive(Debug, Error)]
#[error("Invalid JSON body: {0}")]
pub struct InvalidBody(#[from] pub serde_json::Error);

/// Normalize a transport request.
pub fn normalize(request: &HttpRequest) -> Result<NormalizedRequest, InvalidBody> {
    let method = request
        .method
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("get")
        .to_ascii_lowercase();

    let (path, query_string) = split_target(&request.url);
    let query = parse_query(query_string);
    // The override stays in `query` as well.
    let base_url = query.get(SERVER_PARAM).map(|v| v.first().to_string());

    Ok(NormalizedRequest {
        method,
        url: RequestUrl {
            path: path.to_string(),
            base_url,
            query,
        },
        headers: flatten_headers(&request.headers),
        body: read_body(&request.headers, request.body.as_deref())?,
    })
}

/// Split a request target into path and query, dropping any fragment.
fn split_target(target: &str) -> (&str, &str) {
    let target = target.split('#').next().unwrap_or_default();
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let path = if path.is_empty() { "/" } else { path };
    (path, query)
}

/// Parse a query string into a multimap.
pub fn parse_query(query: &str) -> Query {
    let mut params = Query::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match params.get_mut(key.as_ref()) {
            Some(existing) => existing.push(value.into_owned()),
            None => {
                params.insert(key.into_owned(), QueryValue::Single(value.into_owned()));
            }
        }
    }
    params
}

fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers.iter() {
        flat.entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    flat
}

fn read_body(headers: &HeaderMap, body: Option<&[u8]>) -> Result<Option<RequestBody>, InvalidBody> {
    let content_length = headers.get("content-length").map(str::trim);
    if content_length == Some("0") {
        return Ok(None);
    }
    if content_length.is_none() && !headers.contains("transfer-encoding") {
        return Ok(None);
    }

    let bytes = body.unwrap_or_default();
    let is_json = headers.get("content-type").is_some_and(media::is_json);
    if is_json {
        let value = serde_json::from_slice(bytes)?;
        return Ok(Some(RequestBody::Json(value)));
    }
    Ok(Some(RequestBody::Text(String::from_utf8_lossy(bytes).into_owned())))
}
