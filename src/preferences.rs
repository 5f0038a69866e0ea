//! Per-request mock preferences.
//!
//! Clients steer the mock engine with a `Prefer` header
//! (`Prefer: code=404, dynamic=true, example=missing`) or, when that header
//! is absent, with the `__code`, `__dynamic` and `__example` query
//! parameters. The header wins outright; the two sources are never mixed.

use crate::http::HeaderMap;
use crate::request::{Query, QueryValue};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

pub const PREFER_HEADER: &str = "prefer";
pub const CODE_PARAM: &str = "__code";
pub const DYNAMIC_PARAM: &str = "__dynamic";
pub const EXAMPLE_PARAM: &str = "__example";

/// Overrides requested by the client. Absent fields leave the baseline alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestPreferences {
    pub code: Option<u16>,
    pub dynamic: Option<bool>,
    pub example_key: Option<String>,
}

/// A preference value that does not satisfy its constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name} preference `{field}`: {constraint}, got {value:?}")]
pub struct PreferenceError {
    /// Where the value came from: `Prefer header` or `query`
    pub source_name: &'static str,
    pub field: &'static str,
    pub constraint: &'static str,
    pub value: String,
}

/// Raw candidate value before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Candidate {
    One(String),
    Many(Vec<String>),
}

struct Candidates {
    source_name: &'static str,
    values: HashMap<&'static str, Candidate>,
}

/// Resolve preferences from the request headers and query.
pub fn resolve(headers: &HeaderMap, query: &Query) -> Result<RequestPreferences, PreferenceError> {
    // Prefer may be split across several header lines; they form one list.
    let prefer: Vec<&str> = headers.get_all(PREFER_HEADER).collect();
    let candidates = if prefer.is_empty() {
        from_query(query)
    } else {
        from_prefer_header(&prefer.join(", "))
    };

    Ok(RequestPreferences {
        code: decode_code(&candidates)?,
        dynamic: decode_dynamic(&candidates)?,
        example_key: decode_example(&candidates)?,
    })
}

/// Split a `Prefer` header into a flat token map.
///
/// Entries are separated by `,` or `;` outside double quotes. `key=value`
/// pairs have surrounding quotes stripped from the value; bare tokens map to
/// `"true"`. Keys are lowercased, and a later occurrence of a key replaces an
/// earlier one.
pub fn parse_prefer_header(value: &str) -> HashMap<String, String> {
    split_unquoted(value)
        .into_iter()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| match token.split_once('=') {
            Some((key, value)) => (
                key.trim().to_ascii_lowercase(),
                value.trim().trim_matches('"').to_string(),
            ),
            None => (token.to_ascii_lowercase(), "true".to_string()),
        })
        .collect()
}

fn split_unquoted(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, ch) in value.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' | ';' if !in_quotes => {
                tokens.push(&value[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    tokens.push(&value[start..]);
    tokens
}

fn from_prefer_header(value: &str) -> Candidates {
    let tokens = parse_prefer_header(value);
    let mut values = HashMap::new();
    for field in ["code", "dynamic", "example"] {
        if let Some(v) = tokens.get(field) {
            values.insert(field, Candidate::One(v.clone()));
        }
    }
    Candidates {
        source_name: "Prefer header",
        values,
    }
}

fn from_query(query: &Query) -> Candidates {
    let mut values = HashMap::new();
    for (field, param) in [
        ("code", CODE_PARAM),
        ("dynamic", DYNAMIC_PARAM),
        ("example", EXAMPLE_PARAM),
    ] {
        let candidate = match query.get(param) {
            Some(QueryValue::Single(v)) => Candidate::One(v.clone()),
            Some(QueryValue::Multi(vs)) => Candidate::Many(vs.clone()),
            None => continue,
        };
        values.insert(field, candidate);
    }
    Candidates {
        source_name: "query",
        values,
    }
}

impl Candidates {
    /// Single string value for `field`, failing on repeated query params.
    fn single(&self, field: &'static str) -> Result<Option<&str>, PreferenceError> {
        match self.values.get(field) {
            None => Ok(None),
            Some(Candidate::One(v)) => Ok(Some(v.as_str())),
            Some(Candidate::Many(vs)) => Err(self.error(
                field,
                "expected a single value",
                vs.join(","),
            )),
        }
    }

    fn error(&self, field: &'static str, constraint: &'static str, value: String) -> PreferenceError {
        PreferenceError {
            source_name: self.source_name,
            field,
            constraint,
            value,
        }
    }
}

fn decode_code(candidates: &Candidates) -> Result<Option<u16>, PreferenceError> {
    let Some(raw) = candidates.single("code")? else {
        return Ok(None);
    };
    if raw.len() != 3 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(candidates.error("code", "expected exactly three digits", raw.to_string()));
    }
    let code = raw
        .bytes()
        .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));
    Ok(Some(code))
}

fn decode_dynamic(candidates: &Candidates) -> Result<Option<bool>, PreferenceError> {
    match candidates.single("dynamic")? {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(candidates.error(
            "dynamic",
            "expected \"true\" or \"false\"",
            other.to_string(),
        )),
    }
}

fn decode_example(candidates: &Candidates) -> Result<Option<String>, PreferenceError> {
    Ok(candidates.single("example")?.map(str::to_string))
}
