//! Media type classification.

use regex::Regex;
use std::sync::LazyLock;

static JSON_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^application/(?:[a-z0-9!#$&^_.\-]+\+)?json$").expect("valid json media pattern")
});

static XML_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:application|text)/(?:[a-z0-9!#$&^_.\-]+\+)?xml$")
        .expect("valid xml media pattern")
});

static TEXT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^text/[a-z0-9!#$&^_.+\-]+$").expect("valid text media pattern"));

/// Media type family used to pick a body codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFamily {
    Json,
    Xml,
    Text,
}

/// Strip parameters and normalize case: `Application/JSON; charset=utf-8`
/// becomes `application/json`.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Classify a content type. JSON is checked before XML, XML before text, so
/// `text/xml` is XML.
pub fn classify(content_type: &str) -> Option<MediaFamily> {
    let essence = essence(content_type);
    if JSON_TYPE.is_match(&essence) {
        Some(MediaFamily::Json)
    } else if XML_TYPE.is_match(&essence) {
        Some(MediaFamily::Xml)
    } else if TEXT_TYPE.is_match(&essence) {
        Some(MediaFamily::Text)
    } else {
        None
    }
}

pub fn is_json(content_type: &str) -> bool {
    classify(content_type) == Some(MediaFamily::Json)
}
