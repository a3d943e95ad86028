//! Captured HTTP responses.
//!
//! A `CapturedResponse` is the unit stored in a cache generation and the unit
//! returned by the interceptor. Bodies are `Bytes`, so handing a copy to the
//! store and another to the caller is an explicit `clone()` that shares the
//! buffer rather than re-reading it.

use bytes::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status text of the synthetic offline response.
pub const FALLBACK_STATUS_TEXT: &str = "Service Unavailable";

/// Body of the synthetic offline response.
pub const FALLBACK_BODY: &str = "Offline mode - resource unavailable";

/// How the response relates to the requesting origin.
///
/// Mirrors the fetch response types: `basic` for same-origin responses,
/// `cors` for readable cross-origin responses, `opaque` for unreadable
/// cross-origin responses and `error` for network errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Basic,
    Cors,
    Opaque,
    Error,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Cors => "cors",
            ResponseKind::Opaque => "opaque",
            ResponseKind::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(ResponseKind::Basic),
            "cors" => Some(ResponseKind::Cors),
            "opaque" => Some(ResponseKind::Opaque),
            "error" => Some(ResponseKind::Error),
            _ => None,
        }
    }
}

/// Status, headers and body of a response, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    pub status: u16,
    pub status_text: String,
    /// Header pairs with lowercased names, in received order.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub kind: ResponseKind,
}

impl CapturedResponse {
    /// Build a response from its parts, lowercasing header names.
    pub fn new(
        status: u16, status_text: impl Into<String>, headers: Vec<(String, String)>, body: impl Into<Bytes>,
        kind: ResponseKind,
    ) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self { status, status_text: status_text.into(), headers, body: body.into(), kind }
    }

    /// The synthetic response served when neither cache nor network can answer.
    pub fn service_unavailable() -> Self {
        Self::new(
            503,
            FALLBACK_STATUS_TEXT,
            vec![("content-type".to_string(), "text/plain".to_string())],
            Bytes::from_static(FALLBACK_BODY.as_bytes()),
            ResponseKind::Basic,
        )
    }

    /// Status in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Whether this response may be written to a cache generation.
    ///
    /// Partial content is a success status but only a slice of the resource,
    /// so it is never stored. Neither are `error` or `opaque` responses.
    pub fn is_cacheable(&self) -> bool {
        self.is_success() && self.status != 206 && !matches!(self.kind, ResponseKind::Error | ResponseKind::Opaque)
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body as UTF-8 text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}
