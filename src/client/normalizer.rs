//! Turns whatever the network layer failed with into a [`NormalizedError`].
//!
//! Each candidate location for the status and the message is an extractor.
//! Extractors are tried in order and the first one that yields a value wins.

use http::{Method, StatusCode};
use serde_json::Value;

use crate::error::NormalizedError;
use crate::utils::value::{message_from_value, sanitize, status_from_value};

pub const DEFAULT_STATUS: u16 = 500;
pub const FALLBACK_MESSAGE: &str = "Unexpected error";

/// A failure as observed at the network layer, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFailure {
    pub status_code: Option<u16>,
    pub response: Option<RawResponse>,
    /// Decoded error body, when the server sent one.
    pub data: Option<Value>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub status: Option<u16>,
    pub body: Option<Value>,
}

impl RawFailure {
    /// A non-2xx response. The body is exposed both as `data` and as the response body.
    pub fn from_response(method: &Method, url: &str, status: StatusCode, body: Option<Value>) -> Self {
        let reason = status.canonical_reason().unwrap_or("");
        RawFailure {
            status_code: Some(status.as_u16()),
            response: Some(RawResponse {
                status: Some(status.as_u16()),
                body: body.clone(),
            }),
            data: body,
            message: Some(format!("[{}] \"{}\": {} {}", method, url, status.as_u16(), reason)),
        }
    }

    /// The request never produced a usable response.
    pub fn from_transport(error: &reqwest::Error) -> Self {
        RawFailure {
            status_code: error.status().map(|s| s.as_u16()),
            message: Some(error.to_string()),
            ..Default::default()
        }
    }
}

type StatusExtractor = fn(&RawFailure) -> Option<u16>;
type MessageExtractor = fn(&RawFailure) -> Option<String>;

const STATUS_EXTRACTORS: &[StatusExtractor] = &[
    explicit_status,
    response_status,
    data_status,
    response_body_status,
];

const MESSAGE_EXTRACTORS: &[MessageExtractor] =
    &[data_message, response_body_message, top_level_message];

fn explicit_status(failure: &RawFailure) -> Option<u16> {
    failure.status_code.filter(|code| *code != 0)
}

fn response_status(failure: &RawFailure) -> Option<u16> {
    failure
        .response
        .as_ref()
        .and_then(|r| r.status)
        .filter(|code| *code != 0)
}

fn data_status(failure: &RawFailure) -> Option<u16> {
    failure.data.as_ref().and_then(status_from_value)
}

fn response_body_status(failure: &RawFailure) -> Option<u16> {
    failure
        .response
        .as_ref()
        .and_then(|r| r.body.as_ref())
        .and_then(status_from_value)
}

fn data_message(failure: &RawFailure) -> Option<String> {
    failure
        .data
        .as_ref()
        .and_then(|d| d.get("message"))
        .and_then(message_from_value)
}

fn response_body_message(failure: &RawFailure) -> Option<String> {
    failure
        .response
        .as_ref()
        .and_then(|r| r.body.as_ref())
        .and_then(|b| b.get("message"))
        .and_then(message_from_value)
}

fn top_level_message(failure: &RawFailure) -> Option<String> {
    failure
        .message
        .clone()
        .map(sanitize)
        .filter(|m| !m.is_empty())
}

/// Resolve the status and message of `failure`. Never fails.
pub fn normalize(failure: &RawFailure) -> NormalizedError {
    let status_code = STATUS_EXTRACTORS
        .iter()
        .find_map(|extract| extract(failure))
        .unwrap_or(DEFAULT_STATUS);
    let message = MESSAGE_EXTRACTORS
        .iter()
        .find_map(|extract| extract(failure))
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
    NormalizedError {
        status_code,
        message,
    }
}
