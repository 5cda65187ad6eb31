//! Response envelope and error-body parsing.
//!
//! DESIGN
//! ======
//! The admin API wraps every payload as `{ data, hasError, message, metaData }`
//! and reports failures in several shapes: a bare JSON string, `message`,
//! `error`, or `errors[0].message`. All of that is parsed here, once, so the
//! request wrapper and the endpoint modules never re-implement the chain.

use serde::{Deserialize, Deserializer};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{Page, PageMeta};
use crate::error::ApiError;

/// Messages that mean the server no longer accepts the session token.
/// Compared case-insensitively against the whole trimmed message.
pub const SESSION_INVALID_MESSAGES: [&str; 3] = ["token expired", "user logged out", "unauthorized"];

// =============================================================================
// ENVELOPE
// =============================================================================

/// Standard admin API response wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub data: Option<T>,
    /// Only a literal `true` counts; `null` or a missing flag is success.
    #[serde(default, deserialize_with = "error_flag")]
    pub has_error: bool,
    /// Non-string messages are rendered as JSON text.
    #[serde(default, deserialize_with = "lenient_message")]
    pub message: Option<String>,
    #[serde(default)]
    pub meta_data: Option<Value>,
}

impl<T> Envelope<T> {
    /// Envelope for a success response that carried no body.
    #[must_use]
    pub fn empty(message: &str) -> Self {
        Self { data: None, has_error: false, message: Some(message.to_owned()), meta_data: None }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// # Errors
    ///
    /// Returns `InvalidResponse` when the envelope has no `data`.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.data.ok_or_else(|| ApiError::InvalidResponse { detail: "response has no data".into() })
    }

    /// Decode `metaData` into `M`. Absent metadata is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` when `metaData` has an unexpected shape.
    pub fn meta<M: DeserializeOwned>(&self) -> Result<Option<M>, ApiError> {
        match &self.meta_data {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ApiError::InvalidResponse { detail: format!("metaData: {e}") }),
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// Split a list envelope into its items and pagination metadata.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` when `data` is missing or `metaData` is malformed.
    pub fn into_page(self) -> Result<Page<T>, ApiError> {
        let meta = self.meta::<PageMeta>()?;
        let items = self.into_data()?;
        Ok(Page { items, meta })
    }
}

// =============================================================================
// OPERATION FALLBACKS
// =============================================================================

/// What an endpoint does, for per-status fallback messages when the server
/// gives no usable error text.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    /// Verb phrase, e.g. `"view company employees"`.
    pub action: &'static str,
    /// Capitalized noun for 404s, e.g. `"Company"`.
    pub resource: &'static str,
    /// Status-specific messages that replace the defaults.
    pub overrides: &'static [(u16, &'static str)],
}

impl Operation {
    pub const GENERIC: Self = Self::new("complete the request", "Resource");

    #[must_use]
    pub const fn new(action: &'static str, resource: &'static str) -> Self {
        Self { action, resource, overrides: &[] }
    }

    #[must_use]
    pub const fn with_overrides(mut self, overrides: &'static [(u16, &'static str)]) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub fn fallback_message(&self, status: u16) -> String {
        if let Some((_, message)) = self.overrides.iter().find(|(code, _)| *code == status) {
            return (*message).to_string();
        }
        match status {
            400 => "Invalid request. Please check the submitted data.".to_string(),
            401 => "Unauthorized. Please verify your admin token.".to_string(),
            403 => format!("Access denied. You do not have permission to {}.", self.action),
            404 => format!("{} not found.", self.resource),
            422 => "Validation error. Please check the submitted data.".to_string(),
            429 => "Too many attempts. Please wait and try again.".to_string(),
            500 => "Server error. Please try again later.".to_string(),
            _ => format!("Failed to {} with status {status}.", self.action),
        }
    }
}

// =============================================================================
// ERROR MESSAGE EXTRACTION
// =============================================================================

/// Best error message in a parsed JSON body: the body itself when it is a
/// string, then `message`, `error`, and `errors[0].message`.
#[must_use]
pub fn message_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Object(map) => map
            .get("message")
            .and_then(display_value)
            .or_else(|| map.get("error").and_then(display_value))
            .or_else(|| {
                map.get("errors")
                    .and_then(Value::as_array)
                    .and_then(|errors| errors.first())
                    .and_then(|first| first.get("message"))
                    .and_then(display_value)
            }),
        _ => None,
    }
}

/// Message to surface for a failed response: whatever the body says, then the
/// raw text, then the operation's fallback for `status`.
#[must_use]
pub fn error_message(status: u16, text: &str, json: Option<&Value>, operation: &Operation) -> String {
    json.and_then(message_from_json)
        .or_else(|| non_blank(text))
        .unwrap_or_else(|| operation.fallback_message(status))
}

/// The field used for session classification: `message`, else `error`.
#[must_use]
pub fn session_message(json: &Value) -> Option<&str> {
    json.get("message")
        .and_then(Value::as_str)
        .or_else(|| json.get("error").and_then(Value::as_str))
}

/// Whether a response means the session token is no longer accepted.
#[must_use]
pub fn is_session_invalid(status: u16, message: Option<&str>) -> bool {
    if status == 401 {
        return true;
    }
    message.is_some_and(|m| {
        let m = m.trim();
        SESSION_INVALID_MESSAGES
            .iter()
            .any(|signal| m.eq_ignore_ascii_case(signal))
    })
}

/// `hasError` as the server means it: true only for a JSON `true`.
#[must_use]
pub fn is_error_flag(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn error_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(is_error_flag(Some(&value)))
}

fn lenient_message<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(display_value(&value))
}

fn non_blank(s: &str) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s.to_string()) }
}

pub(crate) fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => non_blank(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
