//! Structured errors surfaced to the hosting transport layer.
//!
//! An [`ErrorSpec`] is the minimal description a caller attaches to a lookup
//! (message, domain uid, code, extra payload). [`throw_error`] turns it into a
//! [`StructuredError`] with a normalized uid. The transport layer serializes that
//! error as `{name, message, code, uid, extra}`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json_helpers::deserialize_code;

/// uid that is never normalized
pub const COMMON_UID: &str = "COMMON";

/// Message used when a request does not carry its own
pub const DEFAULT_ERROR_MESSAGE: &str = "Request error";

/// Code used when a request does not carry its own
pub const DEFAULT_ERROR_CODE: u16 = 400;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Description of the error to raise when a lookup does not produce an entity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorSpec {
    #[serde(default = "default_message", alias = "msg")]
    pub message: String,
    #[serde(default = "default_uid")]
    pub uid: String,
    #[serde(default = "default_code", deserialize_with = "deserialize_code")]
    pub code: u16,
    #[serde(default)]
    pub extra: Option<Value>,
    /// Explicit error name; the normalized uid is used when absent.
    #[serde(default)]
    pub name: Option<String>,
}

fn default_message() -> String {
    DEFAULT_ERROR_MESSAGE.to_string()
}

fn default_uid() -> String {
    COMMON_UID.to_string()
}

fn default_code() -> u16 {
    DEFAULT_ERROR_CODE
}

impl Default for ErrorSpec {
    fn default() -> Self {
        Self {
            message: default_message(),
            uid: default_uid(),
            code: default_code(),
            extra: None,
            name: None,
        }
    }
}

impl ErrorSpec {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = Some(extra);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Error raised to callers of a lookup, in the shape the transport layer expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredError {
    pub name: String,
    pub message: String,
    pub code: u16,
    pub uid: String,
    pub extra: Option<Value>,
}

impl StructuredError {
    /// Build the error described by `spec`, normalizing its uid.
    pub fn from_spec(spec: &ErrorSpec) -> Self {
        let uid = normalize_uid(&spec.uid);
        let name = spec
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| uid.clone());

        Self {
            name,
            message: spec.message.clone(),
            code: spec.code,
            uid,
            extra: spec.extra.clone(),
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, code {}): {}", self.name, self.uid, self.code, self.message)
    }
}

impl std::error::Error for StructuredError {}

impl From<ErrorSpec> for StructuredError {
    fn from(spec: ErrorSpec) -> Self {
        Self::from_spec(&spec)
    }
}

/// Normalize a domain uid: uppercase, with whitespace runs replaced by `.`.
///
/// The default `COMMON` uid is returned unchanged.
///
/// ```
/// use lookout::error::normalize_uid;
///
/// assert_eq!(normalize_uid("user not found"), "USER.NOT.FOUND");
/// assert_eq!(normalize_uid("COMMON"), "COMMON");
/// ```
pub fn normalize_uid(uid: &str) -> String {
    if uid == COMMON_UID {
        return uid.to_string();
    }
    WHITESPACE_RUN.replace_all(&uid.to_uppercase(), ".").into_owned()
}

/// Raise the structured error described by `spec`.
///
/// This never returns `Ok`; the generic success type lets it sit in tail
/// position of any fallible function.
///
/// ```
/// use lookout::error::{throw_error, ErrorSpec};
///
/// let result: Result<(), _> = throw_error(&ErrorSpec::new("User not found").with_uid("user not found"));
/// let err = result.unwrap_err();
/// assert_eq!(err.uid, "USER.NOT.FOUND");
/// assert_eq!(err.code, 400);
/// ```
pub fn throw_error<T>(spec: &ErrorSpec) -> Result<T, StructuredError> {
    Err(StructuredError::from_spec(spec))
}

/// Compatibility alias for [`throw_error`].
#[deprecated(note = "use `throw_error` instead")]
pub fn format_error<T>(spec: &ErrorSpec) -> Result<T, StructuredError> {
    throw_error(spec)
}
