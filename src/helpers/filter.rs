//! Document-store filter builder.
//!
//! Turns loosely-typed request params into a filter document, keeping only the
//! params a service explicitly allows.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::helpers::{is_truthy, path};

/// How an allowed param is turned into a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Case-insensitive pattern match
    #[serde(alias = "SEARCH")]
    Search,
    /// Equality on a boolean; `"true"`/`"false"` strings are parsed
    #[serde(alias = "BOOLEAN")]
    Boolean,
    /// Any kind this builder does not know; the param is skipped
    #[serde(other)]
    Unsupported,
}

/// A param a service accepts as a filter
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AllowedFilter {
    /// Param name in the request
    pub name: String,
    /// Path of the filtered field in the document
    pub field: String,
    #[serde(rename = "type")]
    pub kind: FilterKind,
    /// Used when the param is present but null
    #[serde(default)]
    pub default: Option<Value>,
}

impl AllowedFilter {
    pub fn new(name: impl Into<String>, field: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Build a filter document from `params`
///
/// Params without a matching [`AllowedFilter`] are dropped.
///
/// ```
/// use lookout::helpers::filter::{build_filter, AllowedFilter, FilterKind};
/// use serde_json::json;
///
/// let allowed = [
///     AllowedFilter::new("q", "profile.name", FilterKind::Search),
///     AllowedFilter::new("active", "active", FilterKind::Boolean),
/// ];
/// let params = json!({ "q": "ada", "active": "true", "admin": true });
///
/// let filter = build_filter(params.as_object().unwrap(), &allowed);
/// assert_eq!(
///     filter,
///     json!({ "profile": { "name": { "$regex": "ada", "$options": "i" } }, "active": true })
/// );
/// ```
pub fn build_filter(params: &Map<String, Value>, allowed: &[AllowedFilter]) -> Value {
    let mut filter = Value::Object(Map::new());

    for (key, value) in params {
        let Some(rule) = allowed.iter().find(|f| f.name == *key) else {
            continue;
        };

        let value = match &rule.default {
            Some(default) if value.is_null() && is_truthy(default) => default.clone(),
            _ => value.clone(),
        };

        match rule.kind {
            FilterKind::Search => {
                path::set(&mut filter, &rule.field, json!({ "$regex": value, "$options": "i" }));
            }
            FilterKind::Boolean => {
                let value = match value.as_str() {
                    Some("true") => Value::Bool(true),
                    Some("false") => Value::Bool(false),
                    _ => value,
                };
                path::set(&mut filter, &rule.field, value);
            }
            FilterKind::Unsupported => {
                log::debug!("skipping filter '{}' with unsupported type", rule.name);
            }
        }
    }

    filter
}
