//! Query helpers shared by services built on the resolver.
//!
//! - [`path`]: get/set/unset/merge on JSON values by dotted path
//! - [`filter`]: build store filters from request params
//! - [`normalize`]: reshape and clean entities by field mappings
//! - [`number`]: decimal parsing and random numeric codes

pub mod filter;
pub mod normalize;
pub mod number;
pub mod path;

use serde_json::Value;

/// Loose truthiness of a JSON value
///
/// `null`, `false`, `0`, `NaN` and `""` are falsy; containers are always truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
