//! Result normalization.
//!
//! Raw call results are coerced into a form whose emptiness is meaningful:
//! booleans and numbers cannot be tested for emptiness the way containers
//! can, so they are mapped to `null` or to a non-empty string.

use serde_json::{Number, Value};

/// Normalize a raw call result
///
/// - `false` becomes `null`, `true` becomes `"true"`
/// - a number `n > 0` becomes its decimal string, `n <= 0` becomes `null`
/// - anything else is returned unchanged
///
/// ```
/// use lookout::resolver::normalize;
/// use serde_json::{json, Value};
///
/// assert_eq!(normalize(json!(3)), json!("3"));
/// assert_eq!(normalize(json!(0)), Value::Null);
/// assert_eq!(normalize(json!(true)), json!("true"));
/// assert_eq!(normalize(json!({ "id": 1 })), json!({ "id": 1 }));
/// ```
pub fn normalize(raw: Value) -> Value {
    match raw {
        Value::Bool(false) => Value::Null,
        Value::Bool(true) => Value::String("true".to_string()),
        Value::Number(n) => positive_number_string(&n).map_or(Value::Null, Value::String),
        other => other,
    }
}

/// Whether a normalized entity counts as "not found"
///
/// `null`, `""`, `[]` and `{}` are empty; everything else is not.
pub fn is_empty(entity: &Value) -> bool {
    match entity {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn positive_number_string(n: &Number) -> Option<String> {
    if let Some(u) = n.as_u64() {
        return (u > 0).then(|| u.to_string());
    }
    if n.is_i64() {
        // Only negative integers reach here
        return None;
    }
    let f = n.as_f64()?;
    if f.is_nan() || f <= 0.0 {
        return None;
    }
    if f.fract() == 0.0 && f < 1e21 {
        Some(format!("{f:.0}"))
    } else {
        Some(f.to_string())
    }
}
