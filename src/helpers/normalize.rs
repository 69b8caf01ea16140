//! Entity reshaping.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::helpers::{is_truthy, path};

/// Copies the value at `selector` in the source to `field` in the result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldMapping {
    pub selector: String,
    pub field: String,
}

impl FieldMapping {
    pub fn new(selector: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            field: field.into(),
        }
    }
}

/// Build a new object from `data` using `fields`
///
/// Every mapping produces a field; selectors that match nothing yield `null`.
pub fn build(data: &Value, fields: &[FieldMapping]) -> Value {
    let mut entity = Value::Object(Map::new());
    for mapping in fields {
        let selected = path::get(data, &mapping.selector).cloned().unwrap_or(Value::Null);
        path::set(&mut entity, &mapping.field, selected);
    }
    entity
}

/// Copy of `data` without the listed fields
///
/// Only fields holding a truthy value are removed; `0`, `""`, `false` and
/// `null` stay in place.
pub fn clean<S: AsRef<str>>(data: &Value, fields: &[S]) -> Value {
    let mut entity = data.clone();
    for field in fields {
        let field = field.as_ref();
        if path::get(data, field).is_some_and(is_truthy) {
            path::unset(&mut entity, field);
        }
    }
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_maps_selectors() {
        let data = json!({ "_id": "abc", "profile": { "first": "Ada" }, "roles": ["admin"] });
        let fields = [
            FieldMapping::new("_id", "id"),
            FieldMapping::new("profile.first", "name.first"),
            FieldMapping::new("roles[0]", "role"),
            FieldMapping::new("profile.last", "name.last"),
        ];
        assert_eq!(
            build(&data, &fields),
            json!({ "id": "abc", "name": { "first": "Ada", "last": null }, "role": "admin" })
        );
    }

    #[test]
    fn test_build_with_no_fields() {
        assert_eq!(build(&json!({ "a": 1 }), &[]), json!({}));
    }

    #[test]
    fn test_clean_removes_truthy_fields_only() {
        let data = json!({ "password": "secret", "token": "", "attempts": 0, "meta": { "ip": "1.2.3.4" } });
        let cleaned = clean(&data, &["password", "token", "attempts", "meta.ip", "missing"]);
        assert_eq!(cleaned, json!({ "token": "", "attempts": 0, "meta": {} }));
        // Source is untouched
        assert_eq!(data["password"], json!("secret"));
    }

    #[test]
    fn test_field_mapping_deserialize() {
        let fields: Vec<FieldMapping> =
            serde_json::from_value(json!([{ "selector": "a.b", "field": "b" }])).unwrap();
        assert_eq!(fields, vec![FieldMapping::new("a.b", "b")]);
    }
}
