//! JSON deserialization helpers for Lookout
//!
//! Request and error specs often arrive as loosely-typed JSON from other
//! services. These deserializers accept the shapes those callers send:
//! error codes as numbers or numeric strings, and field lists as either an
//! array or a single space-separated string.

use serde::Deserializer;

/// Custom deserializer for error codes that accepts both numbers and numeric strings
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use lookout::json_helpers::deserialize_code;
///
/// assert_eq!(deserialize_code(&json!(404)).unwrap(), 404);
/// assert_eq!(deserialize_code(&json!("422")).unwrap(), 422);
/// ```
pub fn deserialize_code<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct CodeVisitor;

    impl<'de> Visitor<'de> for CodeVisitor {
        type Value = u16;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an error code as an integer or a numeric string")
        }

        fn visit_u64<E>(self, value: u64) -> Result<u16, E>
        where
            E: de::Error,
        {
            u16::try_from(value)
                .map_err(|_| de::Error::invalid_value(de::Unexpected::Unsigned(value), &self))
        }

        fn visit_i64<E>(self, value: i64) -> Result<u16, E>
        where
            E: de::Error,
        {
            u16::try_from(value)
                .map_err(|_| de::Error::invalid_value(de::Unexpected::Signed(value), &self))
        }

        fn visit_str<E>(self, value: &str) -> Result<u16, E>
        where
            E: de::Error,
        {
            value
                .trim()
                .parse::<u16>()
                .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(CodeVisitor)
}

/// Custom deserializer for field lists (`populate`, `select`)
///
/// Accepts an array of strings, a single space-separated string, or null.
pub fn deserialize_field_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct FieldListVisitor;

    impl<'de> Visitor<'de> for FieldListVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a list of field names, a space-separated string, or null")
        }

        fn visit_unit<E>(self) -> Result<Vec<String>, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Vec<String>, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_str<E>(self, value: &str) -> Result<Vec<String>, E>
        where
            E: de::Error,
        {
            Ok(value.split_whitespace().map(str::to_string).collect())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Vec<String>, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut fields = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(field) = seq.next_element::<String>()? {
                fields.push(field);
            }
            Ok(fields)
        }
    }

    deserializer.deserialize_any(FieldListVisitor)
}

/// Deserialize a value that callers may send as `null`, falling back to `T::default()`
///
/// Pair with `#[serde(default = ...)]` to cover the absent case as well.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    use serde::Deserialize;

    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
