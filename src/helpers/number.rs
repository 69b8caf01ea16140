//! Numeric helpers: decimal parsing and random numeric codes.

use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Decimal places used when callers have no preference
pub const DEFAULT_PRECISION: u32 = 2;

/// Longest code that still fits in a `u64`
pub const MAX_CODE_DIGITS: u32 = 19;

/// Parse a number or numeric string and round it to `precision` places
///
/// Midpoints round away from zero. Returns `None` for anything that is not a
/// number or a string holding one.
///
/// ```
/// use lookout::helpers::number::parse_number_dec;
/// use rust_decimal::Decimal;
/// use serde_json::json;
///
/// assert_eq!(parse_number_dec(&json!("3.14159"), 2), Some(Decimal::new(314, 2)));
/// assert_eq!(parse_number_dec(&json!("abc"), 2), None);
/// ```
pub fn parse_number_dec(value: &Value, precision: u32) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }?;
    Some(parsed.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero))
}

/// Random number with exactly `digits` digits (no leading zero)
///
/// Returns `None` unless `1 <= digits <= 19`.
pub fn generate_rand_num(digits: u32) -> Option<u64> {
    if digits == 0 || digits > MAX_CODE_DIGITS {
        return None;
    }
    let low = 10u64.pow(digits - 1);
    let high = 10u64.pow(digits) - 1;
    Some(rand::thread_rng().gen_range(low..=high))
}
