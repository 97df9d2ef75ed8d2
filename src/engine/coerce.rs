//! Input coercion for `coerce_*` primitive schemas.
//!
//! Coercion runs before the type test. A value that cannot be converted is
//! mapped to something the type test rejects (NaN for numbers and dates) or
//! passed through unchanged.

use chrono::{DateTime, NaiveDate};

use crate::value::{format_number, Value};

pub(crate) fn to_string(value: Value) -> Value {
    let text = match &value {
        Value::String(_) => return value,
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::BigInt(n) => n.to_string(),
        Value::Symbol(_) => return value,
        Value::Date(ms) => match DateTime::from_timestamp_millis(*ms as i64) {
            Some(date) if ms.is_finite() => date.to_rfc2822(),
            _ => "Invalid Date".to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Undefined | Value::Null => String::new(),
                other => match to_string(other.clone()) {
                    Value::String(s) => s,
                    _ => String::new(),
                },
            })
            .collect::<Vec<_>>()
            .join(","),
        _ => return value,
    };
    Value::String(text)
}

pub(crate) fn to_number(value: Value) -> Value {
    let n = match &value {
        Value::Number(_) => return value,
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::BigInt(n) => *n as f64,
        Value::Date(ms) => *ms,
        Value::String(s) => parse_number(s),
        _ => f64::NAN,
    };
    Value::Number(n)
}

fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

pub(crate) fn to_bigint(value: Value) -> Value {
    match &value {
        Value::String(s) => s.trim().parse::<i128>().map(Value::BigInt).unwrap_or(value),
        Value::Number(n) if n.fract() == 0.0 && n.is_finite() => Value::BigInt(*n as i128),
        Value::Bool(b) => Value::BigInt(i128::from(*b)),
        _ => value,
    }
}

pub(crate) fn to_boolean(value: Value) -> Value {
    let truthy = match &value {
        Value::Bool(_) => return value,
        Value::Undefined | Value::Null => false,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::BigInt(n) => *n != 0,
        Value::String(s) => !s.is_empty(),
        _ => true,
    };
    Value::Bool(truthy)
}

pub(crate) fn to_date(value: Value) -> Value {
    let millis = match &value {
        Value::Date(_) => return value,
        Value::Number(n) => *n,
        Value::String(s) => parse_date(s),
        _ => f64::NAN,
    };
    Value::Date(millis)
}

/// RFC 3339 timestamps, or plain `YYYY-MM-DD` dates at UTC midnight.
fn parse_date(s: &str) -> f64 {
    let s = s.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return date.timestamp_millis() as f64;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc().timestamp_millis() as f64)
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_from_string() {
        assert_eq!(to_number(Value::from(" 42 ")), Value::Number(42.0));
        assert_eq!(to_number(Value::from("")), Value::Number(0.0));
        assert!(matches!(to_number(Value::from("abc")), Value::Number(n) if n.is_nan()));
        assert!(matches!(to_number(Value::Undefined), Value::Number(n) if n.is_nan()));
    }

    #[test]
    fn test_string_from_primitives() {
        assert_eq!(to_string(Value::from(12)), Value::from("12"));
        assert_eq!(to_string(Value::from(true)), Value::from("true"));
        assert_eq!(to_string(Value::Null), Value::from("null"));
        assert_eq!(
            to_string(Value::array([Value::from(1), Value::Null, Value::from("x")])),
            Value::from("1,,x")
        );
    }

    #[test]
    fn test_boolean_truthiness() {
        assert_eq!(to_boolean(Value::from("")), Value::Bool(false));
        assert_eq!(to_boolean(Value::from("false")), Value::Bool(true));
        assert_eq!(to_boolean(Value::from(0)), Value::Bool(false));
        assert_eq!(to_boolean(Value::Object(Default::default())), Value::Bool(true));
    }

    #[test]
    fn test_bigint_from_string_and_integer() {
        assert_eq!(to_bigint(Value::from("123")), Value::BigInt(123));
        assert_eq!(to_bigint(Value::from(7)), Value::BigInt(7));
        assert_eq!(to_bigint(Value::from(1.5)), Value::from(1.5));
    }

    #[test]
    fn test_date_from_strings() {
        assert_eq!(to_date(Value::from("1970-01-02")), Value::Date(86_400_000.0));
        assert_eq!(
            to_date(Value::from("1970-01-01T00:00:01Z")),
            Value::Date(1000.0)
        );
        assert!(matches!(to_date(Value::from("soon")), Value::Date(ms) if ms.is_nan()));
    }
}
