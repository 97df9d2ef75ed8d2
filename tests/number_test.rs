//! Integration tests for number, bigint, boolean, and date schemas.

use assay::{Check, EngineError, IssueCode, IssueKind, Numeric, Origin, Schema, SchemaLike, Value};

fn codes(schema: &impl SchemaLike, input: impl Into<Value>) -> Vec<IssueCode> {
    match schema.safe_parse(input).unwrap().into_result() {
        Ok(_) => Vec::new(),
        Err(error) => error.iter().map(|i| i.code()).collect(),
    }
}

#[test]
fn test_number_rejects_nan_and_infinity() {
    let schema = Schema::number();
    assert!(codes(&schema, 1.5).is_empty());
    assert_eq!(codes(&schema, f64::NAN), [IssueCode::InvalidType]);
    assert_eq!(codes(&schema, f64::INFINITY), [IssueCode::NotFinite]);
    assert_eq!(codes(&schema, "1"), [IssueCode::InvalidType]);
}

#[test]
fn test_bounds() {
    let schema = Schema::number().gt(0.0).lte(10.0);
    assert!(codes(&schema, 10).is_empty());
    assert_eq!(codes(&schema, 0), [IssueCode::TooSmall]);
    assert_eq!(codes(&schema, 10.5), [IssueCode::TooBig]);

    let error = schema.safe_parse(0).unwrap().into_result().unwrap_err();
    assert_eq!(
        error.first().kind,
        IssueKind::TooSmall {
            origin: Origin::Number,
            minimum: Numeric::Number(0.0),
            inclusive: false,
            exact: false
        }
    );
    assert_eq!(error.messages(), ["Too small: expected number to be >0"]);
}

#[test]
fn test_both_bounds_can_fail_independently() {
    let schema = Schema::number().min(5.0).multiple_of(2.0);
    assert_eq!(codes(&schema, 3), [IssueCode::TooSmall, IssueCode::NotMultipleOf]);
}

#[test]
fn test_multiple_of_handles_decimal_steps() {
    let schema = Schema::number().multiple_of(0.1);
    assert!(codes(&schema, 0.3).is_empty());
    assert!(codes(&schema, 1.2).is_empty());
    assert_eq!(codes(&schema, 0.35), [IssueCode::NotMultipleOf]);
}

#[test]
fn test_int_rejects_fractions_as_type_errors() {
    let schema = Schema::int().min(0.0);
    assert!(codes(&schema, 3).is_empty());
    assert_eq!(codes(&schema, 1.5), [IssueCode::InvalidType]);
    // A fraction stops later checks.
    assert_eq!(codes(&Schema::int().max(0.0), 1.5), [IssueCode::InvalidType]);
}

#[test]
fn test_integer_formats() {
    assert_eq!(codes(&Schema::int32(), 2_147_483_648.0), [IssueCode::TooBig]);
    assert_eq!(codes(&Schema::uint32(), -1), [IssueCode::TooSmall]);
    assert!(codes(&Schema::uint32(), 4_294_967_295.0).is_empty());
    assert_eq!(codes(&Schema::int(), 9_007_199_254_740_992.0), [IssueCode::TooBig]);
}

#[test]
fn test_coerce_number() {
    let schema = Schema::coerce_number();
    assert_eq!(schema.parse("42").unwrap(), Value::from(42));
    assert_eq!(schema.parse(true).unwrap(), Value::from(1));
    assert_eq!(codes(&schema, "abc"), [IssueCode::InvalidType]);
    assert_eq!(codes(&schema, "Infinity"), [IssueCode::NotFinite]);
}

#[test]
fn test_bigint() {
    let schema = Schema::bigint().positive();
    assert!(codes(&schema, Value::bigint(5)).is_empty());
    assert_eq!(codes(&schema, Value::bigint(0)), [IssueCode::TooSmall]);
    assert_eq!(codes(&schema, 5), [IssueCode::InvalidType]);

    assert_eq!(codes(&Schema::uint64(), Value::bigint(-1)), [IssueCode::TooSmall]);
    assert_eq!(
        codes(&Schema::int64(), Value::bigint(i64::MAX as i128 + 1)),
        [IssueCode::TooBig]
    );
}

#[test]
fn test_coerce_bigint() {
    let schema = Schema::coerce_bigint();
    assert_eq!(schema.parse("12").unwrap(), Value::bigint(12));
    assert_eq!(schema.parse(3).unwrap(), Value::bigint(3));
    assert_eq!(codes(&schema, 1.5), [IssueCode::InvalidType]);
}

#[test]
fn test_mixed_numeric_bound_is_engine_error() {
    let schema = Schema::number().check(Check::gt(5i128));
    assert!(matches!(
        schema.safe_parse(10),
        Err(EngineError::MixedNumericTypes { .. })
    ));
}

#[test]
fn test_boolean_and_coercion() {
    assert!(codes(&Schema::boolean(), true).is_empty());
    assert_eq!(codes(&Schema::boolean(), "true"), [IssueCode::InvalidType]);

    let schema = Schema::coerce_boolean();
    assert_eq!(schema.parse(0).unwrap(), Value::from(false));
    assert_eq!(schema.parse("false").unwrap(), Value::from(true));
    assert_eq!(schema.parse("").unwrap(), Value::from(false));
}

#[test]
fn test_date_bounds() {
    let schema = Schema::date().min(1_000.0).max(2_000.0);
    assert!(codes(&schema, Value::date(1_500.0)).is_empty());
    assert_eq!(codes(&schema, Value::date(500.0)), [IssueCode::TooSmall]);
    assert_eq!(codes(&schema, Value::date(f64::NAN)), [IssueCode::InvalidType]);

    let error = schema
        .safe_parse(Value::date(3_000.0))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().kind.code(), IssueCode::TooBig);
}

#[test]
fn test_coerce_date() {
    let schema = Schema::coerce_date();
    assert_eq!(schema.parse("1970-01-02").unwrap(), Value::date(86_400_000.0));
    assert_eq!(
        schema.parse("1970-01-01T00:00:01Z").unwrap(),
        Value::date(1_000.0)
    );
    assert_eq!(codes(&schema, "not a date"), [IssueCode::InvalidType]);
}

#[test]
fn test_nan_schema() {
    assert!(codes(&Schema::nan(), f64::NAN).is_empty());
    assert_eq!(codes(&Schema::nan(), 1), [IssueCode::InvalidType]);
}
