//! Integration tests for object, record, map, and set schemas.

use assay::{
    Check, IssueCode, IssueKind, Origin, ParseOptions, Path, Schema, SchemaLike, Value,
};
use serde_json::json;

fn user() -> assay::ObjectSchema {
    Schema::object()
        .field("name", Schema::string().min(1))
        .field("age", Schema::number().int().nonnegative())
        .optional_field("email", Schema::string().email())
}

#[test]
fn test_valid_object_keeps_declared_keys() {
    let output = user()
        .parse(json!({"name": "Alice", "age": 30, "email": "a@example.com"}))
        .unwrap();
    assert_eq!(
        output.to_json(),
        json!({"name": "Alice", "age": 30, "email": "a@example.com"})
    );
}

#[test]
fn test_absent_optional_key_stays_absent() {
    let output = user().parse(json!({"name": "Alice", "age": 30})).unwrap();
    assert_eq!(output.get("email"), None);
    assert_eq!(output.as_object().unwrap().len(), 2);
}

#[test]
fn test_every_field_is_validated() {
    let error = user()
        .safe_parse(json!({"name": "", "age": -1, "email": "nope"}))
        .unwrap()
        .into_result()
        .unwrap_err();

    let paths: Vec<String> = error.iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, ["name", "age", "email"]);
}

#[test]
fn test_missing_required_key_reports_undefined() {
    let error = user()
        .safe_parse(json!({"name": "Alice"}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.len(), 1);
    assert_eq!(error.first().path, Path::root().push_key("age"));
    assert_eq!(
        error.first().kind,
        IssueKind::InvalidType {
            expected: "number",
            received: "undefined"
        }
    );
}

#[test]
fn test_non_object_input() {
    let error = user().safe_parse(json!([1, 2])).unwrap().into_result().unwrap_err();
    assert_eq!(
        error.first().kind,
        IssueKind::InvalidType {
            expected: "object",
            received: "array"
        }
    );
}

#[test]
fn test_unknown_keys_policies() {
    let input = json!({"name": "Alice", "age": 30, "extra": true});

    let stripped = user().parse(input.clone()).unwrap();
    assert_eq!(stripped.get("extra"), None);

    let kept = user().passthrough().parse(input.clone()).unwrap();
    assert_eq!(kept.get("extra"), Some(&Value::from(true)));

    let error = user()
        .strict()
        .safe_parse(json!({"name": "Alice", "age": 30, "x": 1, "y": 2}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.len(), 1);
    assert_eq!(
        error.first().kind,
        IssueKind::UnrecognizedKeys {
            keys: vec!["x".into(), "y".into()]
        }
    );
    assert_eq!(error.messages(), ["Unrecognized keys: \"x\", \"y\""]);

    let error = user()
        .catchall(Schema::number())
        .safe_parse(input)
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().path, Path::root().push_key("extra"));
}

#[test]
fn test_strict_reports_input_when_asked() {
    let options = ParseOptions::new().report_input(true);
    let input = json!({"name": "Alice", "age": 30, "x": 1});
    let error = user()
        .strict()
        .safe_parse_with(input.clone(), &options)
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().input, Some(Value::from(input)));
}

#[test]
fn test_extend_pick_omit() {
    let admin = user().extend([("role", Schema::literal("admin"))]);
    assert!(admin
        .safe_parse(json!({"name": "A", "age": 1, "role": "admin"}))
        .unwrap()
        .is_success());

    let name_only = user().pick(["name"]);
    assert!(name_only.safe_parse(json!({"name": "A"})).unwrap().is_success());

    let no_age = user().omit(["age"]);
    assert!(no_age.safe_parse(json!({"name": "A"})).unwrap().is_success());
}

#[test]
fn test_partial_and_required() {
    let partial = user().partial();
    assert!(partial.safe_parse(json!({})).unwrap().is_success());

    let required = user().required();
    let error = required
        .safe_parse(json!({"name": "A", "age": 1}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().path, Path::root().push_key("email"));
    assert_eq!(
        error.first().kind,
        IssueKind::InvalidType {
            expected: "nonoptional",
            received: "undefined"
        }
    );
}

#[test]
fn test_keyof() {
    let keys = user().keyof();
    assert!(keys.safe_parse("age").unwrap().is_success());
    let error = keys.safe_parse("height").unwrap().into_result().unwrap_err();
    assert_eq!(error.first().code(), IssueCode::InvalidEnumValue);
}

#[test]
fn test_object_refinement_with_path() {
    let signup = Schema::object()
        .field("password", Schema::string())
        .field("confirm", Schema::string())
        .check(
            Check::refine(|value| value.get("password") == value.get("confirm"))
                .message("passwords do not match")
                .path(Path::root().push_key("confirm")),
        );

    assert!(signup
        .safe_parse(json!({"password": "a", "confirm": "a"}))
        .unwrap()
        .is_success());

    let error = signup
        .safe_parse(json!({"password": "a", "confirm": "b"}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().code(), IssueCode::Custom);
    assert_eq!(error.first().path, Path::root().push_key("confirm"));
    assert_eq!(error.messages(), ["passwords do not match"]);
}

#[test]
fn test_refinement_skipped_when_field_fails() {
    let schema = Schema::object()
        .field("a", Schema::number())
        .refine(|_| false, "never");
    let error = schema.safe_parse(json!({"a": "x"})).unwrap().into_result().unwrap_err();
    assert_eq!(error.len(), 1);
    assert_eq!(error.first().code(), IssueCode::InvalidType);
}

#[test]
fn test_super_refine_reports_many() {
    let schema = Schema::object()
        .field("start", Schema::number())
        .field("end", Schema::number())
        .super_refine(|value, ctx| {
            let start = value.get("start").and_then(Value::as_f64).unwrap_or(0.0);
            let end = value.get("end").and_then(Value::as_f64).unwrap_or(0.0);
            if end < start {
                ctx.add_issue(
                    assay::Issue::custom("end before start").at(Path::root().push_key("end")),
                );
                ctx.add_custom("invalid range");
            }
        });

    let error = schema
        .safe_parse(json!({"start": 5, "end": 1}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.messages(), ["end before start", "invalid range"]);
    assert_eq!(error.iter().next().unwrap().path.to_string(), "end");
}

#[test]
fn test_property_check_validates_one_key() {
    let schema = Schema::object()
        .passthrough()
        .check(Check::property("count", Schema::number().positive()));
    let error = schema
        .safe_parse(json!({"count": 0}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().path, Path::root().push_key("count"));
    assert_eq!(error.first().code(), IssueCode::TooSmall);
}

#[test]
fn test_record_with_open_keys() {
    let schema = Schema::record(Schema::string().min(2), Schema::number());
    assert!(schema.safe_parse(json!({"ab": 1, "cd": 2})).unwrap().is_success());

    let error = schema
        .safe_parse(json!({"a": 1, "cd": "x"}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.len(), 2);

    let key_issue = &error.with_code(IssueCode::InvalidKey)[0];
    assert!(key_issue.path.is_root());
    match &key_issue.kind {
        IssueKind::InvalidKey { origin, issues } => {
            assert_eq!(*origin, Origin::Record);
            assert_eq!(issues[0].code(), IssueCode::TooSmall);
        }
        other => panic!("unexpected issue {:?}", other),
    }

    let value_issue = &error.with_code(IssueCode::InvalidType)[0];
    assert_eq!(value_issue.path, Path::root().push_key("cd"));
}

#[test]
fn test_record_with_enum_keys_is_exhaustive() {
    let schema = Schema::record(Schema::enumeration(["a", "b"]), Schema::number());
    assert!(schema.safe_parse(json!({"a": 1, "b": 2})).unwrap().is_success());

    let error = schema
        .safe_parse(json!({"a": 1, "c": 3}))
        .unwrap()
        .into_result()
        .unwrap_err();
    let codes: Vec<_> = error.iter().map(|i| i.code()).collect();
    assert_eq!(codes, [IssueCode::InvalidType, IssueCode::UnrecognizedKeys]);
    assert_eq!(error.first().path, Path::root().push_key("b"));
}

#[test]
fn test_map_entries() {
    let schema = Schema::map(Schema::string(), Schema::number());
    let input = Value::map([("a", Value::from(1)), ("b", Value::from("x"))]);
    let error = schema.safe_parse(input).unwrap().into_result().unwrap_err();
    assert_eq!(error.len(), 1);
    assert_eq!(error.first().path, Path::root().push_key("b"));

    let input = Value::map([(Value::from(1), Value::from(1))]);
    let error = schema.safe_parse(input).unwrap().into_result().unwrap_err();
    assert_eq!(error.first().code(), IssueCode::InvalidKey);
    assert!(error.first().path.is_root());
}

#[test]
fn test_map_with_unkeyable_key_reports_element() {
    let schema = Schema::map(Schema::any(), Schema::number());
    let input = Value::map([(Value::from(true), Value::from("x"))]);
    let error = schema.safe_parse(input).unwrap().into_result().unwrap_err();
    match &error.first().kind {
        IssueKind::InvalidElement { origin, key, issues } => {
            assert_eq!(*origin, Origin::Map);
            assert_eq!(*key, Value::from(true));
            assert_eq!(issues.len(), 1);
        }
        other => panic!("unexpected issue {:?}", other),
    }
}

#[test]
fn test_set_elements_and_size() {
    let schema = Schema::set(Schema::number()).min(2);
    assert!(schema.safe_parse(Value::set([1, 2])).unwrap().is_success());

    let error = schema.safe_parse(Value::set([1])).unwrap().into_result().unwrap_err();
    assert_eq!(error.first().code(), IssueCode::TooSmall);

    let error = schema
        .safe_parse(Value::set([Value::from(1), Value::from("x")]))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().code(), IssueCode::InvalidType);
    assert!(error.first().path.is_root());
}

#[test]
fn test_error_targets_latest_refinement_or_type_check() {
    let plain = Schema::object()
        .field("a", Schema::number())
        .error("expected a record");
    let error = plain.safe_parse(1).unwrap().into_result().unwrap_err();
    assert_eq!(error.messages(), ["expected a record"]);

    let refined = Schema::object()
        .field("a", Schema::number())
        .refine(|v| v.get("a").and_then(Value::as_f64) != Some(0.0), "first")
        .error("a must not be zero");
    let error = refined.safe_parse(json!({"a": 0})).unwrap().into_result().unwrap_err();
    assert_eq!(error.messages(), ["a must not be zero"]);
    let error = refined.safe_parse(1).unwrap().into_result().unwrap_err();
    assert_eq!(
        error.messages(),
        ["Invalid input: expected object, received number"]
    );
}
