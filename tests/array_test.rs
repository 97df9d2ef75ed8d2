//! Integration tests for array and tuple schemas.

use assay::{IssueCode, IssueKind, Numeric, Origin, Path, Schema, SchemaLike, Value};
use serde_json::json;

#[test]
fn test_array_validates_every_element() {
    let schema = Schema::array(Schema::number());
    assert_eq!(schema.parse(json!([1, 2, 3])).unwrap(), Value::array([1, 2, 3]));

    let error = schema
        .safe_parse(json!([1, "two", 3, null]))
        .unwrap()
        .into_result()
        .unwrap_err();
    let paths: Vec<Path> = error.iter().map(|i| i.path.clone()).collect();
    assert_eq!(paths, [Path::root().push_index(1), Path::root().push_index(3)]);
}

#[test]
fn test_array_rejects_non_arrays() {
    let error = Schema::array(Schema::string())
        .safe_parse("abc")
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(
        error.first().kind,
        IssueKind::InvalidType {
            expected: "array",
            received: "string"
        }
    );
}

#[test]
fn test_array_length_checks() {
    let schema = Schema::array(Schema::string()).min(1).max(2);
    let error = schema.safe_parse(json!([])).unwrap().into_result().unwrap_err();
    assert_eq!(
        error.first().kind,
        IssueKind::TooSmall {
            origin: Origin::Array,
            minimum: Numeric::Number(1.0),
            inclusive: true,
            exact: false
        }
    );
    assert_eq!(error.messages(), ["Too small: expected array to have >=1 items"]);

    let error = schema
        .safe_parse(json!(["a", "b", "c"]))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().code(), IssueCode::TooBig);
}

#[test]
fn test_length_checks_run_alongside_element_failures() {
    let schema = Schema::array(Schema::string()).min(3);
    let error = schema.safe_parse(json!([1])).unwrap().into_result().unwrap_err();
    let codes: Vec<_> = error.iter().map(|i| i.code()).collect();
    assert_eq!(codes, [IssueCode::InvalidType, IssueCode::TooSmall]);
}

#[test]
fn test_nested_array_paths() {
    let schema = Schema::object().field(
        "users",
        Schema::array(Schema::object().field("email", Schema::string().email())),
    );
    let error = schema
        .safe_parse(json!({"users": [{"email": "a@b.co"}, {"email": "bad"}]}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().path.to_string(), "users[1].email");
}

#[test]
fn test_tuple_positions() {
    let schema = Schema::tuple([Schema::string().into_schema(), Schema::number().into_schema()]);
    assert!(schema.safe_parse(json!(["a", 1])).unwrap().is_success());

    let error = schema.safe_parse(json!([1, "a"])).unwrap().into_result().unwrap_err();
    let paths: Vec<String> = error.iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, ["[0]", "[1]"]);
}

#[test]
fn test_tuple_length() {
    let schema = Schema::tuple([Schema::string().into_schema(), Schema::number().into_schema()]);

    let error = schema.safe_parse(json!(["a"])).unwrap().into_result().unwrap_err();
    assert_eq!(error.len(), 1);
    assert_eq!(error.first().code(), IssueCode::TooSmall);

    let error = schema
        .safe_parse(json!(["a", 1, true]))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.len(), 1);
    assert_eq!(
        error.first().kind,
        IssueKind::TooBig {
            origin: Origin::Array,
            maximum: Numeric::Number(2.0),
            inclusive: true,
            exact: false
        }
    );
}

#[test]
fn test_tuple_optional_tail() {
    let schema = Schema::tuple([
        Schema::string().into_schema(),
        Schema::number().optional(),
        Schema::boolean().optional(),
    ]);
    assert_eq!(schema.parse(json!(["a"])).unwrap(), Value::array(["a"]));
    assert_eq!(
        schema.parse(json!(["a", 1])).unwrap(),
        Value::array([Value::from("a"), Value::from(1)])
    );
    assert!(schema.safe_parse(json!([])).unwrap().is_failure());
}

#[test]
fn test_tuple_rest() {
    let schema = Schema::tuple([Schema::string()]).rest(Schema::number());
    assert!(schema.safe_parse(json!(["a", 1, 2, 3])).unwrap().is_success());

    let error = schema
        .safe_parse(json!(["a", 1, "x"]))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().path, Path::root().push_index(2));
}
