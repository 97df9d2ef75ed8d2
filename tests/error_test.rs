//! Integration tests for error reporting: messages, error maps, and the
//! derived views of a parse error.

use assay::{Error, Issue, IssueCode, ParseError, ParseOptions, Path, Schema, SchemaLike, Value};
use serde_json::json;
use stillwater::prelude::*;

fn form() -> Schema {
    Schema::object()
        .field("name", Schema::string().min(2))
        .field("tags", Schema::array(Schema::string().max(3)).max(2))
        .field(
            "contact",
            Schema::union([
                Schema::string().email().into_schema(),
                Schema::object()
                    .field("phone", Schema::string().e164())
                    .into_schema(),
            ]),
        )
        .into_schema()
}

fn form_error() -> ParseError {
    form()
        .safe_parse(json!({"name": "A", "tags": ["ok", "toolong"], "contact": "nope"}))
        .unwrap()
        .into_result()
        .unwrap_err()
}

#[test]
fn test_parse_returns_invalid_error() {
    match form().parse(json!({})) {
        Err(Error::Invalid(error)) => assert_eq!(error.len(), 3),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_error_display_lists_issues() {
    let error = form_error();
    let rendered = error.to_string();
    assert!(rendered.starts_with("Validation failed with 3 issue(s):"));
    assert!(rendered.contains("1. name: Too small: expected string to have >=2 characters"));
    assert!(rendered.contains("2. tags[1]: Too big: expected string to have <=3 characters"));
    assert!(rendered.contains("3. contact: Invalid input"));
}

#[test]
fn test_flatten_groups_by_first_segment() {
    let error = Schema::object()
        .field("a", Schema::number())
        .refine(|_| true, "unused")
        .safe_parse(Value::Null)
        .unwrap()
        .into_result()
        .unwrap_err();
    let flattened = error.flatten();
    assert_eq!(flattened.form_errors, ["Invalid input: expected object, received null"]);
    assert!(flattened.field_errors.is_empty());

    let flattened = form_error().flatten();
    assert!(flattened.form_errors.is_empty());
    let keys: Vec<&String> = flattened.field_errors.keys().collect();
    assert_eq!(keys, ["name", "tags", "contact"]);
}

#[test]
fn test_format_builds_tree() {
    let tree = form_error().format();
    assert!(tree.errors.is_empty());
    assert_eq!(
        tree.get("name").unwrap().errors,
        ["Too small: expected string to have >=2 characters"]
    );
    assert_eq!(
        tree.at(&Path::root().push_key("tags").push_index(1)).unwrap().errors.len(),
        1
    );
    // Union members contribute at their own paths.
    assert_eq!(
        tree.get("contact").unwrap().errors,
        [
            "Invalid email address",
            "Invalid input: expected object, received string"
        ]
    );

    let json = tree.to_json();
    assert_eq!(json["_errors"], json!([]));
    assert_eq!(json["tags"]["1"]["_errors"].as_array().unwrap().len(), 1);
}

#[test]
fn test_prettify_orders_by_depth() {
    let error = Schema::object()
        .field("user", Schema::object().field("id", Schema::number()))
        .strict()
        .safe_parse(json!({"user": {"id": "x"}, "extra": 1}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(
        error.prettify(),
        "✖ Unrecognized key: \"extra\"\n✖ Invalid input: expected number, received string\n  → at user.id"
    );
}

#[test]
fn test_to_json() {
    let error = Schema::number()
        .max(3.0)
        .safe_parse(5)
        .unwrap()
        .into_result()
        .unwrap_err();
    let json = error.to_json();
    assert_eq!(json[0]["code"], json!("too_big"));
    assert_eq!(json[0]["path"], json!([]));
    assert_eq!(json[0]["origin"], json!("number"));
    assert_eq!(json[0]["message"], json!("Too big: expected number to be <=3"));
}

#[test]
fn test_error_map_from_options() {
    let options = ParseOptions::new().with_error_map(|issue: &Issue| match issue.code() {
        IssueCode::InvalidType => Some("wrong type".to_string()),
        _ => None,
    });
    let error = Schema::object()
        .field("a", Schema::string())
        .field("b", Schema::string().min(3))
        .parse_with(json!({"a": 1, "b": "x"}), &options)
        .unwrap_err();
    let error = error.as_parse_error().unwrap();
    assert_eq!(
        error.messages(),
        ["wrong type", "Too small: expected string to have >=3 characters"]
    );
}

#[test]
fn test_author_message_beats_error_map() {
    let options = ParseOptions::new().with_error_map(|_: &Issue| Some("mapped".to_string()));
    let error = Schema::string()
        .min(3)
        .error("at least three")
        .safe_parse_with("x", &options)
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.messages(), ["at least three"]);
}

#[test]
fn test_report_input() {
    let options = ParseOptions::new().report_input(true);
    let error = Schema::array(Schema::number())
        .safe_parse_with(json!([1, "x"]), &options)
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().input, Some(Value::from("x")));

    let error = Schema::number()
        .safe_parse("x")
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().input, None);
}

#[test]
fn test_errors_combine() {
    let a = Schema::string().safe_parse(1).unwrap().into_result().unwrap_err();
    let b = Schema::number().safe_parse("x").unwrap().into_result().unwrap_err();
    let combined = a.combine(b);
    assert_eq!(combined.len(), 2);
    assert_eq!(combined.with_code(IssueCode::InvalidType).len(), 2);
}

#[test]
fn test_at_path_selects_issues() {
    let error = form_error();
    assert_eq!(error.at_path(&Path::root().push_key("name")).len(), 1);
    assert!(error.at_path(&Path::root()).is_empty());
}
