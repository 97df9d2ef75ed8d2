//! Integration tests for literals, enums, unions, discriminated unions, and
//! intersections.

use assay::{
    IssueCode, IssueKind, Path, Primitive, Schema, SchemaBuildError, SchemaLike, Value,
};
use serde_json::json;

#[test]
fn test_literal() {
    let schema = Schema::literal("on");
    assert!(schema.safe_parse("on").unwrap().is_success());

    let error = schema.safe_parse("off").unwrap().into_result().unwrap_err();
    assert_eq!(
        error.first().kind,
        IssueKind::InvalidLiteral {
            expected: vec![Primitive::from("on")]
        }
    );
    assert_eq!(error.messages(), ["Invalid input: expected \"on\""]);
}

#[test]
fn test_literal_null_and_numbers() {
    assert!(Schema::literal(Primitive::Null).safe_parse(Value::Null).unwrap().is_success());
    assert!(Schema::literal(3).safe_parse(3.0).unwrap().is_success());
    assert!(Schema::literal(3).safe_parse("3").unwrap().is_failure());
}

#[test]
fn test_enumeration() {
    let schema = Schema::enumeration(["red", "green", "blue"]);
    assert!(schema.safe_parse("green").unwrap().is_success());

    let error = schema.safe_parse("pink").unwrap().into_result().unwrap_err();
    assert_eq!(error.first().code(), IssueCode::InvalidEnumValue);
    assert_eq!(
        error.messages(),
        ["Invalid option: expected one of \"red\"|\"green\"|\"blue\""]
    );
}

#[test]
fn test_union_first_match_wins() {
    let schema = Schema::union([
        Schema::string().transform(|_, _| Value::from("first")),
        Schema::string().transform(|_, _| Value::from("second")),
    ]);
    assert_eq!(schema.parse("x").unwrap(), Value::from("first"));
}

#[test]
fn test_union_collects_member_issues() {
    let schema = Schema::string().min(3).or(Schema::number());
    assert!(schema.safe_parse("abc").unwrap().is_success());
    assert!(schema.safe_parse(7).unwrap().is_success());

    let error = schema.safe_parse("a").unwrap().into_result().unwrap_err();
    assert_eq!(error.len(), 1);
    match &error.first().kind {
        IssueKind::InvalidUnion { errors } => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0][0].code(), IssueCode::TooSmall);
            assert_eq!(errors[1][0].code(), IssueCode::InvalidType);
        }
        other => panic!("unexpected issue {:?}", other),
    }
}

#[test]
fn test_union_member_paths_are_root_relative() {
    let schema = Schema::object().field(
        "value",
        Schema::union([
            Schema::object().field("a", Schema::string()),
            Schema::object().field("b", Schema::string()),
        ]),
    );
    let error = schema
        .safe_parse(json!({"value": {}}))
        .unwrap()
        .into_result()
        .unwrap_err();
    let issue = error.first();
    assert_eq!(issue.path, Path::root().push_key("value"));
    let nested: Vec<String> = issue.nested().iter().map(|i| i.path.to_string()).collect();
    assert_eq!(nested, ["value.a", "value.b"]);
}

fn shapes() -> Schema {
    Schema::discriminated_union(
        "type",
        [
            Schema::object()
                .field("type", Schema::literal("circle"))
                .field("radius", Schema::number()),
            Schema::object()
                .field("type", Schema::literal("square"))
                .field("side", Schema::number()),
        ],
    )
    .unwrap()
}

#[test]
fn test_discriminated_union_dispatches_on_tag() {
    let schema = shapes();
    assert!(schema
        .safe_parse(json!({"type": "circle", "radius": 1}))
        .unwrap()
        .is_success());

    let error = schema
        .safe_parse(json!({"type": "square", "radius": 1}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.len(), 1);
    assert_eq!(error.first().path, Path::root().push_key("side"));
}

#[test]
fn test_discriminated_union_unknown_tag() {
    let error = shapes()
        .safe_parse(json!({"type": "triangle"}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.len(), 1);
    assert_eq!(
        error.first().kind,
        IssueKind::InvalidUnionDiscriminator {
            discriminator: "type".to_string(),
            options: vec!["circle".into(), "square".into()]
        }
    );
    assert_eq!(
        error.messages(),
        ["Invalid discriminator value. Expected \"circle\" | \"square\""]
    );
}

#[test]
fn test_discriminated_union_non_object() {
    let error = shapes().safe_parse(5).unwrap().into_result().unwrap_err();
    assert_eq!(
        error.first().kind,
        IssueKind::InvalidType {
            expected: "object",
            received: "number"
        }
    );
}

#[test]
fn test_discriminated_union_fallback() {
    let schema = Schema::discriminated_union_with_fallback(
        "kind",
        [
            Schema::object().field("kind", Schema::literal("a")),
            Schema::object()
                .field("kind", Schema::literal("b").optional())
                .field("legacy", Schema::boolean()),
        ],
    )
    .unwrap();

    assert!(schema.safe_parse(json!({"legacy": true})).unwrap().is_success());
    let error = schema.safe_parse(json!({"kind": "z"})).unwrap().into_result().unwrap_err();
    assert_eq!(error.first().code(), IssueCode::InvalidUnion);
}

#[test]
fn test_duplicate_discriminator_rejected() {
    let result = Schema::discriminated_union(
        "type",
        [
            Schema::object().field("type", Schema::literal("a")),
            Schema::object().field("type", Schema::literals(["b", "a"])),
        ],
    );
    assert!(matches!(
        result,
        Err(SchemaBuildError::DuplicateDiscriminator { .. })
    ));
}

#[test]
fn test_option_without_discriminator_rejected() {
    let result = Schema::discriminated_union(
        "type",
        [
            Schema::object().field("type", Schema::literal("a")),
            Schema::object().field("name", Schema::string()),
        ],
    );
    assert!(matches!(
        result,
        Err(SchemaBuildError::MissingDiscriminator { .. })
    ));
}

#[test]
fn test_intersection_merges_objects() {
    let schema = Schema::intersection(
        Schema::object().field("a", Schema::string()).passthrough(),
        Schema::object().field("b", Schema::number()).passthrough(),
    );
    let output = schema.parse(json!({"a": "x", "b": 1})).unwrap();
    assert_eq!(output.to_json(), json!({"a": "x", "b": 1}));
}

#[test]
fn test_intersection_reports_both_sides() {
    let schema = Schema::string().min(5).and(Schema::string().email());
    let error = schema.safe_parse("a").unwrap().into_result().unwrap_err();
    let codes: Vec<_> = error.iter().map(|i| i.code()).collect();
    assert_eq!(codes, [IssueCode::TooSmall, IssueCode::InvalidFormat]);
}

#[test]
fn test_intersection_merge_conflict() {
    let schema = Schema::intersection(
        Schema::object().field("a", Schema::string().transform(|_, _| Value::from("left"))),
        Schema::object().field("a", Schema::string().transform(|_, _| Value::from("right"))),
    );
    let error = schema.safe_parse(json!({"a": "x"})).unwrap().into_result().unwrap_err();
    assert_eq!(
        error.first().kind,
        IssueKind::InvalidIntersectionTypes {
            merge_path: Path::root().push_key("a")
        }
    );
}

#[test]
fn test_nested_discriminator_shares_inner_values() {
    let event = |version: i32, kind: &'static str| {
        Schema::object()
            .field(
                "meta",
                Schema::object()
                    .field("version", Schema::literal(version))
                    .field("kind", Schema::literal(kind)),
            )
            .field("payload", Schema::string())
    };
    let schema = Schema::discriminated_union("meta", [event(1, "a"), event(1, "b")]).unwrap();

    assert!(schema
        .safe_parse(json!({"meta": {"version": 1, "kind": "b"}, "payload": "x"}))
        .unwrap()
        .is_success());
    let error = schema
        .safe_parse(json!({"meta": {"version": 1, "kind": "c"}, "payload": "x"}))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().code(), IssueCode::InvalidUnionDiscriminator);
}
