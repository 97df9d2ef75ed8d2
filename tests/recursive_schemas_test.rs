//! Integration tests for lazy and recursive schemas, including cyclic input.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assay::{IssueCode, Schema, SchemaKind, SchemaLike, SharedValue, Value, WalkControl};
use serde_json::json;

fn category() -> Schema {
    Schema::object()
        .field("name", Schema::string())
        .field("children", Schema::array(Schema::lazy(category)))
        .into_schema()
}

#[test]
fn test_lazy_tree_validates_nested_levels() {
    let input = json!({
        "name": "root",
        "children": [
            {"name": "a", "children": []},
            {"name": "b", "children": [{"name": "b1", "children": []}]}
        ]
    });
    assert!(category().safe_parse(input).unwrap().is_success());

    let bad = json!({
        "name": "root",
        "children": [{"name": "a", "children": [{"name": 7, "children": []}]}]
    });
    let error = category().safe_parse(bad).unwrap().into_result().unwrap_err();
    assert_eq!(error.first().path.to_string(), "children[0].children[0].name");
}

#[test]
fn test_lazy_getter_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let schema = Schema::lazy(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Schema::number().into_schema()
    });

    assert!(schema.safe_parse(1).unwrap().is_success());
    assert!(schema.safe_parse("x").unwrap().is_failure());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

fn linked_list() -> Schema {
    Schema::recursive(|this| {
        Schema::object()
            .field("value", Schema::number())
            .field("next", this.nullable())
    })
}

#[test]
fn test_recursive_schema() {
    let schema = linked_list();
    let input = json!({"value": 1, "next": {"value": 2, "next": {"value": 3, "next": null}}});
    assert_eq!(schema.parse(input.clone()).unwrap().to_json(), input);

    let bad = json!({"value": 1, "next": {"value": "two", "next": null}});
    let error = schema.safe_parse(bad).unwrap().into_result().unwrap_err();
    assert_eq!(error.len(), 1);
    assert_eq!(error.first().path.to_string(), "next.value");
    assert_eq!(error.first().code(), IssueCode::InvalidType);
}

#[test]
fn test_recursive_schema_walks_once_per_node() {
    let schema = linked_list();
    let mut kinds = Vec::new();
    schema.walk(|node, _| {
        kinds.push(node.kind());
        WalkControl::Continue
    });
    assert_eq!(
        kinds,
        [
            SchemaKind::Object,
            SchemaKind::Number,
            SchemaKind::Nullable,
            SchemaKind::Lazy
        ]
    );
}

fn node_schema() -> Schema {
    Schema::recursive(|this| {
        Schema::object()
            .field("name", Schema::string())
            .field("next", this.optional())
    })
}

fn cyclic(name: impl Into<Value>) -> SharedValue {
    let cell = SharedValue::new(Value::Null);
    cell.set(Value::object([
        ("name", name.into()),
        ("next", Value::Shared(cell.clone())),
    ]));
    cell
}

#[test]
fn test_cyclic_input_terminates() {
    let cell = cyclic("loop");
    let output = node_schema().parse(Value::Shared(cell)).unwrap();
    assert_eq!(output.get("name"), Some(&Value::from("loop")));
}

#[test]
fn test_cyclic_input_reports_each_level_once() {
    let cell = cyclic(1);
    let error = node_schema()
        .safe_parse(Value::Shared(cell))
        .unwrap()
        .into_result()
        .unwrap_err();
    let paths: Vec<String> = error.iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, ["name", "next.name"]);
}

#[test]
fn test_shared_values_read_through() {
    let cell = SharedValue::new("hello");
    assert_eq!(
        Schema::string().parse(Value::Shared(cell.clone())).unwrap(),
        Value::from("hello")
    );
    cell.set(5);
    assert!(Schema::string().safe_parse(Value::Shared(cell)).unwrap().is_failure());
}
