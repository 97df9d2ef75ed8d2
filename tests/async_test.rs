//! Integration tests for asynchronous refinements, transforms, and promises.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use assay::{EngineError, Error, IssueCode, PromiseValue, Schema, SchemaLike, Value};
use futures::executor::block_on;
use futures::FutureExt;
use serde_json::json;

/// Resolves to its value after reporting `Pending` once.
struct YieldOnce<T> {
    value: Option<T>,
    yielded: bool,
}

impl<T> YieldOnce<T> {
    fn new(value: T) -> Self {
        Self {
            value: Some(value),
            yielded: false,
        }
    }
}

impl<T: Unpin> Future for YieldOnce<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        if !self.yielded {
            self.yielded = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        match self.value.take() {
            Some(value) => Poll::Ready(value),
            None => Poll::Pending,
        }
    }
}

fn username() -> Schema {
    Schema::string()
        .min(3)
        .refine_async(
            |value| {
                let taken = value.as_str() == Some("admin");
                async move { !taken }.boxed()
            },
            "username is taken",
        )
        .into_schema()
}

#[test]
fn test_async_refinement() {
    let schema = username();
    assert!(block_on(schema.safe_parse_async("ada")).unwrap().is_success());

    let error = block_on(schema.safe_parse_async("admin"))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().code(), IssueCode::Custom);
    assert_eq!(error.messages(), ["username is taken"]);
}

#[test]
fn test_async_refinement_rejected_in_sync_mode() {
    assert_eq!(
        username().safe_parse("ada").unwrap_err(),
        EngineError::AsyncInSync
    );
    assert!(matches!(
        username().parse("ada"),
        Err(Error::Engine(EngineError::AsyncInSync))
    ));
}

#[test]
fn test_sync_mode_only_fails_when_async_node_is_reached() {
    // The type check fails first, so the async refinement never runs.
    let result = username().safe_parse(5).unwrap();
    assert!(result.is_failure());
}

#[test]
fn test_async_transform() {
    let schema = Schema::string().transform_async(|value| {
        async move { Value::from(value.as_str().map(str::len).unwrap_or_default()) }.boxed()
    });
    assert_eq!(block_on(schema.parse_async("four")).unwrap(), Value::from(4));
    assert!(matches!(
        schema.safe_parse("four"),
        Err(EngineError::AsyncInSync)
    ));
}

#[test]
fn test_promise_schema_awaits_value() {
    let schema = Schema::promise(Schema::number().positive());

    let ok = PromiseValue::new(async { Value::from(3) });
    assert_eq!(block_on(schema.parse_async(ok)).unwrap(), Value::from(3));

    let bad = PromiseValue::resolved(Value::from(-1));
    let error = block_on(schema.safe_parse_async(bad))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(error.first().code(), IssueCode::TooSmall);

    assert!(matches!(
        schema.safe_parse(PromiseValue::resolved(Value::from(1))),
        Err(EngineError::AsyncInSync)
    ));
}

#[test]
fn test_promise_settles_once_for_clones() {
    let promise = PromiseValue::new(async { Value::from("done") });
    let schema = Schema::promise(Schema::string());
    let first = block_on(schema.parse_async(promise.clone())).unwrap();
    let second = block_on(schema.parse_async(promise)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_async_parse_of_sync_schema_matches_sync_parse() {
    let schema = Schema::object()
        .field("name", Schema::string().min(2))
        .field("tags", Schema::array(Schema::string()));
    let input = json!({"name": "x", "tags": ["a", 1]});

    let sync = schema.safe_parse(input.clone()).unwrap();
    let async_result = block_on(schema.safe_parse_async(input)).unwrap();
    assert_eq!(
        sync.into_result().unwrap_err(),
        async_result.into_result().unwrap_err()
    );
}

#[test]
fn test_async_checks_inside_nested_structures() {
    let schema = Schema::array(username());
    let error = block_on(schema.safe_parse_async(json!(["ada", "admin", "al"])))
        .unwrap()
        .into_result()
        .unwrap_err();
    let paths: Vec<String> = error.iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, ["[1]", "[2]"]);
}

#[test]
fn test_suspended_refinements_keep_paths_and_order() {
    let even = Schema::number()
        .refine_async(
            |value| {
                let ok = value.as_f64().is_some_and(|n| n % 2.0 == 0.0);
                YieldOnce::new(ok).boxed()
            },
            "must be even",
        )
        .refine_async(
            |value| {
                let ok = value.as_f64().is_some_and(|n| n < 10.0);
                YieldOnce::new(ok).boxed()
            },
            "must be small",
        );
    let schema = Schema::object()
        .field("a", Schema::array(even))
        .field("b", Schema::string());

    let error = block_on(schema.safe_parse_async(json!({"a": [2, 11, "x"], "b": 1})))
        .unwrap()
        .into_result()
        .unwrap_err();
    let found: Vec<(IssueCode, String)> = error
        .iter()
        .map(|i| (i.code(), i.path.to_string()))
        .collect();
    assert_eq!(
        found,
        [
            (IssueCode::Custom, "a[1]".to_string()),
            (IssueCode::Custom, "a[1]".to_string()),
            (IssueCode::InvalidType, "a[2]".to_string()),
            (IssueCode::InvalidType, "b".to_string()),
        ]
    );
    assert_eq!(error.messages()[..2], ["must be even", "must be small"]);

    assert!(matches!(
        schema.safe_parse(json!({"a": [2], "b": "ok"})),
        Err(EngineError::AsyncInSync)
    ));
}
