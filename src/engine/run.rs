//! Per-kind traversal.
//!
//! [`run`] validates one node: structural validation for its kind, then its
//! checks. Wrapper kinds receive the raw input, so shared cells reach lazy
//! nodes intact for the cycle guard; every other kind reads through cells
//! first.

use std::borrow::Cow;

use futures::future::{BoxFuture, FutureExt};
use tracing::trace;

use crate::check::{RefinementCtx, StringFormat};
use crate::error::{EngineError, Issue, IssueKind, Numeric, Origin, ParseError};
use crate::path::PathSegment;
use crate::schema::{
    wrap_function, CatchCtx, DiscriminatedUnionDef, LazyDef, NodeKind, ObjectDef, Schema,
    TransformFn, UnknownKeys,
};
use crate::value::{format_number, Object, Value};

use super::checks::run_checks;
use super::coerce;
use super::merge::merge_values;
use super::{ParseContext, Payload};

/// Validates `input` against `schema`.
pub(crate) fn run<'a>(
    schema: &'a Schema,
    input: Value,
    ctx: &'a ParseContext,
) -> BoxFuture<'a, Result<Payload, EngineError>> {
    async move {
        let payload = dispatch(schema, input, ctx).await?;
        if schema.checks().is_empty() || failed_type_test(&payload) {
            return Ok(payload);
        }
        run_checks(schema, payload, ctx).await
    }
    .boxed()
}

/// The node rejected the value's type outright; its checks cannot apply.
fn failed_type_test(payload: &Payload) -> bool {
    payload
        .issues
        .iter()
        .any(|issue| issue.path.is_root() && matches!(issue.kind, IssueKind::InvalidType { .. }))
}

/// Kinds that hand the raw input to a child instead of inspecting it.
fn passes_raw(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Any
            | NodeKind::Unknown
            | NodeKind::Lazy(_)
            | NodeKind::Optional(_)
            | NodeKind::Nullable(_)
            | NodeKind::Default { .. }
            | NodeKind::Prefault { .. }
            | NodeKind::Catch { .. }
            | NodeKind::NonOptional(_)
            | NodeKind::Success(_)
            | NodeKind::Readonly(_)
            | NodeKind::Pipe(..)
            | NodeKind::Union(_)
            | NodeKind::DiscriminatedUnion(_)
            | NodeKind::Intersection(..)
    )
}

/// Reads through a shared cell without detaching plain values.
fn peek(value: &Value) -> Cow<'_, Value> {
    match value {
        Value::Shared(_) => Cow::Owned(value.clone().detach()),
        other => Cow::Borrowed(other),
    }
}

fn reject(schema: &Schema, ctx: &ParseContext, issue: Issue, value: Value) -> Payload {
    let issue = ctx.own_issue(issue, schema.error_message(), &value);
    Payload::with_issue(value, issue)
}

fn type_test(
    schema: &Schema,
    ctx: &ParseContext,
    value: Value,
    expected: &'static str,
    ok: bool,
) -> Payload {
    if ok {
        Payload::new(value)
    } else {
        let issue = Issue::invalid_type(expected, &value);
        reject(schema, ctx, issue, value)
    }
}

async fn dispatch(
    schema: &Schema,
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let kind = schema.def();
    let input = if passes_raw(kind) { input } else { input.detach() };

    let payload = match kind {
        NodeKind::String { coerce } => {
            let value = if *coerce { coerce::to_string(input) } else { input };
            let ok = matches!(value, Value::String(_));
            type_test(schema, ctx, value, "string", ok)
        }
        NodeKind::Number { coerce } => {
            let value = if *coerce { coerce::to_number(input) } else { input };
            match value {
                Value::Number(n) if n.is_infinite() => {
                    reject(schema, ctx, Issue::new(IssueKind::NotFinite), value)
                }
                _ => {
                    let ok = matches!(&value, Value::Number(n) if !n.is_nan());
                    type_test(schema, ctx, value, "number", ok)
                }
            }
        }
        NodeKind::BigInt { coerce } => {
            let value = if *coerce { coerce::to_bigint(input) } else { input };
            let ok = matches!(value, Value::BigInt(_));
            type_test(schema, ctx, value, "bigint", ok)
        }
        NodeKind::Boolean { coerce } => {
            let value = if *coerce { coerce::to_boolean(input) } else { input };
            let ok = matches!(value, Value::Bool(_));
            type_test(schema, ctx, value, "boolean", ok)
        }
        NodeKind::Date { coerce } => {
            let value = if *coerce { coerce::to_date(input) } else { input };
            let ok = matches!(&value, Value::Date(ms) if !ms.is_nan());
            type_test(schema, ctx, value, "date", ok)
        }
        NodeKind::Symbol => {
            let ok = matches!(input, Value::Symbol(_));
            type_test(schema, ctx, input, "symbol", ok)
        }
        NodeKind::Null => {
            let ok = input.is_null();
            type_test(schema, ctx, input, "null", ok)
        }
        NodeKind::Undefined => {
            let ok = input.is_undefined();
            type_test(schema, ctx, input, "undefined", ok)
        }
        NodeKind::Void => {
            let ok = input.is_undefined();
            type_test(schema, ctx, input, "void", ok)
        }
        NodeKind::NaN => {
            let ok = matches!(&input, Value::Number(n) if n.is_nan());
            type_test(schema, ctx, input, "nan", ok)
        }
        NodeKind::Never => type_test(schema, ctx, input, "never", false),
        NodeKind::Any | NodeKind::Unknown => Payload::new(input),
        NodeKind::Literal(values) => {
            if values.iter().any(|literal| literal.matches(&input)) {
                Payload::new(input)
            } else {
                let issue = Issue::new(IssueKind::InvalidLiteral {
                    expected: values.clone(),
                });
                reject(schema, ctx, issue, input)
            }
        }
        NodeKind::Enum(values) => {
            if values.iter().any(|option| option.matches(&input)) {
                Payload::new(input)
            } else {
                let issue = Issue::new(IssueKind::InvalidEnumValue {
                    options: values.clone(),
                });
                reject(schema, ctx, issue, input)
            }
        }
        NodeKind::Array(element) => parse_array(schema, element, input, ctx).await?,
        NodeKind::Object(def) => parse_object(schema, def, input, ctx).await?,
        NodeKind::Record { key, value } => parse_record(schema, key, value, input, ctx).await?,
        NodeKind::Map { key, value } => parse_map(schema, key, value, input, ctx).await?,
        NodeKind::Set(element) => parse_set(schema, element, input, ctx).await?,
        NodeKind::Tuple { items, rest } => {
            parse_tuple(schema, items, rest.as_ref(), input, ctx).await?
        }
        NodeKind::Union(options) => parse_union(schema, options, input, ctx).await?,
        NodeKind::DiscriminatedUnion(def) => parse_discriminated(schema, def, input, ctx).await?,
        NodeKind::Intersection(left, right) => {
            parse_intersection(schema, left, right, input, ctx).await?
        }
        NodeKind::Lazy(def) => parse_lazy(schema, def, input, ctx).await?,
        NodeKind::Pipe(first, second) => {
            let head = run(first, input, ctx).await?;
            if !head.is_valid() {
                return Ok(head);
            }
            run(second, head.value, ctx).await?
        }
        NodeKind::Transform(TransformFn::Sync(f)) => {
            let mut refinement_ctx = RefinementCtx::new();
            let value = f(input, &mut refinement_ctx);
            Payload {
                value,
                issues: refinement_ctx.into_issues(),
            }
        }
        NodeKind::Transform(TransformFn::Async(f)) => {
            if !ctx.is_async() {
                return Err(EngineError::AsyncInSync);
            }
            Payload::new(f(input).await)
        }
        NodeKind::Optional(inner) => {
            if peek(&input).is_undefined() {
                Payload::new(Value::Undefined)
            } else {
                run(inner, input, ctx).await?
            }
        }
        NodeKind::Nullable(inner) => {
            if peek(&input).is_null() {
                Payload::new(Value::Null)
            } else {
                run(inner, input, ctx).await?
            }
        }
        NodeKind::Default { inner, value } => {
            if peek(&input).is_undefined() {
                Payload::new(value())
            } else {
                run(inner, input, ctx).await?
            }
        }
        NodeKind::Prefault { inner, value } => {
            let input = if peek(&input).is_undefined() {
                value()
            } else {
                input
            };
            run(inner, input, ctx).await?
        }
        NodeKind::Catch { inner, fallback } => {
            let result = run(inner, input.clone(), ctx).await?;
            match ParseError::from_vec(result.issues) {
                None => Payload::new(result.value),
                Some(error) => {
                    trace!(issues = error.len(), "catch replaced a failed value");
                    let error = error.with_error_map(ctx.options().error_map.clone());
                    Payload::new(fallback(&CatchCtx { error, input }))
                }
            }
        }
        NodeKind::NonOptional(inner) => {
            let result = run(inner, input, ctx).await?;
            if result.is_valid() && peek(&result.value).is_undefined() {
                let issue = Issue::new(IssueKind::InvalidType {
                    expected: "nonoptional",
                    received: "undefined",
                });
                reject(schema, ctx, issue, result.value)
            } else {
                result
            }
        }
        NodeKind::Success(inner) => {
            let result = run(inner, input, ctx).await?;
            Payload::new(Value::Bool(result.is_valid()))
        }
        NodeKind::Readonly(inner) => run(inner, input, ctx).await?,
        NodeKind::TemplateLiteral(def) => match &input {
            Value::String(s) if def.regex.is_match(s) => Payload::new(input),
            Value::String(_) => {
                let issue = Issue::new(IssueKind::InvalidFormat {
                    format: StringFormat::TemplateLiteral,
                    pattern: Some(def.regex.as_str().to_string()),
                });
                reject(schema, ctx, issue, input)
            }
            _ => type_test(schema, ctx, input, "template_literal", false),
        },
        NodeKind::Custom(predicate) => {
            if predicate(&input) {
                Payload::new(input)
            } else {
                let issue = Issue::new(IssueKind::Custom { params: None });
                reject(schema, ctx, issue, input)
            }
        }
        NodeKind::File => {
            let ok = matches!(input, Value::File(_));
            type_test(schema, ctx, input, "file", ok)
        }
        NodeKind::Promise(inner) => {
            if !ctx.is_async() {
                return Err(EngineError::AsyncInSync);
            }
            let settled = match input {
                Value::Promise(promise) => promise.settle().await,
                other => other,
            };
            run(inner, settled, ctx).await?
        }
        NodeKind::Function {
            input: args,
            output,
        } => match input {
            Value::Function(f) => Payload::new(Value::Function(wrap_function(
                args.clone(),
                output.clone(),
                f,
                ctx.options().clone(),
            ))),
            other => type_test(schema, ctx, other, "function", false),
        },
    };
    Ok(payload)
}

async fn parse_array(
    schema: &Schema,
    element: &Schema,
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let items = match input {
        Value::Array(items) => items,
        other => return Ok(type_test(schema, ctx, other, "array", false)),
    };
    let mut payload = Payload::default();
    let mut values = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let result = run(element, item, ctx).await?;
        values.push(payload.absorb(result, &PathSegment::Index(index)));
    }
    payload.value = Value::Array(values);
    Ok(payload)
}

async fn parse_object(
    schema: &Schema,
    def: &ObjectDef,
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let mut obj = match input {
        Value::Object(obj) => obj,
        other => return Ok(type_test(schema, ctx, other, "object", false)),
    };
    let original = ctx
        .options()
        .report_input
        .then(|| Value::Object(obj.clone()));

    let mut payload = Payload::default();
    let mut out = Object::with_capacity(def.shape.len());
    for (key, field) in &def.shape {
        let value = obj.get_mut(key).map(std::mem::take);
        let present = value.is_some();
        let result = run(field, value.unwrap_or_default(), ctx).await?;
        let output = payload.absorb(result, &PathSegment::key(key.as_str()));
        if present || !output.is_undefined() {
            out.insert(key.clone(), output);
        }
    }

    let extras: Vec<(String, Value)> = obj
        .into_iter()
        .filter(|(key, _)| !def.shape.contains_key(key))
        .collect();
    match &def.unknown_keys {
        UnknownKeys::Strip => {
            if !extras.is_empty() {
                trace!(count = extras.len(), "stripped unknown keys");
            }
        }
        UnknownKeys::Passthrough => out.extend(extras),
        UnknownKeys::Strict => {
            if !extras.is_empty() {
                let keys = extras.into_iter().map(|(key, _)| key).collect();
                let issue = ctx.own_issue(
                    Issue::new(IssueKind::UnrecognizedKeys { keys }),
                    schema.error_message(),
                    original.as_ref().unwrap_or(&Value::Undefined),
                );
                payload.issues.push(issue);
            }
        }
        UnknownKeys::Catchall(catchall) => {
            for (key, value) in extras {
                let result = run(catchall, value, ctx).await?;
                let output = payload.absorb(result, &PathSegment::key(key.as_str()));
                out.insert(key, output);
            }
        }
    }
    payload.value = Value::Object(out);
    Ok(payload)
}

/// The listed keys of an exhaustive record key schema.
fn exhaustive_keys(key: &Schema) -> Option<Vec<String>> {
    match key.def() {
        NodeKind::Enum(values) | NodeKind::Literal(values) => {
            Some(values.iter().map(|v| v.to_template_string()).collect())
        }
        _ => None,
    }
}

async fn parse_record(
    schema: &Schema,
    key_schema: &Schema,
    value_schema: &Schema,
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let mut obj = match input {
        Value::Object(obj) => obj,
        other => return Ok(type_test(schema, ctx, other, "record", false)),
    };
    let mut payload = Payload::default();
    let mut out = Object::with_capacity(obj.len());

    if let Some(keys) = exhaustive_keys(key_schema) {
        for key in &keys {
            let value = obj.get_mut(key).map(std::mem::take);
            let present = value.is_some();
            let result = run(value_schema, value.unwrap_or_default(), ctx).await?;
            let output = payload.absorb(result, &PathSegment::key(key.as_str()));
            if present || !output.is_undefined() {
                out.insert(key.clone(), output);
            }
        }
        let extras: Vec<String> = obj.keys().filter(|k| !keys.contains(k)).cloned().collect();
        if !extras.is_empty() {
            let issue = ctx.own_issue(
                Issue::new(IssueKind::UnrecognizedKeys { keys: extras }),
                schema.error_message(),
                &Value::Object(obj),
            );
            payload.issues.push(issue);
        }
    } else {
        for (key, value) in obj {
            let key_result = run(key_schema, Value::String(key.clone()), ctx).await?;
            if !key_result.is_valid() {
                let issue = ctx.own_issue(
                    Issue::new(IssueKind::InvalidKey {
                        origin: Origin::Record,
                        issues: key_result.issues,
                    }),
                    schema.error_message(),
                    &Value::String(key),
                );
                payload.issues.push(issue);
                continue;
            }
            let out_key = match key_result.value {
                Value::String(s) => s,
                _ => key.clone(),
            };
            let result = run(value_schema, value, ctx).await?;
            let output = payload.absorb(result, &PathSegment::key(key.as_str()));
            out.insert(out_key, output);
        }
    }
    payload.value = Value::Object(out);
    Ok(payload)
}

/// The path segment for a map key, if the key has a natural one.
fn map_key_segment(key: &Value) -> Option<PathSegment> {
    match peek(key).as_ref() {
        Value::String(s) => Some(PathSegment::Key(s.clone())),
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && n.is_finite() => {
            Some(PathSegment::Index(*n as usize))
        }
        Value::Number(n) => Some(PathSegment::Key(format_number(*n))),
        _ => None,
    }
}

async fn parse_map(
    schema: &Schema,
    key_schema: &Schema,
    value_schema: &Schema,
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let entries = match input {
        Value::Map(entries) => entries,
        other => return Ok(type_test(schema, ctx, other, "map", false)),
    };
    let mut payload = Payload::default();
    let mut out = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let key_result = run(key_schema, key.clone(), ctx).await?;
        let value_result = run(value_schema, value, ctx).await?;

        if !key_result.is_valid() {
            let issue = ctx.own_issue(
                Issue::new(IssueKind::InvalidKey {
                    origin: Origin::Map,
                    issues: key_result.issues,
                }),
                schema.error_message(),
                &key,
            );
            payload.issues.push(issue);
        }

        let output = if value_result.is_valid() {
            value_result.value
        } else {
            match map_key_segment(&key) {
                Some(segment) => payload.absorb(value_result, &segment),
                None => {
                    let issue = ctx.own_issue(
                        Issue::new(IssueKind::InvalidElement {
                            origin: Origin::Map,
                            key: key.clone(),
                            issues: value_result.issues,
                        }),
                        schema.error_message(),
                        &key,
                    );
                    payload.issues.push(issue);
                    value_result.value
                }
            }
        };
        out.push((key_result.value, output));
    }
    payload.value = Value::Map(out);
    Ok(payload)
}

async fn parse_set(
    schema: &Schema,
    element: &Schema,
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let items = match input {
        Value::Set(items) => items,
        other => return Ok(type_test(schema, ctx, other, "set", false)),
    };
    let mut payload = Payload::default();
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        let result = run(element, item, ctx).await?;
        payload.issues.extend(result.issues);
        values.push(result.value);
    }
    payload.value = Value::Set(values);
    Ok(payload)
}

async fn parse_tuple(
    schema: &Schema,
    items: &[Schema],
    rest: Option<&Schema>,
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let values = match input {
        Value::Array(values) => values,
        other => return Ok(type_test(schema, ctx, other, "tuple", false)),
    };
    // Items from here on may be left out.
    let optional_start = items
        .iter()
        .rposition(|item| !item.is_optional())
        .map_or(0, |index| index + 1);

    if rest.is_none() {
        let bound = if values.len() > items.len() {
            Some(IssueKind::TooBig {
                origin: Origin::Array,
                maximum: Numeric::Number(items.len() as f64),
                inclusive: true,
                exact: false,
            })
        } else if values.len() < optional_start {
            Some(IssueKind::TooSmall {
                origin: Origin::Array,
                minimum: Numeric::Number(optional_start as f64),
                inclusive: true,
                exact: false,
            })
        } else {
            None
        };
        if let Some(kind) = bound {
            return Ok(reject(schema, ctx, Issue::new(kind), Value::Array(values)));
        }
    }

    let mut payload = Payload::default();
    let mut out = Vec::with_capacity(values.len());
    let mut remaining = values.into_iter();
    for (index, item_schema) in items.iter().enumerate() {
        let item = remaining.next();
        if item.is_none() && index >= optional_start {
            break;
        }
        let result = run(item_schema, item.unwrap_or_default(), ctx).await?;
        out.push(payload.absorb(result, &PathSegment::Index(index)));
    }
    if let Some(rest) = rest {
        for (offset, item) in remaining.enumerate() {
            let result = run(rest, item, ctx).await?;
            out.push(payload.absorb(result, &PathSegment::Index(items.len() + offset)));
        }
    }
    payload.value = Value::Array(out);
    Ok(payload)
}

async fn parse_union(
    schema: &Schema,
    options: &[Schema],
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let mut errors = Vec::with_capacity(options.len());
    for option in options {
        let result = run(option, input.clone(), ctx).await?;
        if result.is_valid() {
            return Ok(result);
        }
        errors.push(result.issues);
    }
    Ok(reject(
        schema,
        ctx,
        Issue::new(IssueKind::InvalidUnion { errors }),
        input,
    ))
}

async fn parse_discriminated(
    schema: &Schema,
    def: &DiscriminatedUnionDef,
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let lookup = match peek(&input).as_ref() {
        Value::Object(obj) => Some(
            def.index
                .lookup(obj.get(&def.discriminator).unwrap_or(&Value::Undefined)),
        ),
        _ => None,
    };
    let Some(member) = lookup else {
        return Ok(type_test(schema, ctx, input.detach(), "object", false));
    };
    match member {
        Some(member) => run(&def.options[member], input, ctx).await,
        None if def.fallback => parse_union(schema, &def.options, input, ctx).await,
        None => {
            let issue = Issue::new(IssueKind::InvalidUnionDiscriminator {
                discriminator: def.discriminator.clone(),
                options: def.index.values(),
            });
            Ok(reject(schema, ctx, issue, input))
        }
    }
}

async fn parse_intersection(
    schema: &Schema,
    left: &Schema,
    right: &Schema,
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let left = run(left, input.clone(), ctx).await?;
    let right = run(right, input.clone(), ctx).await?;
    if !left.is_valid() || !right.is_valid() {
        let mut issues = left.issues;
        issues.extend(right.issues);
        return Ok(Payload {
            value: left.value,
            issues,
        });
    }
    match merge_values(left.value, right.value) {
        Ok(value) => Ok(Payload::new(value)),
        Err(merge_path) => {
            let issue = Issue::new(IssueKind::InvalidIntersectionTypes { merge_path });
            Ok(reject(schema, ctx, issue, input))
        }
    }
}

async fn parse_lazy(
    schema: &Schema,
    def: &LazyDef,
    input: Value,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    let target = def.resolve()?;
    let guard = match &input {
        Value::Shared(cell) => Some((schema.id(), cell.id())),
        _ => None,
    };
    let Some((node, cell)) = guard else {
        return run(&target, input, ctx).await;
    };
    if !ctx.enter(node, cell) {
        trace!(node, cell, "value already being validated by this node");
        return Ok(Payload::new(input));
    }
    let result = run(&target, input, ctx).await;
    ctx.leave(node, cell);
    result
}
