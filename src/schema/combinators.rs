//! Composite constructors: literals, enums, unions, intersections, records,
//! maps, pipes, transforms, and custom predicates.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::check::RefinementCtx;
use crate::error::SchemaBuildError;
use crate::value::{Primitive, Value};

use super::discriminator::DiscriminatorIndex;
use super::node::{DiscriminatedUnionDef, NodeKind, TransformFn};
use super::traits::SchemaLike;
use super::Schema;

impl Schema {
    /// Accepts exactly `value`.
    pub fn literal(value: impl Into<Primitive>) -> Schema {
        Schema::from_kind(NodeKind::Literal(vec![value.into()]))
    }

    /// Accepts any one of `values`.
    pub fn literals<I, P>(values: I) -> Schema
    where
        I: IntoIterator<Item = P>,
        P: Into<Primitive>,
    {
        Schema::from_kind(NodeKind::Literal(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// A closed set of options, reported as `invalid_enum_value` on mismatch.
    pub fn enumeration<I, P>(values: I) -> Schema
    where
        I: IntoIterator<Item = P>,
        P: Into<Primitive>,
    {
        Schema::from_kind(NodeKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    /// Accepts the first member that parses without issues.
    ///
    /// When every member fails, one `invalid_union` issue carries the issues
    /// of every member, in member order.
    pub fn union<I, S>(options: I) -> Schema
    where
        I: IntoIterator<Item = S>,
        S: SchemaLike,
    {
        Schema::from_kind(NodeKind::Union(
            options.into_iter().map(SchemaLike::into_schema).collect(),
        ))
    }

    /// A union dispatched on the literal value of `discriminator`.
    ///
    /// Fails if two options register the same discriminator value, or if an
    /// option declares no literal value for the key.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{IssueCode, Schema, SchemaLike};
    /// use serde_json::json;
    ///
    /// let schema = Schema::discriminated_union(
    ///     "type",
    ///     [
    ///         Schema::object().field("type", Schema::literal("A")).field("x", Schema::string()),
    ///         Schema::object().field("type", Schema::literal("B")).field("y", Schema::number()),
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// let error = schema.safe_parse(json!({"type": "C"})).unwrap().into_result().unwrap_err();
    /// assert_eq!(error.len(), 1);
    /// assert_eq!(error.first().code(), IssueCode::InvalidUnionDiscriminator);
    /// ```
    pub fn discriminated_union<I, S>(
        discriminator: impl Into<String>,
        options: I,
    ) -> Result<Schema, SchemaBuildError>
    where
        I: IntoIterator<Item = S>,
        S: SchemaLike,
    {
        Self::build_discriminated_union(discriminator.into(), options, false)
    }

    /// Like [`discriminated_union`](Self::discriminated_union), but an
    /// unmatched discriminator falls back to trying every option in order.
    pub fn discriminated_union_with_fallback<I, S>(
        discriminator: impl Into<String>,
        options: I,
    ) -> Result<Schema, SchemaBuildError>
    where
        I: IntoIterator<Item = S>,
        S: SchemaLike,
    {
        Self::build_discriminated_union(discriminator.into(), options, true)
    }

    fn build_discriminated_union<I, S>(
        discriminator: String,
        options: I,
        fallback: bool,
    ) -> Result<Schema, SchemaBuildError>
    where
        I: IntoIterator<Item = S>,
        S: SchemaLike,
    {
        let options: Vec<Schema> = options.into_iter().map(SchemaLike::into_schema).collect();
        let index = DiscriminatorIndex::build(&discriminator, &options)?;
        debug!(
            discriminator = %discriminator,
            options = options.len(),
            values = index.len(),
            "built discriminator index"
        );
        Ok(Schema::from_kind(NodeKind::DiscriminatedUnion(
            DiscriminatedUnionDef {
                discriminator,
                options,
                index: Arc::new(index),
                fallback,
            },
        )))
    }

    /// Requires the input to satisfy both schemas and merges their outputs.
    pub fn intersection(left: impl SchemaLike, right: impl SchemaLike) -> Schema {
        Schema::from_kind(NodeKind::Intersection(
            left.into_schema(),
            right.into_schema(),
        ))
    }

    /// An object whose keys satisfy `key` and values satisfy `value`.
    ///
    /// With an enum or literal key schema the record is exhaustive: every
    /// listed key is validated and other keys are unrecognized.
    pub fn record(key: impl SchemaLike, value: impl SchemaLike) -> Schema {
        Schema::from_kind(NodeKind::Record {
            key: key.into_schema(),
            value: value.into_schema(),
        })
    }

    pub fn map(key: impl SchemaLike, value: impl SchemaLike) -> Schema {
        Schema::from_kind(NodeKind::Map {
            key: key.into_schema(),
            value: value.into_schema(),
        })
    }

    /// Runs `input`, then feeds its output to `output`.
    pub fn pipe(input: impl SchemaLike, output: impl SchemaLike) -> Schema {
        Schema::from_kind(NodeKind::Pipe(input.into_schema(), output.into_schema()))
    }

    /// Maps any input; issues may be reported through the context.
    pub fn transform<F>(f: F) -> Schema
    where
        F: Fn(Value, &mut RefinementCtx) -> Value + Send + Sync + 'static,
    {
        Schema::from_kind(NodeKind::Transform(TransformFn::Sync(Arc::new(f))))
    }

    /// Maps any input asynchronously; requires an async parse.
    pub fn transform_async<F>(f: F) -> Schema
    where
        F: Fn(Value) -> BoxFuture<'static, Value> + Send + Sync + 'static,
    {
        Schema::from_kind(NodeKind::Transform(TransformFn::Async(Arc::new(f))))
    }

    /// Rewrites the raw input before `schema` sees it.
    pub fn preprocess<F>(f: F, schema: impl SchemaLike) -> Schema
    where
        F: Fn(Value, &mut RefinementCtx) -> Value + Send + Sync + 'static,
    {
        Schema::pipe(Schema::transform(f), schema)
    }

    /// Accepts values for which `predicate` holds.
    pub fn custom<F>(predicate: F) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Schema::from_kind(NodeKind::Custom(Arc::new(predicate)))
    }
}
