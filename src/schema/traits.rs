//! The common schema surface.
//!
//! [`SchemaLike`] is implemented by [`Schema`] and every typed builder. It
//! provides the modifiers shared by all kinds (wrapping, refinement,
//! composition) and the parse API.

use futures::future::{BoxFuture, FutureExt};
use rayon::prelude::*;
use stillwater::Validation;

use crate::check::{Check, RefinementCtx};
use crate::engine::{self, ParseOptions};
use crate::error::{EngineError, Error, ParseError};
use crate::value::Value;

use super::array::ArraySchema;
use super::node::{CatchCtx, NodeKind};
use super::Schema;

/// Result of a non-throwing parse: validation failures are data, programmer
/// errors are the outer `Err`.
pub type SafeParseResult = Result<Validation<Value, ParseError>, EngineError>;

/// A schema, or a typed builder around one.
///
/// Modifiers that keep the node kind (`check`, `refine`, `error`, ...) return
/// `Self`, so typed builders keep their constraint methods. Modifiers that
/// wrap the node (`optional`, `pipe`, `or`, ...) return a plain [`Schema`].
///
/// # Example
///
/// ```rust
/// use assay::{Schema, SchemaLike};
///
/// let schema = Schema::object()
///     .field("name", Schema::string().min(1))
///     .field("age", Schema::number().int().nonnegative())
///     .field("email", Schema::string().email().optional());
///
/// let input = serde_json::json!({"name": "Alice", "age": 30});
/// assert!(schema.safe_parse(input).unwrap().is_success());
/// ```
pub trait SchemaLike: Send + Sync + Sized {
    fn schema(&self) -> &Schema;

    fn into_schema(self) -> Schema;

    /// Rewraps a rebuilt node of the same kind.
    fn with_schema(self, schema: Schema) -> Self;

    /// Attaches a check.
    fn check(self, check: Check) -> Self {
        let schema = self.schema().with_check_added(check);
        self.with_schema(schema)
    }

    /// Attaches a predicate; failures become `custom` issues with `message`.
    fn refine<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.check(Check::refine(predicate).message(message))
    }

    /// Attaches a predicate that completes later; requires an async parse.
    fn refine_async<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> BoxFuture<'static, bool> + Send + Sync + 'static,
    {
        self.check(Check::refine_async(predicate).message(message))
    }

    /// Attaches a refinement that may report any number of issues.
    fn super_refine<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &mut RefinementCtx) + Send + Sync + 'static,
    {
        self.check(Check::super_refine(f))
    }

    /// Rewrites the value for later checks and the output.
    fn overwrite<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.check(Check::overwrite(f))
    }

    /// Message for this node's own structural issues.
    fn error(self, message: impl Into<String>) -> Self {
        let schema = self.schema().with_error(message.into());
        self.with_schema(schema)
    }

    fn describe(self, description: impl Into<String>) -> Self {
        let schema = self.schema().with_description(description.into());
        self.with_schema(schema)
    }

    fn optional(self) -> Schema {
        Schema::from_kind(NodeKind::Optional(self.into_schema()))
    }

    fn nullable(self) -> Schema {
        Schema::from_kind(NodeKind::Nullable(self.into_schema()))
    }

    /// Accepts `null` and `undefined`.
    fn nullish(self) -> Schema {
        self.nullable().optional()
    }

    /// Substitutes `value` for `undefined` input, skipping validation.
    fn default(self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        self.default_with(move || value.clone())
    }

    fn default_with<F>(self, f: F) -> Schema
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Schema::from_kind(NodeKind::Default {
            inner: self.into_schema(),
            value: std::sync::Arc::new(f),
        })
    }

    /// Substitutes `value` for `undefined` input, then validates it.
    fn prefault(self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        self.prefault_with(move || value.clone())
    }

    fn prefault_with<F>(self, f: F) -> Schema
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Schema::from_kind(NodeKind::Prefault {
            inner: self.into_schema(),
            value: std::sync::Arc::new(f),
        })
    }

    /// Replaces any failure with `value`.
    fn catch(self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        self.catch_with(move |_| value.clone())
    }

    /// Replaces any failure with a value computed from the error and input.
    fn catch_with<F>(self, f: F) -> Schema
    where
        F: Fn(&CatchCtx) -> Value + Send + Sync + 'static,
    {
        Schema::from_kind(NodeKind::Catch {
            inner: self.into_schema(),
            fallback: std::sync::Arc::new(f),
        })
    }

    /// Rejects `undefined` even if the inner schema accepts it.
    fn nonoptional(self) -> Schema {
        Schema::from_kind(NodeKind::NonOptional(self.into_schema()))
    }

    fn readonly(self) -> Schema {
        Schema::from_kind(NodeKind::Readonly(self.into_schema()))
    }

    /// Outputs whether the inner schema accepted the input.
    fn success(self) -> Schema {
        Schema::from_kind(NodeKind::Success(self.into_schema()))
    }

    /// Feeds the output of this schema into `out`.
    fn pipe(self, out: impl SchemaLike) -> Schema {
        Schema::pipe(self, out)
    }

    /// Maps the validated value.
    fn transform<F>(self, f: F) -> Schema
    where
        F: Fn(Value, &mut RefinementCtx) -> Value + Send + Sync + 'static,
    {
        Schema::pipe(self, Schema::transform(f))
    }

    fn transform_async<F>(self, f: F) -> Schema
    where
        F: Fn(Value) -> BoxFuture<'static, Value> + Send + Sync + 'static,
    {
        Schema::pipe(self, Schema::transform_async(f))
    }

    fn or(self, other: impl SchemaLike) -> Schema {
        Schema::union([self.into_schema(), other.into_schema()])
    }

    fn and(self, other: impl SchemaLike) -> Schema {
        Schema::intersection(self, other)
    }

    fn array(self) -> ArraySchema {
        Schema::array(self)
    }

    /// Parses synchronously, returning the output or an aggregate error.
    fn parse(&self, input: impl Into<Value>) -> Result<Value, Error> {
        self.parse_with(input, &ParseOptions::default())
    }

    fn parse_with(&self, input: impl Into<Value>, options: &ParseOptions) -> Result<Value, Error> {
        let validation = self.safe_parse_with(input, options)?;
        Ok(validation.into_result()?)
    }

    /// Parses synchronously without failing on invalid input.
    fn safe_parse(&self, input: impl Into<Value>) -> SafeParseResult {
        self.safe_parse_with(input, &ParseOptions::default())
    }

    fn safe_parse_with(&self, input: impl Into<Value>, options: &ParseOptions) -> SafeParseResult {
        engine::parse_sync(self.schema(), input.into(), options)
    }

    /// Parses, awaiting asynchronous checks, transforms, and promises in place.
    fn parse_async(&self, input: impl Into<Value>) -> BoxFuture<'static, Result<Value, Error>> {
        self.parse_async_with(input, ParseOptions::default())
    }

    fn parse_async_with(
        &self,
        input: impl Into<Value>,
        options: ParseOptions,
    ) -> BoxFuture<'static, Result<Value, Error>> {
        let fut = self.safe_parse_async_with(input, options);
        async move {
            let validation = fut.await?;
            Ok(validation.into_result()?)
        }
        .boxed()
    }

    fn safe_parse_async(&self, input: impl Into<Value>) -> BoxFuture<'static, SafeParseResult> {
        self.safe_parse_async_with(input, ParseOptions::default())
    }

    fn safe_parse_async_with(
        &self,
        input: impl Into<Value>,
        options: ParseOptions,
    ) -> BoxFuture<'static, SafeParseResult> {
        engine::parse_async(self.schema().clone(), input.into(), options)
    }

    /// Parses independent inputs in parallel; results keep input order.
    fn safe_parse_many(&self, inputs: Vec<Value>) -> Vec<SafeParseResult> {
        let schema = self.schema();
        inputs
            .into_par_iter()
            .map(|input| engine::parse_sync(schema, input, &ParseOptions::default()))
            .collect()
    }
}

impl SchemaLike for Schema {
    fn schema(&self) -> &Schema {
        self
    }

    fn into_schema(self) -> Schema {
        self
    }

    fn with_schema(self, schema: Schema) -> Self {
        schema
    }
}

/// Implements [`SchemaLike`] and `From<_> for Schema` for a newtype builder.
macro_rules! schema_builder {
    ($builder:ident) => {
        impl $crate::schema::SchemaLike for $builder {
            fn schema(&self) -> &$crate::schema::Schema {
                &self.0
            }

            fn into_schema(self) -> $crate::schema::Schema {
                self.0
            }

            fn with_schema(self, schema: $crate::schema::Schema) -> Self {
                $builder(schema)
            }
        }

        impl From<$builder> for $crate::schema::Schema {
            fn from(builder: $builder) -> Self {
                builder.0
            }
        }

        impl std::fmt::Debug for $builder {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($builder)).field(&self.0).finish()
            }
        }
    };
}

pub(crate) use schema_builder;
