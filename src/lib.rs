//! # Assay
//!
//! A runtime schema validation library. Schemas describe the shape of a
//! value; parsing checks a value against a schema and either returns the
//! (possibly transformed) output or every problem found in the input.
//!
//! ## Overview
//!
//! Parsing never stops at the first failure. Every child of an object,
//! array, or tuple is attempted, and each failure becomes an [`Issue`] with
//! the path to the offending value. The issues of one call are collected
//! into a [`ParseError`], which is never empty and combines through
//! stillwater's `Semigroup`.
//!
//! ## Core Types
//!
//! - [`Schema`]: an immutable, shareable schema node, built through typed
//!   builders such as [`StringSchema`] and [`ObjectSchema`]
//! - [`SchemaLike`]: the modifiers and the parse API shared by every schema
//! - [`Value`]: the dynamic input and output value
//! - [`Check`]: a validator or value rewrite attached to a node
//! - [`Issue`] and [`ParseError`]: structured validation failures
//! - [`ParseOptions`]: per-call configuration, such as the error map
//!
//! ## Example
//!
//! ```rust
//! use assay::{IssueCode, Path, Schema, SchemaLike};
//! use serde_json::json;
//!
//! let user = Schema::object()
//!     .field("name", Schema::string().min(1))
//!     .field("age", Schema::number().int().positive());
//!
//! let output = user.parse(json!({"name": "Ada", "age": 36})).unwrap();
//! assert_eq!(output.to_json(), json!({"name": "Ada", "age": 36}));
//!
//! let error = user.parse(json!({"name": "", "age": -1})).unwrap_err();
//! let error = error.as_parse_error().unwrap();
//! assert_eq!(error.len(), 2);
//! assert_eq!(error.first().code(), IssueCode::TooSmall);
//! assert_eq!(error.first().path, Path::root().push_key("name"));
//! ```
//!
//! Asynchronous refinements, transforms, and promise schemas need
//! [`SchemaLike::parse_async`]; a synchronous parse that meets one reports
//! [`EngineError::AsyncInSync`].

pub mod check;
pub mod engine;
pub mod error;
pub mod path;
pub mod registry;
pub mod schema;
pub mod value;

pub use check::{
    BigIntFormat, Bag, Check, CheckKind, DateTimeOptions, NumberFormat, RefinementCtx,
    StringFormat,
};
pub use engine::{ParseMode, ParseOptions, Payload};
pub use error::{
    DefaultErrorMap, EngineError, Error, ErrorMap, ErrorTree, FlattenedError, Issue, IssueCode,
    IssueKind, Numeric, Origin, ParseError, SchemaBuildError,
};
pub use path::{Path, PathSegment};
pub use registry::{Metadata, RegistryError, SchemaRegistry};
pub use schema::{
    ArraySchema, BigIntSchema, CatchCtx, DateSchema, FileSchema, FunctionSchema, NumberSchema,
    ObjectSchema, SafeParseResult, Schema, SchemaKind, SchemaLike, SetSchema, StringSchema,
    TemplatePart, TupleSchema, UnknownKeys, WalkControl,
};
pub use value::{FileValue, FunctionValue, Object, Primitive, PromiseValue, SharedValue, Value};

/// Type alias for validation results using [`ParseError`].
pub type ValidationResult<T> = stillwater::Validation<T, ParseError>;
