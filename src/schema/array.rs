//! Sequence schemas: arrays, sets, and tuples.

use crate::check::Check;

use super::node::NodeKind;
use super::traits::{schema_builder, SchemaLike};
use super::Schema;

/// A schema for validating arrays.
///
/// Every element is validated, even after an earlier element failed, and
/// each element issue is prefixed with its index. Length constraints are
/// reported as a single issue on the array itself.
///
/// # Example
///
/// ```rust
/// use assay::{IssueCode, Schema, SchemaLike, Value};
///
/// let schema = Schema::array(Schema::string()).min(2);
///
/// let error = schema.safe_parse(Value::array(["a"])).unwrap().into_result().unwrap_err();
/// assert_eq!(error.len(), 1);
/// assert_eq!(error.first().code(), IssueCode::TooSmall);
/// ```
#[derive(Clone)]
pub struct ArraySchema(Schema);

schema_builder!(ArraySchema);

impl ArraySchema {
    pub(crate) fn new(element: Schema) -> Self {
        Self(Schema::from_kind(NodeKind::Array(element)))
    }

    pub fn element(&self) -> &Schema {
        match self.0.def() {
            NodeKind::Array(element) => element,
            _ => unreachable!("ArraySchema always wraps an array node"),
        }
    }

    pub fn min(self, min: usize) -> Self {
        self.check(Check::min_length(min))
    }

    pub fn max(self, max: usize) -> Self {
        self.check(Check::max_length(max))
    }

    pub fn length(self, len: usize) -> Self {
        self.check(Check::length(len))
    }

    pub fn nonempty(self) -> Self {
        self.min(1)
    }

    /// Sets a custom message for the most recent constraint, or for the type
    /// check if there are none.
    pub fn error(self, message: impl Into<String>) -> Self {
        Self(self.0.with_last_message(message.into()))
    }
}

/// A schema for validating sets.
#[derive(Clone)]
pub struct SetSchema(Schema);

schema_builder!(SetSchema);

impl SetSchema {
    pub(crate) fn new(element: Schema) -> Self {
        Self(Schema::from_kind(NodeKind::Set(element)))
    }

    pub fn min(self, min: u64) -> Self {
        self.check(Check::min_size(min))
    }

    pub fn max(self, max: u64) -> Self {
        self.check(Check::max_size(max))
    }

    pub fn size(self, size: u64) -> Self {
        self.check(Check::size(size))
    }

    pub fn nonempty(self) -> Self {
        self.min(1)
    }

    pub fn error(self, message: impl Into<String>) -> Self {
        Self(self.0.with_last_message(message.into()))
    }
}

/// A schema for fixed-position arrays, with an optional rest element.
///
/// Trailing items whose schema accepts a missing value may be omitted.
///
/// # Example
///
/// ```rust
/// use assay::{Schema, SchemaLike, Value};
///
/// let schema = Schema::tuple([Schema::string().into_schema(), Schema::number().into_schema()])
///     .rest(Schema::boolean());
///
/// let ok = Value::array([Value::from("a"), Value::from(1), Value::from(true)]);
/// assert!(schema.safe_parse(ok).unwrap().is_success());
/// ```
#[derive(Clone)]
pub struct TupleSchema(Schema);

schema_builder!(TupleSchema);

impl TupleSchema {
    pub(crate) fn new(items: Vec<Schema>) -> Self {
        Self(Schema::from_kind(NodeKind::Tuple { items, rest: None }))
    }

    pub fn items(&self) -> &[Schema] {
        match self.0.def() {
            NodeKind::Tuple { items, .. } => items,
            _ => unreachable!("TupleSchema always wraps a tuple node"),
        }
    }

    /// Validates elements past the fixed items against `schema`.
    pub fn rest(self, schema: impl SchemaLike) -> Self {
        let items = self.items().to_vec();
        Self(self.0.with_kind(NodeKind::Tuple {
            items,
            rest: Some(schema.into_schema()),
        }))
    }

    pub fn error(self, message: impl Into<String>) -> Self {
        Self(self.0.with_last_message(message.into()))
    }
}
