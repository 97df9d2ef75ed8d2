//! Schema definitions.
//!
//! A [`Schema`] is a cheap, shareable handle to an immutable [`SchemaNode`]:
//! a [`NodeKind`] with its definition data, the ordered checks attached to
//! it, and the [`Bag`] derived from those checks. Modifiers never mutate a
//! node; they build a new node that shares every untouched child.
//!
//! Typed builders ([`StringSchema`], [`NumberSchema`], [`ObjectSchema`], ...)
//! wrap a `Schema` and add kind-specific constraint methods. The
//! [`SchemaLike`] trait gives every schema the common modifiers and the parse
//! API.
//!
//! # Example
//!
//! ```rust
//! use assay::{Schema, SchemaLike};
//!
//! let schema = Schema::string().min(1).max(100);
//!
//! assert!(schema.safe_parse("hello").unwrap().is_success());
//! assert!(schema.safe_parse("").unwrap().is_failure());
//! ```

mod array;
mod combinators;
mod discriminator;
mod file;
mod function;
mod lazy;
mod node;
mod numeric;
mod object;
mod string;
mod template;
mod traits;
mod walk;
mod wrappers;

use std::fmt;
use std::sync::Arc;

use crate::check::{Bag, Check};

pub use array::{ArraySchema, SetSchema, TupleSchema};
pub use discriminator::DiscriminatorIndex;
pub use file::FileSchema;
pub use function::FunctionSchema;
pub use lazy::LazyDef;
pub use node::{
    CatchCtx, CatchFn, CustomFn, DefaultFn, DiscriminatedUnionDef, NodeKind, ObjectDef,
    SchemaKind, TemplateDef, TemplatePart, TransformFn, UnknownKeys,
};
pub use numeric::{BigIntSchema, DateSchema, NumberSchema};
pub use object::ObjectSchema;
pub use string::StringSchema;
pub use traits::{SafeParseResult, SchemaLike};
pub use walk::WalkControl;

pub(crate) use function::wrap_function;

/// An immutable schema node.
#[derive(Clone)]
pub struct SchemaNode {
    pub(crate) kind: NodeKind,
    pub(crate) checks: Vec<Check>,
    pub(crate) bag: Bag,
    pub(crate) error: Option<String>,
    pub(crate) description: Option<String>,
}

impl SchemaNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            checks: Vec::new(),
            bag: Bag::default(),
            error: None,
            description: None,
        }
    }
}

/// A shareable handle to a schema node.
///
/// Cloning a `Schema` is cheap and preserves its identity ([`Schema::id`]).
#[derive(Clone)]
pub struct Schema(pub(crate) Arc<SchemaNode>);

impl Schema {
    pub(crate) fn from_kind(kind: NodeKind) -> Self {
        Self(Arc::new(SchemaNode::new(kind)))
    }

    /// Stable identity of the node, shared by all clones of this handle.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn kind(&self) -> SchemaKind {
        self.0.kind.kind()
    }

    /// Kind-specific definition data.
    pub fn def(&self) -> &NodeKind {
        &self.0.kind
    }

    /// Attached checks, in attachment order.
    pub fn checks(&self) -> &[Check] {
        &self.0.checks
    }

    /// Constraint summary derived from the checks.
    pub fn bag(&self) -> &Bag {
        &self.0.bag
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    /// The author message attached to this node's own structural issues.
    pub fn error_message(&self) -> Option<&str> {
        self.0.error.as_deref()
    }

    /// Whether two handles point at the same node.
    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Builds a new node from a copy of this one.
    pub(crate) fn derive(&self, f: impl FnOnce(&mut SchemaNode)) -> Schema {
        let mut node = (*self.0).clone();
        f(&mut node);
        Schema(Arc::new(node))
    }

    pub(crate) fn with_check_added(&self, check: Check) -> Schema {
        self.derive(|node| {
            node.bag = check.attach(std::mem::take(&mut node.bag));
            node.checks.push(check);
        })
    }

    /// Same checks and messages, new definition data.
    pub(crate) fn with_kind(&self, kind: NodeKind) -> Schema {
        self.derive(|node| node.kind = kind)
    }

    pub(crate) fn with_error(&self, message: String) -> Schema {
        self.derive(|node| node.error = Some(message))
    }

    pub(crate) fn with_description(&self, description: String) -> Schema {
        self.derive(|node| node.description = Some(description))
    }

    /// Sets the message of the most recent check, or the node message if
    /// there are no checks.
    pub(crate) fn with_last_message(&self, message: String) -> Schema {
        self.derive(|node| match node.checks.last_mut() {
            Some(check) => check.set_message(message),
            None => node.error = Some(message),
        })
    }

    /// Whether a missing value is acceptable input (tuple tails, object keys).
    pub fn is_optional(&self) -> bool {
        match self.def() {
            NodeKind::Optional(_) | NodeKind::Default { .. } | NodeKind::Prefault { .. } => true,
            NodeKind::Catch { inner, .. } | NodeKind::Readonly(inner) => inner.is_optional(),
            NodeKind::Pipe(input, _) => input.is_optional(),
            _ => false,
        }
    }

    pub fn string() -> StringSchema {
        StringSchema::new(false)
    }

    pub fn number() -> NumberSchema {
        NumberSchema::new(false)
    }

    /// A number restricted to safe integers.
    pub fn int() -> NumberSchema {
        NumberSchema::new(false).int()
    }

    pub fn int32() -> NumberSchema {
        NumberSchema::new(false).format(crate::check::NumberFormat::Int32)
    }

    pub fn uint32() -> NumberSchema {
        NumberSchema::new(false).format(crate::check::NumberFormat::Uint32)
    }

    pub fn float32() -> NumberSchema {
        NumberSchema::new(false).format(crate::check::NumberFormat::Float32)
    }

    pub fn float64() -> NumberSchema {
        NumberSchema::new(false).format(crate::check::NumberFormat::Float64)
    }

    pub fn bigint() -> BigIntSchema {
        BigIntSchema::new(false)
    }

    pub fn int64() -> BigIntSchema {
        BigIntSchema::new(false).format(crate::check::BigIntFormat::Int64)
    }

    pub fn uint64() -> BigIntSchema {
        BigIntSchema::new(false).format(crate::check::BigIntFormat::Uint64)
    }

    pub fn boolean() -> Schema {
        Schema::from_kind(NodeKind::Boolean { coerce: false })
    }

    pub fn date() -> DateSchema {
        DateSchema::new(false)
    }

    pub fn symbol() -> Schema {
        Schema::from_kind(NodeKind::Symbol)
    }

    pub fn null() -> Schema {
        Schema::from_kind(NodeKind::Null)
    }

    pub fn undefined() -> Schema {
        Schema::from_kind(NodeKind::Undefined)
    }

    pub fn any() -> Schema {
        Schema::from_kind(NodeKind::Any)
    }

    pub fn unknown() -> Schema {
        Schema::from_kind(NodeKind::Unknown)
    }

    pub fn never() -> Schema {
        Schema::from_kind(NodeKind::Never)
    }

    pub fn void() -> Schema {
        Schema::from_kind(NodeKind::Void)
    }

    pub fn nan() -> Schema {
        Schema::from_kind(NodeKind::NaN)
    }

    pub fn coerce_string() -> StringSchema {
        StringSchema::new(true)
    }

    pub fn coerce_number() -> NumberSchema {
        NumberSchema::new(true)
    }

    pub fn coerce_bigint() -> BigIntSchema {
        BigIntSchema::new(true)
    }

    pub fn coerce_boolean() -> Schema {
        Schema::from_kind(NodeKind::Boolean { coerce: true })
    }

    pub fn coerce_date() -> DateSchema {
        DateSchema::new(true)
    }

    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    /// An object schema that rejects unknown keys.
    pub fn strict_object() -> ObjectSchema {
        ObjectSchema::new().strict()
    }

    /// An object schema that keeps unknown keys.
    pub fn loose_object() -> ObjectSchema {
        ObjectSchema::new().passthrough()
    }

    pub fn array(element: impl SchemaLike) -> ArraySchema {
        ArraySchema::new(element.into_schema())
    }

    pub fn set(element: impl SchemaLike) -> SetSchema {
        SetSchema::new(element.into_schema())
    }

    pub fn tuple<I, S>(items: I) -> TupleSchema
    where
        I: IntoIterator<Item = S>,
        S: SchemaLike,
    {
        TupleSchema::new(items.into_iter().map(SchemaLike::into_schema).collect())
    }

    pub fn file() -> FileSchema {
        FileSchema::new()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind())
            .field("id", &format_args!("{:#x}", self.id()))
            .field("checks", &self.0.checks)
            .finish()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
};
