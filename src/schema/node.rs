//! Node definitions.
//!
//! [`NodeKind`] is the closed set of schema shapes. The parse engine matches
//! on it exhaustively, so adding a kind forces the engine to handle it.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use regex::Regex;

use crate::check::RefinementCtx;
use crate::error::ParseError;
use crate::value::{Primitive, Value};

use super::discriminator::DiscriminatorIndex;
use super::lazy::LazyDef;
use super::Schema;

/// How an object treats keys missing from its shape.
#[derive(Clone)]
pub enum UnknownKeys {
    /// Drop them from the output.
    Strip,
    /// Keep them untouched.
    Passthrough,
    /// Report them in one `unrecognized_keys` issue.
    Strict,
    /// Validate each of them against a schema.
    Catchall(Schema),
}

#[derive(Clone)]
pub struct ObjectDef {
    pub shape: IndexMap<String, Schema>,
    pub unknown_keys: UnknownKeys,
}

#[derive(Clone)]
pub struct DiscriminatedUnionDef {
    pub discriminator: String,
    pub options: Vec<Schema>,
    pub index: Arc<DiscriminatorIndex>,
    /// Fall back to trial parsing when the discriminator matches no option.
    pub fallback: bool,
}

/// A user transform.
#[derive(Clone)]
pub enum TransformFn {
    Sync(Arc<dyn Fn(Value, &mut RefinementCtx) -> Value + Send + Sync>),
    Async(Arc<dyn Fn(Value) -> BoxFuture<'static, Value> + Send + Sync>),
}

/// Produces default and prefault values.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// What a catch fallback sees.
pub struct CatchCtx {
    pub error: ParseError,
    pub input: Value,
}

pub type CatchFn = Arc<dyn Fn(&CatchCtx) -> Value + Send + Sync>;

pub type CustomFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// One piece of a template literal.
#[derive(Clone)]
pub enum TemplatePart {
    Literal(Primitive),
    Schema(Schema),
}

#[derive(Clone)]
pub struct TemplateDef {
    pub parts: Vec<TemplatePart>,
    pub regex: Regex,
}

/// Kind-specific definition data of a schema node.
#[derive(Clone)]
pub enum NodeKind {
    String { coerce: bool },
    Number { coerce: bool },
    BigInt { coerce: bool },
    Boolean { coerce: bool },
    Date { coerce: bool },
    Symbol,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Void,
    NaN,
    Literal(Vec<Primitive>),
    Enum(Vec<Primitive>),
    Array(Schema),
    Object(ObjectDef),
    Record { key: Schema, value: Schema },
    Map { key: Schema, value: Schema },
    Set(Schema),
    Tuple { items: Vec<Schema>, rest: Option<Schema> },
    Union(Vec<Schema>),
    DiscriminatedUnion(DiscriminatedUnionDef),
    Intersection(Schema, Schema),
    Lazy(LazyDef),
    Pipe(Schema, Schema),
    Transform(TransformFn),
    Optional(Schema),
    Nullable(Schema),
    Default { inner: Schema, value: DefaultFn },
    Prefault { inner: Schema, value: DefaultFn },
    Catch { inner: Schema, fallback: CatchFn },
    NonOptional(Schema),
    Success(Schema),
    Readonly(Schema),
    TemplateLiteral(TemplateDef),
    Custom(CustomFn),
    File,
    Promise(Schema),
    Function { input: Option<Schema>, output: Option<Schema> },
}

/// The discriminant of a node, for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    String,
    Number,
    BigInt,
    Boolean,
    Date,
    Symbol,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Void,
    NaN,
    Literal,
    Enum,
    Array,
    Object,
    Record,
    Map,
    Set,
    Tuple,
    Union,
    DiscriminatedUnion,
    Intersection,
    Lazy,
    Pipe,
    Transform,
    Optional,
    Nullable,
    Default,
    Prefault,
    Catch,
    NonOptional,
    Success,
    Readonly,
    TemplateLiteral,
    Custom,
    File,
    Promise,
    Function,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::BigInt => "bigint",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Date => "date",
            SchemaKind::Symbol => "symbol",
            SchemaKind::Null => "null",
            SchemaKind::Undefined => "undefined",
            SchemaKind::Any => "any",
            SchemaKind::Unknown => "unknown",
            SchemaKind::Never => "never",
            SchemaKind::Void => "void",
            SchemaKind::NaN => "nan",
            SchemaKind::Literal => "literal",
            SchemaKind::Enum => "enum",
            SchemaKind::Array => "array",
            SchemaKind::Object => "object",
            SchemaKind::Record => "record",
            SchemaKind::Map => "map",
            SchemaKind::Set => "set",
            SchemaKind::Tuple => "tuple",
            SchemaKind::Union => "union",
            SchemaKind::DiscriminatedUnion => "discriminated_union",
            SchemaKind::Intersection => "intersection",
            SchemaKind::Lazy => "lazy",
            SchemaKind::Pipe => "pipe",
            SchemaKind::Transform => "transform",
            SchemaKind::Optional => "optional",
            SchemaKind::Nullable => "nullable",
            SchemaKind::Default => "default",
            SchemaKind::Prefault => "prefault",
            SchemaKind::Catch => "catch",
            SchemaKind::NonOptional => "nonoptional",
            SchemaKind::Success => "success",
            SchemaKind::Readonly => "readonly",
            SchemaKind::TemplateLiteral => "template_literal",
            SchemaKind::Custom => "custom",
            SchemaKind::File => "file",
            SchemaKind::Promise => "promise",
            SchemaKind::Function => "function",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NodeKind {
    pub fn kind(&self) -> SchemaKind {
        match self {
            NodeKind::String { .. } => SchemaKind::String,
            NodeKind::Number { .. } => SchemaKind::Number,
            NodeKind::BigInt { .. } => SchemaKind::BigInt,
            NodeKind::Boolean { .. } => SchemaKind::Boolean,
            NodeKind::Date { .. } => SchemaKind::Date,
            NodeKind::Symbol => SchemaKind::Symbol,
            NodeKind::Null => SchemaKind::Null,
            NodeKind::Undefined => SchemaKind::Undefined,
            NodeKind::Any => SchemaKind::Any,
            NodeKind::Unknown => SchemaKind::Unknown,
            NodeKind::Never => SchemaKind::Never,
            NodeKind::Void => SchemaKind::Void,
            NodeKind::NaN => SchemaKind::NaN,
            NodeKind::Literal(_) => SchemaKind::Literal,
            NodeKind::Enum(_) => SchemaKind::Enum,
            NodeKind::Array(_) => SchemaKind::Array,
            NodeKind::Object(_) => SchemaKind::Object,
            NodeKind::Record { .. } => SchemaKind::Record,
            NodeKind::Map { .. } => SchemaKind::Map,
            NodeKind::Set(_) => SchemaKind::Set,
            NodeKind::Tuple { .. } => SchemaKind::Tuple,
            NodeKind::Union(_) => SchemaKind::Union,
            NodeKind::DiscriminatedUnion(_) => SchemaKind::DiscriminatedUnion,
            NodeKind::Intersection(..) => SchemaKind::Intersection,
            NodeKind::Lazy(_) => SchemaKind::Lazy,
            NodeKind::Pipe(..) => SchemaKind::Pipe,
            NodeKind::Transform(_) => SchemaKind::Transform,
            NodeKind::Optional(_) => SchemaKind::Optional,
            NodeKind::Nullable(_) => SchemaKind::Nullable,
            NodeKind::Default { .. } => SchemaKind::Default,
            NodeKind::Prefault { .. } => SchemaKind::Prefault,
            NodeKind::Catch { .. } => SchemaKind::Catch,
            NodeKind::NonOptional(_) => SchemaKind::NonOptional,
            NodeKind::Success(_) => SchemaKind::Success,
            NodeKind::Readonly(_) => SchemaKind::Readonly,
            NodeKind::TemplateLiteral(_) => SchemaKind::TemplateLiteral,
            NodeKind::Custom(_) => SchemaKind::Custom,
            NodeKind::File => SchemaKind::File,
            NodeKind::Promise(_) => SchemaKind::Promise,
            NodeKind::Function { .. } => SchemaKind::Function,
        }
    }

    /// Direct children, in definition order.
    ///
    /// Lazy nodes report their target only once it has been resolved.
    pub fn children(&self) -> Vec<Schema> {
        match self {
            NodeKind::Array(inner)
            | NodeKind::Set(inner)
            | NodeKind::Optional(inner)
            | NodeKind::Nullable(inner)
            | NodeKind::Default { inner, .. }
            | NodeKind::Prefault { inner, .. }
            | NodeKind::Catch { inner, .. }
            | NodeKind::NonOptional(inner)
            | NodeKind::Success(inner)
            | NodeKind::Readonly(inner)
            | NodeKind::Promise(inner) => vec![inner.clone()],
            NodeKind::Object(def) => {
                let mut children: Vec<Schema> = def.shape.values().cloned().collect();
                if let UnknownKeys::Catchall(catchall) = &def.unknown_keys {
                    children.push(catchall.clone());
                }
                children
            }
            NodeKind::Record { key, value } | NodeKind::Map { key, value } => {
                vec![key.clone(), value.clone()]
            }
            NodeKind::Tuple { items, rest } => {
                items.iter().cloned().chain(rest.iter().cloned()).collect()
            }
            NodeKind::Union(options) => options.clone(),
            NodeKind::DiscriminatedUnion(def) => def.options.clone(),
            NodeKind::Intersection(left, right) | NodeKind::Pipe(left, right) => {
                vec![left.clone(), right.clone()]
            }
            NodeKind::Lazy(def) => def.resolved().into_iter().collect(),
            NodeKind::TemplateLiteral(def) => def
                .parts
                .iter()
                .filter_map(|part| match part {
                    TemplatePart::Schema(schema) => Some(schema.clone()),
                    TemplatePart::Literal(_) => None,
                })
                .collect(),
            NodeKind::Function { input, output } => {
                input.iter().chain(output.iter()).cloned().collect()
            }
            NodeKind::String { .. }
            | NodeKind::Number { .. }
            | NodeKind::BigInt { .. }
            | NodeKind::Boolean { .. }
            | NodeKind::Date { .. }
            | NodeKind::Symbol
            | NodeKind::Null
            | NodeKind::Undefined
            | NodeKind::Any
            | NodeKind::Unknown
            | NodeKind::Never
            | NodeKind::Void
            | NodeKind::NaN
            | NodeKind::Literal(_)
            | NodeKind::Enum(_)
            | NodeKind::Transform(_)
            | NodeKind::Custom(_)
            | NodeKind::File => Vec::new(),
        }
    }
}
