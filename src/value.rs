//! Dynamic values.
//!
//! [`Value`] is the closed set of inputs the engine can inspect. It mirrors the
//! runtime values of a dynamic host: besides JSON-shaped data it has
//! `undefined`, big integers, dates, maps, sets, files, callables, pending
//! values, and [`SharedValue`] reference cells (the only way to build cyclic data).
//!
//! [`Primitive`] is the subset usable as literal, enum, and discriminator values.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use crate::error::Error;

/// Insertion-ordered property bag used for object values.
pub type Object = IndexMap<String, Value>;

/// A dynamic input or output value.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    /// A symbol, identified by its description.
    Symbol(Arc<str>),
    /// Milliseconds since the Unix epoch; NaN marks an invalid date.
    Date(f64),
    Array(Vec<Value>),
    Object(Object),
    /// Entries in insertion order; keys may be any value.
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    File(FileValue),
    Function(FunctionValue),
    Promise(PromiseValue),
    Shared(SharedValue),
}

impl Value {
    /// Builds an object value from key/value pairs.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds an array value.
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Builds a set value.
    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    /// Builds a map value from entries.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn bigint(n: i128) -> Self {
        Value::BigInt(n)
    }

    pub fn symbol(description: &str) -> Self {
        Value::Symbol(Arc::from(description))
    }

    /// A date at `millis` milliseconds since the Unix epoch.
    pub fn date(millis: f64) -> Self {
        Value::Date(millis)
    }

    /// The runtime type name reported as `received` in `invalid_type` issues.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_nan() => "nan",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Date(ms) if ms.is_nan() => "Invalid Date",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::File(_) => "file",
            Value::Function(_) => "function",
            Value::Promise(_) => "promise",
            Value::Shared(cell) => cell.get().type_name(),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Looks up an object property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Length of strings (in characters) and arrays; `None` for everything else.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Size of sets, maps, and files (in bytes); `None` for everything else.
    pub fn size(&self) -> Option<u64> {
        match self {
            Value::Set(items) => Some(items.len() as u64),
            Value::Map(entries) => Some(entries.len() as u64),
            Value::File(file) => Some(file.size),
            _ => None,
        }
    }

    /// Returns the literal view of this value, if it has one.
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Value::Undefined => Some(Primitive::Undefined),
            Value::Null => Some(Primitive::Null),
            Value::Bool(b) => Some(Primitive::Bool(*b)),
            Value::Number(n) => Some(Primitive::Number(*n)),
            Value::BigInt(n) => Some(Primitive::BigInt(*n)),
            Value::String(s) => Some(Primitive::String(s.clone())),
            _ => None,
        }
    }

    /// Replaces a shared reference cell by a snapshot of its contents.
    ///
    /// Nested cells are followed; a cell chain that loops back on itself
    /// yields `Undefined`.
    pub fn detach(self) -> Value {
        let mut current = self;
        let mut visited = HashSet::new();
        while let Value::Shared(cell) = current {
            if !visited.insert(cell.id()) {
                return Value::Undefined;
            }
            current = cell.get();
        }
        current
    }

    /// Converts to JSON.
    ///
    /// `undefined`, non-finite numbers, invalid dates, callables and pending
    /// values become `null`; big integers that fit in an `i64` become numbers
    /// and strings otherwise; dates become epoch milliseconds; maps become
    /// arrays of `[key, value]` pairs; cycles through shared cells become `null`.
    pub fn to_json(&self) -> JsonValue {
        self.to_json_guarded(&mut HashSet::new())
    }

    fn to_json_guarded(&self, active: &mut HashSet<usize>) -> JsonValue {
        match self {
            Value::Undefined | Value::Function(_) | Value::Promise(_) => JsonValue::Null,
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::BigInt(n) => i64::try_from(*n)
                .map(JsonValue::from)
                .unwrap_or_else(|_| JsonValue::String(n.to_string())),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Symbol(desc) => JsonValue::String(desc.to_string()),
            Value::Date(ms) => number_to_json(*ms),
            Value::Array(items) | Value::Set(items) => JsonValue::Array(
                items.iter().map(|v| v.to_json_guarded(active)).collect(),
            ),
            Value::Object(obj) => JsonValue::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), v.to_json_guarded(active)))
                    .collect(),
            ),
            Value::Map(entries) => JsonValue::Array(
                entries
                    .iter()
                    .map(|(k, v)| {
                        JsonValue::Array(vec![
                            k.to_json_guarded(active),
                            v.to_json_guarded(active),
                        ])
                    })
                    .collect(),
            ),
            Value::File(file) => serde_json::json!({
                "name": file.name,
                "type": file.mime_type,
                "size": file.size,
            }),
            Value::Shared(cell) => {
                if !active.insert(cell.id()) {
                    return JsonValue::Null;
                }
                let json = cell.get().to_json_guarded(active);
                active.remove(&cell.id());
                json
            }
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Array(a), Value::Array(b)) | (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::File(a), Value::File(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Promise(a), Value::Promise(b)) => a.ptr_eq(b),
            (Value::Shared(a), Value::Shared(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", format_number(*n)),
            Value::BigInt(n) => write!(f, "BigInt({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Symbol(desc) => write!(f, "Symbol({})", desc),
            Value::Date(ms) => write!(f, "Date({})", format_number(*ms)),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
            Value::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Value::Set(items) => f.debug_tuple("Set").field(items).finish(),
            Value::File(file) => f.debug_tuple("File").field(file).finish(),
            Value::Function(_) => write!(f, "Function"),
            Value::Promise(_) => write!(f, "Promise"),
            Value::Shared(cell) => write!(f, "Shared({:#x})", cell.id()),
        }
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

value_from_number!(f64, f32, i32, i64, u32, u64, usize);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<FileValue> for Value {
    fn from(file: FileValue) -> Self {
        Value::File(file)
    }
}

impl From<FunctionValue> for Value {
    fn from(func: FunctionValue) -> Self {
        Value::Function(func)
    }
}

impl From<PromiseValue> for Value {
    fn from(promise: PromiseValue) -> Self {
        Value::Promise(promise)
    }
}

impl From<SharedValue> for Value {
    fn from(cell: SharedValue) -> Self {
        Value::Shared(cell)
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        match p {
            Primitive::Undefined => Value::Undefined,
            Primitive::Null => Value::Null,
            Primitive::Bool(b) => Value::Bool(b),
            Primitive::Number(n) => Value::Number(n),
            Primitive::BigInt(n) => Value::BigInt(n),
            Primitive::String(s) => Value::String(s),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Undefined)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Integral numbers render as JSON integers; non-finite numbers as `null`.
fn number_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() <= crate::check::MAX_SAFE_INTEGER {
        JsonValue::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

/// Formats a number the way a dynamic host prints it (`1`, `1.5`, `NaN`, `Infinity`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{}", n)
    }
}

/// A literal-capable value: the domain of literals, enums, and discriminators.
///
/// Numbers compare and hash by bit pattern (with `-0` folded into `0`), so
/// primitives can key a lookup table.
#[derive(Debug, Clone)]
pub enum Primitive {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
}

impl Primitive {
    /// The value as it appears inside a template literal.
    pub fn to_template_string(&self) -> String {
        match self {
            Primitive::Undefined => "undefined".to_string(),
            Primitive::Null => "null".to_string(),
            Primitive::Bool(b) => b.to_string(),
            Primitive::Number(n) => format_number(*n),
            Primitive::BigInt(n) => n.to_string(),
            Primitive::String(s) => s.clone(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        Value::from(self.clone()).to_json()
    }

    /// Whether `value` is strictly equal to this literal.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Primitive::Undefined, Value::Undefined) | (Primitive::Null, Value::Null) => true,
            (Primitive::Bool(a), Value::Bool(b)) => a == b,
            (Primitive::Number(a), Value::Number(b)) => a == b,
            (Primitive::BigInt(a), Value::BigInt(b)) => a == b,
            (Primitive::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }

    fn number_bits(n: f64) -> u64 {
        if n == 0.0 {
            0f64.to_bits()
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Primitive::Undefined, Primitive::Undefined) | (Primitive::Null, Primitive::Null) => {
                true
            }
            (Primitive::Bool(a), Primitive::Bool(b)) => a == b,
            (Primitive::Number(a), Primitive::Number(b)) => {
                Self::number_bits(*a) == Self::number_bits(*b)
            }
            (Primitive::BigInt(a), Primitive::BigInt(b)) => a == b,
            (Primitive::String(a), Primitive::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Primitive {}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Primitive::Undefined | Primitive::Null => {}
            Primitive::Bool(b) => b.hash(state),
            Primitive::Number(n) => Self::number_bits(*n).hash(state),
            Primitive::BigInt(n) => n.hash(state),
            Primitive::String(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::String(s) => write!(f, "{:?}", s),
            Primitive::BigInt(n) => write!(f, "{}n", n),
            other => write!(f, "{}", other.to_template_string()),
        }
    }
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::String(s.to_string())
    }
}

impl From<String> for Primitive {
    fn from(s: String) -> Self {
        Primitive::String(s)
    }
}

impl From<bool> for Primitive {
    fn from(b: bool) -> Self {
        Primitive::Bool(b)
    }
}

impl From<f64> for Primitive {
    fn from(n: f64) -> Self {
        Primitive::Number(n)
    }
}

impl From<i32> for Primitive {
    fn from(n: i32) -> Self {
        Primitive::Number(n as f64)
    }
}

impl From<i64> for Primitive {
    fn from(n: i64) -> Self {
        Primitive::Number(n as f64)
    }
}

/// An uploaded file, described by its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FileValue {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl FileValue {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}

type NativeFn = dyn Fn(Vec<Value>) -> Result<Value, Error> + Send + Sync;

/// A callable value.
#[derive(Clone)]
pub struct FunctionValue(Arc<NativeFn>);

impl FunctionValue {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: Vec<Value>) -> Result<Value, Error> {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A value that becomes available later.
///
/// Clones observe the same underlying computation, which runs at most once.
#[derive(Clone)]
pub struct PromiseValue(Arc<Shared<BoxFuture<'static, Value>>>);

impl PromiseValue {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Value> + Send + 'static,
    {
        Self(Arc::new(future.boxed().shared()))
    }

    /// A promise that is already settled with `value`.
    pub fn resolved(value: Value) -> Self {
        Self::new(futures::future::ready(value))
    }

    /// Waits for the value.
    pub async fn settle(&self) -> Value {
        (*self.0).clone().await
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A mutable reference cell with identity.
///
/// Cells let a value appear in several places, including inside itself.
#[derive(Clone)]
pub struct SharedValue(Arc<RwLock<Value>>);

impl SharedValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Arc::new(RwLock::new(value.into())))
    }

    /// Snapshot of the current contents (nested cells stay shared).
    pub fn get(&self) -> Value {
        self.0.read().clone()
    }

    pub fn set(&self, value: impl Into<Value>) {
        *self.0.write() = value.into();
    }

    /// Stable identity of the cell.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
