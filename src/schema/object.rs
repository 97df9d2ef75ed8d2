//! Object schema.
//!
//! This module provides [`ObjectSchema`] for validating property bags against
//! a declared shape, with a policy for keys outside the shape and the usual
//! shape derivations (`extend`, `merge`, `pick`, `omit`, `partial`,
//! `required`, `keyof`).

use indexmap::IndexMap;

use crate::value::Primitive;

use super::node::{NodeKind, ObjectDef, UnknownKeys};
use super::traits::{schema_builder, SchemaLike};
use super::Schema;

/// A schema for validating objects.
///
/// Every declared key is validated, even after an earlier key failed. A key
/// that is absent from the input is validated as `undefined`, so it passes
/// only when its schema accepts `undefined` (for example through
/// [`optional`](SchemaLike::optional)).
///
/// # Example
///
/// ```rust
/// use assay::{Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("name", Schema::string().min(1))
///     .field("age", Schema::number().int().positive())
///     .optional_field("email", Schema::string().email())
///     .strict();
///
/// assert!(schema.safe_parse(json!({"name": "Alice", "age": 30})).unwrap().is_success());
///
/// // Unknown keys are reported together in one issue.
/// let result = schema.safe_parse(json!({"name": "Bob", "age": 3, "x": 1, "y": 2})).unwrap();
/// assert_eq!(result.into_result().unwrap_err().len(), 1);
/// ```
#[derive(Clone)]
pub struct ObjectSchema(Schema);

schema_builder!(ObjectSchema);

impl ObjectSchema {
    pub(crate) fn new() -> Self {
        Self::from_def(ObjectDef {
            shape: IndexMap::new(),
            unknown_keys: UnknownKeys::Strip,
        })
    }

    fn from_def(def: ObjectDef) -> Self {
        Self(Schema::from_kind(NodeKind::Object(def)))
    }

    /// The object definition.
    pub fn def(&self) -> &ObjectDef {
        match self.0.def() {
            NodeKind::Object(def) => def,
            _ => unreachable!("ObjectSchema always wraps an object node"),
        }
    }

    pub fn shape(&self) -> &IndexMap<String, Schema> {
        &self.def().shape
    }

    /// The schema of one declared key.
    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.def().shape.get(key)
    }

    /// Keeps checks and messages; replaces the definition.
    fn with_def(self, f: impl FnOnce(&mut ObjectDef)) -> Self {
        let mut def = self.def().clone();
        f(&mut def);
        Self(self.0.with_kind(NodeKind::Object(def)))
    }

    /// Builds a fresh object node (no checks) from a derived definition.
    fn derived(&self, f: impl FnOnce(&mut ObjectDef)) -> Self {
        let mut def = self.def().clone();
        f(&mut def);
        Self::from_def(def)
    }

    /// Declares a key.
    pub fn field(self, name: impl Into<String>, schema: impl SchemaLike) -> Self {
        let name = name.into();
        let schema = schema.into_schema();
        self.with_def(|def| {
            def.shape.insert(name, schema);
        })
    }

    /// Declares a key that may be absent.
    pub fn optional_field(self, name: impl Into<String>, schema: impl SchemaLike) -> Self {
        self.field(name, schema.optional())
    }

    /// Reports unknown keys as one `unrecognized_keys` issue.
    pub fn strict(self) -> Self {
        self.with_def(|def| def.unknown_keys = UnknownKeys::Strict)
    }

    /// Drops unknown keys from the output (the default).
    pub fn strip(self) -> Self {
        self.with_def(|def| def.unknown_keys = UnknownKeys::Strip)
    }

    /// Keeps unknown keys in the output without validating them.
    pub fn passthrough(self) -> Self {
        self.with_def(|def| def.unknown_keys = UnknownKeys::Passthrough)
    }

    /// Validates every unknown key's value against `schema`.
    pub fn catchall(self, schema: impl SchemaLike) -> Self {
        let schema = schema.into_schema();
        self.with_def(|def| def.unknown_keys = UnknownKeys::Catchall(schema))
    }

    /// Adds or replaces keys.
    pub fn extend<I, K, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: SchemaLike,
    {
        let fields: Vec<(String, Schema)> = fields
            .into_iter()
            .map(|(k, s)| (k.into(), s.into_schema()))
            .collect();
        self.derived(|def| def.shape.extend(fields))
    }

    /// Combines two shapes; keys and the unknown-key policy of `other` win.
    pub fn merge(self, other: ObjectSchema) -> Self {
        let other_def = other.def().clone();
        self.derived(|def| {
            def.shape.extend(other_def.shape);
            def.unknown_keys = other_def.unknown_keys;
        })
    }

    /// Keeps only the listed keys.
    pub fn pick<'a>(self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        self.derived(|def| def.shape.retain(|k, _| keys.contains(&k.as_str())))
    }

    /// Drops the listed keys.
    pub fn omit<'a>(self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        self.derived(|def| def.shape.retain(|k, _| !keys.contains(&k.as_str())))
    }

    /// Makes every key optional.
    pub fn partial(self) -> Self {
        self.derived(|def| {
            for schema in def.shape.values_mut() {
                if !matches!(schema.def(), NodeKind::Optional(_)) {
                    *schema = schema.clone().optional();
                }
            }
        })
    }

    /// Makes every key required, rejecting `undefined` even for optional keys.
    pub fn required(self) -> Self {
        self.derived(|def| {
            for schema in def.shape.values_mut() {
                *schema = schema.clone().nonoptional();
            }
        })
    }

    /// An enum schema of the declared keys.
    pub fn keyof(&self) -> Schema {
        Schema::enumeration(
            self.def()
                .shape
                .keys()
                .map(|k| Primitive::String(k.clone())),
        )
    }

    /// Sets a custom message for the most recent refinement, or for the
    /// non-object check if there are none.
    pub fn error(self, message: impl Into<String>) -> Self {
        Self(self.0.with_last_message(message.into()))
    }
}
