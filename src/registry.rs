//! Named schema storage with metadata.
//!
//! This module provides the [`SchemaRegistry`] type, a shared table of named
//! schemas and the [`Metadata`] describing them, for exporters and for
//! parsing by name.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::error::Error;
use crate::schema::{SafeParseResult, Schema, SchemaLike};
use crate::value::Value;

/// Descriptive data attached to a registered schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub examples: Vec<Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn example(mut self, example: impl Into<Value>) -> Self {
        self.examples.push(example.into());
        self
    }
}

#[derive(Clone)]
struct Entry {
    schema: Schema,
    metadata: Metadata,
}

type SchemaMap = Arc<RwLock<IndexMap<String, Entry>>>;

/// A thread-safe registry of named schemas.
///
/// Clones share the same table, so a registry can be handed to worker
/// threads and filled or read from any of them. Reads take a shared lock;
/// registration takes an exclusive one.
///
/// # Example
///
/// ```rust
/// use assay::{Metadata, Schema, SchemaLike, SchemaRegistry};
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new();
///
/// registry.register("Email", Schema::string().email()).unwrap();
/// registry
///     .register_with(
///         "User",
///         Schema::object().field("email", Schema::string().email()),
///         Metadata::new().title("User").example(json!({"email": "a@b.co"})),
///     )
///     .unwrap();
///
/// let result = registry.safe_parse("User", json!({"email": "nope"})).unwrap();
/// assert!(result.unwrap().is_failure());
/// assert_eq!(registry.metadata("User").unwrap().title.as_deref(), Some("User"));
/// ```
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: SchemaMap,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already taken.
    pub fn register(&self, name: impl Into<String>, schema: impl SchemaLike) -> Result<(), RegistryError> {
        self.register_with(name, schema, Metadata::default())
    }

    /// Registers a schema with metadata.
    ///
    /// A description set with [`SchemaLike::describe`] is used when the
    /// metadata carries none.
    pub fn register_with(
        &self,
        name: impl Into<String>,
        schema: impl SchemaLike,
        mut metadata: Metadata,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let schema = schema.into_schema();
        let mut schemas = self.schemas.write();

        if schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        if metadata.description.is_none() {
            metadata.description = schema.description().map(str::to_string);
        }
        debug!(name = %name, kind = %schema.kind(), nodes = schema.node_count(), "registered schema");
        schemas.insert(name, Entry { schema, metadata });
        Ok(())
    }

    /// Retrieves a schema by name.
    pub fn get(&self, name: &str) -> Option<Schema> {
        self.schemas.read().get(name).map(|entry| entry.schema.clone())
    }

    pub fn metadata(&self, name: &str) -> Option<Metadata> {
        self.schemas.read().get(name).map(|entry| entry.metadata.clone())
    }

    /// The name a schema was registered under, by node identity.
    pub fn name_of(&self, schema: &Schema) -> Option<String> {
        self.schemas
            .read()
            .iter()
            .find(|(_, entry)| entry.schema.ptr_eq(schema))
            .map(|(name, _)| name.clone())
    }

    /// Metadata of a schema, looked up by node identity.
    pub fn metadata_of(&self, schema: &Schema) -> Option<Metadata> {
        self.schemas
            .read()
            .values()
            .find(|entry| entry.schema.ptr_eq(schema))
            .map(|entry| entry.metadata.clone())
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.schemas.read().keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    /// Removes a schema and returns it.
    pub fn remove(&self, name: &str) -> Option<Schema> {
        self.schemas.write().shift_remove(name).map(|entry| entry.schema)
    }

    /// Parses `input` with the schema registered under `name`.
    ///
    /// The lock is released before parsing, so schemas may consult the
    /// registry from refinements.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` for an unknown name.
    pub fn safe_parse(&self, name: &str, input: impl Into<Value>) -> Result<SafeParseResult, RegistryError> {
        let schema = self.lookup(name)?;
        Ok(schema.safe_parse(input))
    }

    /// Like [`safe_parse`](Self::safe_parse), failing on invalid input.
    pub fn parse(&self, name: &str, input: impl Into<Value>) -> Result<Result<Value, Error>, RegistryError> {
        let schema = self.lookup(name)?;
        Ok(schema.parse(input))
    }

    fn lookup(&self, name: &str) -> Result<Schema, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::SchemaNotFound(name.to_string()))
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema with a name that already exists.
    #[error("schema '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to parse with a schema name that doesn't exist.
    #[error("schema '{0}' not found")]
    SchemaNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = SchemaRegistry::new();
        registry.register("Id", Schema::int()).unwrap();
        assert_eq!(
            registry.register("Id", Schema::string()),
            Err(RegistryError::DuplicateName("Id".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_description_falls_back_to_schema() {
        let registry = SchemaRegistry::new();
        registry
            .register("Age", Schema::number().describe("age in years"))
            .unwrap();
        let metadata = registry.metadata("Age").unwrap();
        assert_eq!(metadata.description.as_deref(), Some("age in years"));
        assert_eq!(metadata.title, None);
    }

    #[test]
    fn test_lookup_by_identity() {
        let registry = SchemaRegistry::new();
        let schema = Schema::boolean();
        registry.register("Flag", schema.clone()).unwrap();
        assert_eq!(registry.name_of(&schema).as_deref(), Some("Flag"));
        assert!(registry.name_of(&Schema::boolean()).is_none());
    }

    #[test]
    fn test_unknown_name() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.safe_parse("Missing", 1),
            Err(RegistryError::SchemaNotFound(name)) if name == "Missing"
        ));
    }

    #[test]
    fn test_clones_share_table() {
        let registry = SchemaRegistry::new();
        let other = registry.clone();
        other.register("A", Schema::null()).unwrap();
        assert!(registry.contains("A"));
        assert_eq!(registry.remove("A").map(|s| s.kind()), Some(crate::schema::SchemaKind::Null));
        assert!(other.is_empty());
    }
}
