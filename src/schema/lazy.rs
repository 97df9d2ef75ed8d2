//! Deferred and self-referential schemas.
//!
//! A lazy node resolves its target on first use and memoizes it. The parse
//! engine guards lazy nodes against cyclic input: a (node, value) pair that
//! is already being validated further up the stack is accepted as is.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::EngineError;

use super::node::NodeKind;
use super::traits::SchemaLike;
use super::Schema;

type Getter = Arc<dyn Fn() -> Schema + Send + Sync>;

/// The definition of a lazy node.
#[derive(Clone)]
pub struct LazyDef {
    getter: Option<Getter>,
    target: Arc<OnceLock<Schema>>,
}

impl LazyDef {
    fn from_getter(getter: Getter) -> Self {
        Self {
            getter: Some(getter),
            target: Arc::new(OnceLock::new()),
        }
    }

    fn unresolved() -> Self {
        Self {
            getter: None,
            target: Arc::new(OnceLock::new()),
        }
    }

    /// The target, if it has been resolved.
    pub fn resolved(&self) -> Option<Schema> {
        self.target.get().cloned()
    }

    /// The target, resolving it on first call.
    pub fn resolve(&self) -> Result<Schema, EngineError> {
        if let Some(schema) = self.target.get() {
            return Ok(schema.clone());
        }
        let getter = self.getter.as_ref().ok_or(EngineError::DanglingLazy)?;
        let schema = self.target.get_or_init(|| {
            let schema = getter();
            debug!(kind = %schema.kind(), "resolved lazy schema");
            schema
        });
        Ok(schema.clone())
    }
}

impl Schema {
    /// A schema produced by `getter` on first use.
    pub fn lazy<F>(getter: F) -> Schema
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        Schema::from_kind(NodeKind::Lazy(LazyDef::from_getter(Arc::new(getter))))
    }

    /// Builds a self-referential schema.
    ///
    /// `body` receives a handle standing for the schema being built. The
    /// returned schema and that handle form a reference cycle, so a recursive
    /// schema lives until the process exits.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, SchemaLike};
    /// use serde_json::json;
    ///
    /// let category = Schema::recursive(|this| {
    ///     Schema::object()
    ///         .field("name", Schema::string())
    ///         .field("children", Schema::array(this))
    /// });
    ///
    /// let input = json!({"name": "root", "children": [{"name": "leaf", "children": []}]});
    /// assert!(category.safe_parse(input).unwrap().is_success());
    /// ```
    pub fn recursive<F, S>(body: F) -> Schema
    where
        F: FnOnce(Schema) -> S,
        S: SchemaLike,
    {
        let def = LazyDef::unresolved();
        let target = Arc::clone(&def.target);
        let handle = Schema::from_kind(NodeKind::Lazy(def));
        let schema = body(handle).into_schema();
        if target.set(schema.clone()).is_err() {
            debug!("recursive schema target was already set");
        }
        schema
    }
}
