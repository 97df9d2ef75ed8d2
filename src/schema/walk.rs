//! Schema tree traversal.
//!
//! Schemas may be cyclic through lazy nodes, so traversal tracks node
//! identity and visits every node once. This is a walk over the schema
//! itself, unrelated to parsing data.

use std::collections::HashSet;

use crate::check::CheckKind;

use super::node::NodeKind;
use super::Schema;

/// What [`Schema::walk`] does after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    /// Do not descend into this node's children.
    Skip,
    Stop,
}

impl Schema {
    /// Visits this node and every node reachable from it, depth first, in
    /// definition order.
    ///
    /// Lazy targets are resolved. Schemas referenced by property checks count
    /// as children. The visitor receives each node and its depth.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, SchemaKind, WalkControl};
    ///
    /// let tree = Schema::recursive(|this| Schema::object().field("children", Schema::array(this)));
    ///
    /// let mut kinds = Vec::new();
    /// tree.walk(|node, _| {
    ///     kinds.push(node.kind());
    ///     WalkControl::Continue
    /// });
    /// assert_eq!(kinds, [SchemaKind::Object, SchemaKind::Array, SchemaKind::Lazy]);
    /// ```
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&Schema, usize) -> WalkControl,
    {
        let mut seen = HashSet::new();
        let mut stack = vec![(self.clone(), 0usize)];
        while let Some((schema, depth)) = stack.pop() {
            if !seen.insert(schema.id()) {
                continue;
            }
            match visit(&schema, depth) {
                WalkControl::Stop => return,
                WalkControl::Skip => continue,
                WalkControl::Continue => {}
            }
            let mut children = match schema.def() {
                NodeKind::Lazy(def) => def.resolve().ok().into_iter().collect(),
                kind => kind.children(),
            };
            children.extend(schema.checks().iter().filter_map(|check| match check.kind() {
                CheckKind::Property { schema, .. } => Some(schema.clone()),
                _ => None,
            }));
            stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }
    }

    /// Number of distinct nodes reachable from this one.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| {
            count += 1;
            WalkControl::Continue
        });
        count
    }
}
