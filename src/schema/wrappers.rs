//! Introspection of single-child wrapper nodes.

use super::node::NodeKind;
use super::Schema;

impl Schema {
    /// The wrapped schema of an optional, nullable, default, prefault, catch,
    /// nonoptional, readonly, success, or promise node.
    pub fn unwrap(&self) -> Option<&Schema> {
        match self.def() {
            NodeKind::Optional(inner)
            | NodeKind::Nullable(inner)
            | NodeKind::Default { inner, .. }
            | NodeKind::Prefault { inner, .. }
            | NodeKind::Catch { inner, .. }
            | NodeKind::NonOptional(inner)
            | NodeKind::Readonly(inner)
            | NodeKind::Success(inner)
            | NodeKind::Promise(inner) => Some(inner),
            _ => None,
        }
    }

    /// Follows [`unwrap`](Self::unwrap) until a non-wrapper node.
    pub fn innermost(&self) -> &Schema {
        let mut current = self;
        while let Some(inner) = current.unwrap() {
            current = inner;
        }
        current
    }

    /// Whether the schema accepts `null` without consulting its inner node.
    pub fn is_nullable(&self) -> bool {
        match self.def() {
            NodeKind::Nullable(_) | NodeKind::Null => true,
            NodeKind::Optional(inner)
            | NodeKind::Default { inner, .. }
            | NodeKind::Readonly(inner)
            | NodeKind::Catch { inner, .. } => inner.is_nullable(),
            _ => false,
        }
    }
}
