//! File schema.

use crate::check::Check;

use super::node::NodeKind;
use super::traits::{schema_builder, SchemaLike};
use super::Schema;

/// A schema for file values, with size bounds in bytes and accepted MIME
/// types.
///
/// # Example
///
/// ```rust
/// use assay::{FileValue, Schema, SchemaLike};
///
/// let avatar = Schema::file().max(1024).mime(["image/png", "image/jpeg"]);
///
/// let ok = FileValue::new("me.png", "image/png", 512);
/// let big = FileValue::new("me.png", "image/png", 4096);
/// assert!(avatar.safe_parse(ok).unwrap().is_success());
/// assert!(avatar.safe_parse(big).unwrap().is_failure());
/// ```
#[derive(Clone)]
pub struct FileSchema(Schema);

schema_builder!(FileSchema);

impl FileSchema {
    pub(crate) fn new() -> Self {
        Self(Schema::from_kind(NodeKind::File))
    }

    pub fn min(self, bytes: u64) -> Self {
        self.check(Check::min_size(bytes))
    }

    pub fn max(self, bytes: u64) -> Self {
        self.check(Check::max_size(bytes))
    }

    pub fn mime<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check(Check::mime(types))
    }

    pub fn error(self, message: impl Into<String>) -> Self {
        Self(self.0.with_last_message(message.into()))
    }
}
