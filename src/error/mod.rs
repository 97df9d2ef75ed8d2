//! Error types: the issue vocabulary, the aggregate parse error, message
//! rendering, and programmer errors.

mod engine_error;
mod issue;
mod messages;
mod parse_error;

pub use engine_error::{EngineError, Error, SchemaBuildError};
pub use issue::{Issue, IssueCode, IssueKind, Numeric, Origin};
pub use messages::{default_message, resolve_message, DefaultErrorMap, ErrorMap};
pub use parse_error::{ErrorTree, FlattenedError, ParseError};
