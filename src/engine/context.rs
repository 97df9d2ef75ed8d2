//! Parse configuration and per-call traversal state.
//!
//! [`ParseOptions`] is what a caller passes to a parse call. [`ParseContext`]
//! is created fresh for every top-level call and threaded by reference
//! through the traversal; it carries the options, the execution mode, and
//! the cycle guard used by lazy nodes.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ErrorMap, Issue};
use crate::value::Value;

/// Caller-supplied configuration for one parse call.
///
/// # Example
///
/// ```rust
/// use assay::{Issue, IssueCode, ParseOptions, Schema, SchemaLike};
///
/// let options = ParseOptions::new().with_error_map(|issue: &Issue| {
///     (issue.code() == IssueCode::InvalidType).then(|| "wrong type".to_string())
/// });
///
/// let error = Schema::string().parse_with(42, &options).unwrap_err();
/// assert_eq!(error.as_parse_error().unwrap().messages(), vec!["wrong type"]);
/// ```
#[derive(Clone, Default)]
pub struct ParseOptions {
    /// Formats issues that carry no author message.
    pub error_map: Option<Arc<dyn ErrorMap>>,
    /// Attach the offending input to every issue.
    pub report_input: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_map(mut self, error_map: impl ErrorMap + 'static) -> Self {
        self.error_map = Some(Arc::new(error_map));
        self
    }

    pub fn report_input(mut self, report_input: bool) -> Self {
        self.report_input = report_input;
        self
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("error_map", &self.error_map.is_some())
            .field("report_input", &self.report_input)
            .finish()
    }
}

/// Whether pending computations may be awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Sync,
    Async,
}

/// Traversal state of one parse call.
pub(crate) struct ParseContext {
    options: ParseOptions,
    mode: ParseMode,
    /// (lazy node id, cell id) pairs currently being validated.
    seen: Mutex<HashSet<(usize, usize)>>,
}

impl ParseContext {
    pub(crate) fn new(options: ParseOptions, mode: ParseMode) -> Self {
        Self {
            options,
            mode,
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub(crate) fn mode(&self) -> ParseMode {
        self.mode
    }

    pub(crate) fn is_async(&self) -> bool {
        self.mode == ParseMode::Async
    }

    /// Marks a (node, value) pair as in progress; false if it already was.
    pub(crate) fn enter(&self, node: usize, value: usize) -> bool {
        self.seen.lock().insert((node, value))
    }

    pub(crate) fn leave(&self, node: usize, value: usize) {
        self.seen.lock().remove(&(node, value));
    }

    /// Finishes an issue raised by a node itself.
    pub(crate) fn own_issue(&self, issue: Issue, message: Option<&str>, input: &Value) -> Issue {
        let issue = issue.with_fallback_message(message);
        if self.options.report_input && issue.input.is_none() {
            issue.with_input(input.clone())
        } else {
            issue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_is_scoped() {
        let ctx = ParseContext::new(ParseOptions::default(), ParseMode::Sync);
        assert!(ctx.enter(1, 2));
        assert!(!ctx.enter(1, 2));
        assert!(ctx.enter(1, 3));
        ctx.leave(1, 2);
        assert!(ctx.enter(1, 2));
    }

    #[test]
    fn test_own_issue_reports_input_when_asked() {
        let ctx = ParseContext::new(ParseOptions::new().report_input(true), ParseMode::Sync);
        let input = Value::from(3);
        let issue = ctx.own_issue(Issue::invalid_type("string", &input), Some("nope"), &input);
        assert_eq!(issue.input, Some(input.clone()));
        assert_eq!(issue.message.as_deref(), Some("nope"));

        let quiet = ParseContext::new(ParseOptions::default(), ParseMode::Async);
        let issue = quiet.own_issue(Issue::invalid_type("string", &input), None, &input);
        assert!(issue.input.is_none());
        assert!(quiet.is_async());
    }
}
