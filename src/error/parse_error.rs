//! The aggregate validation error.
//!
//! [`ParseError`] is the non-empty, ordered list of issues produced by one
//! parse call, together with the error map that call was configured with.
//! It offers the derived views callers use to report failures:
//! [`flatten`](ParseError::flatten), [`format`](ParseError::format), and
//! [`prettify`](ParseError::prettify).

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};
use stillwater::prelude::*;

use crate::path::{Path, PathSegment};

use super::issue::{Issue, IssueCode, IssueKind};
use super::messages::{resolve_message, DefaultErrorMap, ErrorMap};

/// A non-empty collection of issues from one parse call.
///
/// `ParseError` implements `Semigroup`, so failures from independent parses
/// can be combined:
///
/// ```rust
/// use assay::{Issue, ParseError, Path};
/// use stillwater::prelude::*;
///
/// let a = ParseError::single(Issue::custom("first").at(Path::from_segments(["a"])));
/// let b = ParseError::single(Issue::custom("second").at(Path::from_segments(["b"])));
///
/// let combined = a.combine(b);
/// assert_eq!(combined.len(), 2);
/// ```
#[derive(Clone)]
pub struct ParseError {
    issues: NonEmptyVec<Issue>,
    error_map: Option<Arc<dyn ErrorMap>>,
}

impl ParseError {
    pub fn single(issue: Issue) -> Self {
        Self::from_non_empty(NonEmptyVec::singleton(issue))
    }

    pub fn from_non_empty(issues: NonEmptyVec<Issue>) -> Self {
        Self {
            issues,
            error_map: None,
        }
    }

    /// Returns `None` when `issues` is empty.
    pub fn from_vec(issues: Vec<Issue>) -> Option<Self> {
        NonEmptyVec::from_vec(issues).map(Self::from_non_empty)
    }

    /// Attaches the error map used to render messages.
    pub fn with_error_map(mut self, error_map: Option<Arc<dyn ErrorMap>>) -> Self {
        self.error_map = error_map;
        self
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    pub fn first(&self) -> &Issue {
        self.issues.head()
    }

    pub fn issues(&self) -> Vec<&Issue> {
        self.issues.iter().collect()
    }

    pub fn into_vec(self) -> Vec<Issue> {
        self.issues.into_vec()
    }

    pub fn as_non_empty_vec(&self) -> &NonEmptyVec<Issue> {
        &self.issues
    }

    /// All top-level issues located at `path`.
    pub fn at_path(&self, path: &Path) -> Vec<&Issue> {
        self.issues.iter().filter(|i| &i.path == path).collect()
    }

    /// All top-level issues with `code`.
    pub fn with_code(&self, code: IssueCode) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.code() == code).collect()
    }

    /// The rendered message for `issue` under this error's error map.
    pub fn message_for(&self, issue: &Issue) -> String {
        resolve_message(issue, self.error_map.as_deref())
    }

    /// Rendered messages of every top-level issue, in order.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|i| self.message_for(i)).collect()
    }

    /// Groups messages by their first path segment.
    ///
    /// Issues at the root become form errors; everything else is a field error
    /// under the first segment of its path.
    pub fn flatten(&self) -> FlattenedError {
        let mut flattened = FlattenedError::default();
        for issue in self.issues.iter() {
            let message = self.message_for(issue);
            match issue.path.first() {
                Some(segment) => flattened
                    .field_errors
                    .entry(segment.to_string())
                    .or_default()
                    .push(message),
                None => flattened.form_errors.push(message),
            }
        }
        flattened
    }

    /// Rebuilds the shape of the input with an `_errors` list at every node.
    ///
    /// Union failures contribute the issues of every member, and key and
    /// element failures contribute their sub-issues, each at its own path.
    pub fn format(&self) -> ErrorTree {
        let mut tree = ErrorTree::default();
        for issue in self.issues.iter() {
            self.format_into(&mut tree, issue);
        }
        tree
    }

    fn format_into(&self, tree: &mut ErrorTree, issue: &Issue) {
        match &issue.kind {
            IssueKind::InvalidUnion { errors } if !errors.is_empty() => {
                for nested in errors.iter().flatten() {
                    self.format_into(tree, nested);
                }
            }
            IssueKind::InvalidKey { issues, .. } | IssueKind::InvalidElement { issues, .. } => {
                for nested in issues {
                    self.format_into(tree, nested);
                }
            }
            _ => {
                let node = issue
                    .path
                    .segments()
                    .fold(tree, |node, segment| node.child_mut(segment));
                node.errors.push(self.message_for(issue));
            }
        }
    }

    /// Human-readable multi-line report, shortest paths first.
    pub fn prettify(&self) -> String {
        let mut issues: Vec<&Issue> = self.issues.iter().collect();
        issues.sort_by_key(|i| i.path.len());

        let mut lines = Vec::new();
        for issue in issues {
            lines.push(format!("✖ {}", self.message_for(issue)));
            if !issue.path.is_root() {
                lines.push(format!("  → at {}", issue.path));
            }
        }
        lines.join("\n")
    }

    /// Renders every issue as JSON.
    pub fn to_json(&self) -> JsonValue {
        let map: &dyn ErrorMap = match &self.error_map {
            Some(map) => map.as_ref(),
            None => &DefaultErrorMap,
        };
        JsonValue::Array(self.issues.iter().map(|i| i.to_json(map)).collect())
    }
}

impl Semigroup for ParseError {
    fn combine(self, other: Self) -> Self {
        let error_map = self.error_map.or(other.error_map);
        Self {
            issues: self.issues.combine(other.issues),
            error_map,
        }
    }
}

impl PartialEq for ParseError {
    fn eq(&self, other: &Self) -> bool {
        self.issues == other.issues
    }
}

impl Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseError")
            .field("issues", &self.issues)
            .finish()
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} issue(s):", self.len())?;
        for (i, issue) in self.issues.iter().enumerate() {
            let path = if issue.path.is_root() {
                "(root)".to_string()
            } else {
                issue.path.to_string()
            };
            writeln!(f, "  {}. {}: {}", i + 1, path, self.message_for(issue))?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl IntoIterator for ParseError {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseError {
    type Item = &'a Issue;
    type IntoIter = Box<dyn Iterator<Item = &'a Issue> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.issues.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ParseError>();
    assert_sync::<ParseError>();
};

/// Messages grouped into form-level and per-field lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedError {
    pub form_errors: Vec<String>,
    pub field_errors: IndexMap<String, Vec<String>>,
}

/// A tree mirroring the input's shape, with messages at each node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorTree {
    pub errors: Vec<String>,
    pub children: IndexMap<String, ErrorTree>,
}

impl ErrorTree {
    fn child_mut(&mut self, segment: &PathSegment) -> &mut ErrorTree {
        self.children.entry(segment.to_string()).or_default()
    }

    /// The subtree for one key or index.
    pub fn get(&self, segment: impl Into<PathSegment>) -> Option<&ErrorTree> {
        self.children.get(&segment.into().to_string())
    }

    /// The subtree at `path`.
    pub fn at(&self, path: &Path) -> Option<&ErrorTree> {
        path.segments()
            .try_fold(self, |node, segment| node.children.get(&segment.to_string()))
    }

    /// Renders as `{"_errors": [...], "<key>": {...}}`.
    pub fn to_json(&self) -> JsonValue {
        let mut obj = JsonMap::new();
        obj.insert(
            "_errors".into(),
            JsonValue::Array(self.errors.iter().cloned().map(JsonValue::String).collect()),
        );
        for (key, child) in &self.children {
            obj.insert(key.clone(), child.to_json());
        }
        JsonValue::Object(obj)
    }
}
