//! Issue paths.
//!
//! This module provides [`Path`] and [`PathSegment`], the ordered accessor
//! sequence that locates an issue relative to the root of a parse call.
//!
//! Composite nodes build paths bottom-up: a child reports issues relative to
//! itself and the parent prepends the segment it used to reach the child.

use std::fmt::{self, Display};

use serde_json::Value as JsonValue;

/// A single accessor in an issue path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// An object property, record key, or string map key.
    Key(String),
    /// An array or tuple index.
    Index(usize),
}

impl PathSegment {
    /// Creates a new key segment.
    pub fn key(name: impl Into<String>) -> Self {
        PathSegment::Key(name.into())
    }

    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }

    /// Renders the segment as a JSON path element (string or number).
    pub fn to_json(&self) -> JsonValue {
        match self {
            PathSegment::Key(key) => JsonValue::String(key.clone()),
            PathSegment::Index(idx) => JsonValue::from(*idx),
        }
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// A path from the root of a parse call to the value an issue is about.
///
/// # Example
///
/// ```rust
/// use assay::Path;
///
/// let path = Path::root().push_key("orders").push_index(2).push_key("total");
/// assert_eq!(path.to_string(), "orders[2].total");
/// assert_eq!(path.to_json(), serde_json::json!(["orders", 2, "total"]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The path of the value passed to `parse`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a list of segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a new path with a key segment appended.
    pub fn push_key(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(name.into()));
        Self { segments }
    }

    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Inserts `segment` in front of every existing segment.
    ///
    /// Used when a parent re-homes a child's issue into its own path space.
    pub fn prepend(&mut self, segment: PathSegment) {
        self.segments.insert(0, segment);
    }

    /// Inserts all of `prefix` in front of the existing segments.
    pub fn prepend_path(&mut self, prefix: &Path) {
        if prefix.is_root() {
            return;
        }
        let mut segments = prefix.segments.clone();
        segments.append(&mut self.segments);
        self.segments = segments;
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Depth below the root.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the first segment, or None if this is root.
    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// The enclosing path; `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// Renders the path as a JSON array of strings and numbers.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.segments.iter().map(PathSegment::to_json).collect())
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_empty() {
        let path = Path::root();
        assert!(path.is_root());
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_nested_keys_with_index() {
        let path = Path::root()
            .push_key("body")
            .push_key("data")
            .push_index(42)
            .push_key("name");
        assert_eq!(path.to_string(), "body.data[42].name");
    }

    #[test]
    fn test_prepend_rehomes_child_path() {
        let mut path = Path::root().push_key("email");
        path.prepend(PathSegment::Index(3));
        path.prepend(PathSegment::key("users"));
        assert_eq!(path.to_string(), "users[3].email");
        assert_eq!(path.first(), Some(&PathSegment::key("users")));
    }

    #[test]
    fn test_prepend_path() {
        let mut path = Path::from_segments(["city"]);
        path.prepend_path(&Path::root().push_key("address"));
        assert_eq!(path.to_string(), "address.city");

        let mut untouched = Path::from_segments(["x"]);
        untouched.prepend_path(&Path::root());
        assert_eq!(untouched.to_string(), "x");
    }

    #[test]
    fn test_push_leaves_base_untouched() {
        let lines = Path::root().push_key("lines");
        let first = lines.push_index(0).push_key("sku");
        let second = lines.push_index(1);

        assert_eq!(lines.len(), 1);
        assert_eq!(first.to_string(), "lines[0].sku");
        assert_eq!(second.last(), Some(&PathSegment::index(1)));
    }

    #[test]
    fn test_parent_path() {
        let path = Path::root().push_key("users").push_index(0).push_key("email");

        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "users[0]");
        let root = parent.parent().unwrap().parent().unwrap();
        assert!(root.is_root());
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_to_json() {
        let path = Path::root().push_key("a").push_index(1);
        assert_eq!(path.to_json(), serde_json::json!(["a", 1]));
    }
}
