//! The issue vocabulary.
//!
//! An [`Issue`] records one validation failure: a code-specific payload
//! ([`IssueKind`]), the [`Path`] from the root of the parse call, and a
//! `continues` flag telling the engine whether later checks on the same node
//! may still run. Issues never hold a rendered message unless the schema
//! author supplied one; rendering is done by an [`ErrorMap`](super::ErrorMap).

use std::fmt::{self, Display};

use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::check::StringFormat;
use crate::path::{Path, PathSegment};
use crate::value::{format_number, Primitive, Value};

/// The closed set of issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    InvalidType,
    InvalidLiteral,
    UnrecognizedKeys,
    InvalidUnion,
    InvalidUnionDiscriminator,
    InvalidEnumValue,
    InvalidFormat,
    TooSmall,
    TooBig,
    NotMultipleOf,
    InvalidIntersectionTypes,
    NotFinite,
    Custom,
    InvalidKey,
    InvalidElement,
    InvalidValue,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::InvalidType => "invalid_type",
            IssueCode::InvalidLiteral => "invalid_literal",
            IssueCode::UnrecognizedKeys => "unrecognized_keys",
            IssueCode::InvalidUnion => "invalid_union",
            IssueCode::InvalidUnionDiscriminator => "invalid_union_discriminator",
            IssueCode::InvalidEnumValue => "invalid_enum_value",
            IssueCode::InvalidFormat => "invalid_format",
            IssueCode::TooSmall => "too_small",
            IssueCode::TooBig => "too_big",
            IssueCode::NotMultipleOf => "not_multiple_of",
            IssueCode::InvalidIntersectionTypes => "invalid_intersection_types",
            IssueCode::NotFinite => "not_finite",
            IssueCode::Custom => "custom",
            IssueCode::InvalidKey => "invalid_key",
            IssueCode::InvalidElement => "invalid_element",
            IssueCode::InvalidValue => "invalid_value",
        }
    }
}

impl Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of value a size, length, or magnitude bound was measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Number,
    BigInt,
    Date,
    String,
    Array,
    Set,
    Map,
    File,
    Record,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Number => "number",
            Origin::BigInt => "bigint",
            Origin::Date => "date",
            Origin::String => "string",
            Origin::Array => "array",
            Origin::Set => "set",
            Origin::Map => "map",
            Origin::File => "file",
            Origin::Record => "record",
        }
    }

    /// The counting unit for sized origins, used in messages.
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Origin::String => Some("characters"),
            Origin::Array | Origin::Set | Origin::Map => Some("items"),
            Origin::File => Some("bytes"),
            _ => None,
        }
    }

    /// Origin of a value that exposes a length or size.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => Some(Origin::String),
            Value::Array(_) => Some(Origin::Array),
            Value::Set(_) => Some(Origin::Set),
            Value::Map(_) => Some(Origin::Map),
            Value::File(_) => Some(Origin::File),
            Value::Number(_) => Some(Origin::Number),
            Value::BigInt(_) => Some(Origin::BigInt),
            Value::Date(_) => Some(Origin::Date),
            _ => None,
        }
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric bound: a number, a big integer, or a date in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Number(f64),
    BigInt(i128),
    Date(f64),
}

impl Numeric {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Numeric::Number(n) => Value::Number(*n).to_json(),
            Numeric::BigInt(n) => Value::BigInt(*n).to_json(),
            Numeric::Date(ms) => Value::Date(*ms).to_json(),
        }
    }
}

impl Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Number(n) => f.write_str(&format_number(*n)),
            Numeric::BigInt(n) => write!(f, "{}", n),
            Numeric::Date(ms) => {
                let rendered = chrono::DateTime::from_timestamp_millis(*ms as i64)
                    .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
                    .unwrap_or_else(|| format_number(*ms));
                f.write_str(&rendered)
            }
        }
    }
}

impl From<f64> for Numeric {
    fn from(n: f64) -> Self {
        Numeric::Number(n)
    }
}

impl From<i128> for Numeric {
    fn from(n: i128) -> Self {
        Numeric::BigInt(n)
    }
}

/// The code-specific payload of an issue.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    InvalidType {
        expected: &'static str,
        received: &'static str,
    },
    InvalidLiteral {
        expected: Vec<Primitive>,
    },
    UnrecognizedKeys {
        keys: Vec<String>,
    },
    /// Every member failed; one issue list per member, in member order.
    InvalidUnion {
        errors: Vec<Vec<Issue>>,
    },
    InvalidUnionDiscriminator {
        discriminator: String,
        options: Vec<Primitive>,
    },
    InvalidEnumValue {
        options: Vec<Primitive>,
    },
    InvalidFormat {
        format: StringFormat,
        pattern: Option<String>,
    },
    TooSmall {
        origin: Origin,
        minimum: Numeric,
        inclusive: bool,
        exact: bool,
    },
    TooBig {
        origin: Origin,
        maximum: Numeric,
        inclusive: bool,
        exact: bool,
    },
    NotMultipleOf {
        origin: Origin,
        divisor: Numeric,
    },
    InvalidIntersectionTypes {
        merge_path: Path,
    },
    NotFinite,
    Custom {
        params: Option<JsonValue>,
    },
    /// A record or map key failed its key schema.
    InvalidKey {
        origin: Origin,
        issues: Vec<Issue>,
    },
    /// A map value failed its value schema under a key with no natural path.
    InvalidElement {
        origin: Origin,
        key: Value,
        issues: Vec<Issue>,
    },
    InvalidValue {
        values: Vec<Primitive>,
    },
}

impl IssueKind {
    pub fn code(&self) -> IssueCode {
        match self {
            IssueKind::InvalidType { .. } => IssueCode::InvalidType,
            IssueKind::InvalidLiteral { .. } => IssueCode::InvalidLiteral,
            IssueKind::UnrecognizedKeys { .. } => IssueCode::UnrecognizedKeys,
            IssueKind::InvalidUnion { .. } => IssueCode::InvalidUnion,
            IssueKind::InvalidUnionDiscriminator { .. } => IssueCode::InvalidUnionDiscriminator,
            IssueKind::InvalidEnumValue { .. } => IssueCode::InvalidEnumValue,
            IssueKind::InvalidFormat { .. } => IssueCode::InvalidFormat,
            IssueKind::TooSmall { .. } => IssueCode::TooSmall,
            IssueKind::TooBig { .. } => IssueCode::TooBig,
            IssueKind::NotMultipleOf { .. } => IssueCode::NotMultipleOf,
            IssueKind::InvalidIntersectionTypes { .. } => IssueCode::InvalidIntersectionTypes,
            IssueKind::NotFinite => IssueCode::NotFinite,
            IssueKind::Custom { .. } => IssueCode::Custom,
            IssueKind::InvalidKey { .. } => IssueCode::InvalidKey,
            IssueKind::InvalidElement { .. } => IssueCode::InvalidElement,
            IssueKind::InvalidValue { .. } => IssueCode::InvalidValue,
        }
    }
}

/// One structured validation failure.
///
/// # Example
///
/// ```rust
/// use assay::{Issue, IssueCode, IssueKind, Path};
///
/// let issue = Issue::new(IssueKind::InvalidType { expected: "number", received: "string" })
///     .at(Path::from_segments(["age"]));
///
/// assert_eq!(issue.code(), IssueCode::InvalidType);
/// assert_eq!(issue.path.to_string(), "age");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub kind: IssueKind,
    /// Location relative to the root of the parse call.
    pub path: Path,
    /// The offending input, when the caller asked for inputs to be reported.
    pub input: Option<Value>,
    /// A message supplied by the schema author; overrides every error map.
    pub message: Option<String>,
    /// Whether later checks on the same node may still run.
    pub continues: bool,
}

impl Issue {
    /// Creates a root-level issue that stops later checks on its node.
    pub fn new(kind: IssueKind) -> Self {
        Self {
            kind,
            path: Path::root(),
            input: None,
            message: None,
            continues: false,
        }
    }

    /// Shorthand for an `invalid_type` issue.
    pub fn invalid_type(expected: &'static str, input: &Value) -> Self {
        Self::new(IssueKind::InvalidType {
            expected,
            received: input.type_name(),
        })
    }

    /// Shorthand for a `custom` issue with a message.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(IssueKind::Custom { params: None }).with_message(message)
    }

    pub fn at(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the message only if none was supplied yet.
    pub fn with_fallback_message(mut self, message: Option<&str>) -> Self {
        if self.message.is_none() {
            self.message = message.map(str::to_string);
        }
        self
    }

    pub fn continuing(mut self, continues: bool) -> Self {
        self.continues = continues;
        self
    }

    pub fn code(&self) -> IssueCode {
        self.kind.code()
    }

    /// Re-homes this issue (and any nested issues) under `segment`.
    pub fn prefix(&mut self, segment: &PathSegment) {
        self.path.prepend(segment.clone());
        for nested in self.nested_mut() {
            nested.prefix(segment);
        }
    }

    /// Re-homes this issue (and any nested issues) under `prefix`.
    pub fn prefix_path(&mut self, prefix: &Path) {
        if prefix.is_root() {
            return;
        }
        self.path.prepend_path(prefix);
        for nested in self.nested_mut() {
            nested.prefix_path(prefix);
        }
    }

    fn nested_mut(&mut self) -> Box<dyn Iterator<Item = &mut Issue> + '_> {
        match &mut self.kind {
            IssueKind::InvalidUnion { errors } => Box::new(errors.iter_mut().flatten()),
            IssueKind::InvalidKey { issues, .. } | IssueKind::InvalidElement { issues, .. } => {
                Box::new(issues.iter_mut())
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Issues carried inside this one (union members, key and element failures).
    pub fn nested(&self) -> Vec<&Issue> {
        match &self.kind {
            IssueKind::InvalidUnion { errors } => errors.iter().flatten().collect(),
            IssueKind::InvalidKey { issues, .. } | IssueKind::InvalidElement { issues, .. } => {
                issues.iter().collect()
            }
            _ => Vec::new(),
        }
    }

    /// Renders the issue as JSON, resolving messages through `error_map`.
    pub fn to_json(&self, error_map: &dyn super::ErrorMap) -> JsonValue {
        let mut obj = JsonMap::new();
        obj.insert("code".into(), json!(self.code().as_str()));
        obj.insert("path".into(), self.path.to_json());
        obj.insert("message".into(), json!(super::resolve_message(self, Some(error_map))));

        let nested_json = |issues: &[Issue]| -> JsonValue {
            JsonValue::Array(issues.iter().map(|i| i.to_json(error_map)).collect())
        };
        let primitives =
            |values: &[Primitive]| JsonValue::Array(values.iter().map(Primitive::to_json).collect());

        match &self.kind {
            IssueKind::InvalidType { expected, received } => {
                obj.insert("expected".into(), json!(expected));
                obj.insert("received".into(), json!(received));
            }
            IssueKind::InvalidLiteral { expected } => {
                obj.insert("expected".into(), primitives(expected));
            }
            IssueKind::UnrecognizedKeys { keys } => {
                obj.insert("keys".into(), json!(keys));
            }
            IssueKind::InvalidUnion { errors } => {
                obj.insert(
                    "errors".into(),
                    JsonValue::Array(errors.iter().map(|group| nested_json(group)).collect()),
                );
            }
            IssueKind::InvalidUnionDiscriminator {
                discriminator,
                options,
            } => {
                obj.insert("discriminator".into(), json!(discriminator));
                obj.insert("options".into(), primitives(options));
            }
            IssueKind::InvalidEnumValue { options } => {
                obj.insert("options".into(), primitives(options));
            }
            IssueKind::InvalidFormat { format, pattern } => {
                obj.insert("format".into(), json!(format.name()));
                if let Some(pattern) = pattern {
                    obj.insert("pattern".into(), json!(pattern));
                }
            }
            IssueKind::TooSmall {
                origin,
                minimum,
                inclusive,
                exact,
            } => {
                obj.insert("origin".into(), json!(origin.as_str()));
                obj.insert("minimum".into(), minimum.to_json());
                obj.insert("inclusive".into(), json!(inclusive));
                obj.insert("exact".into(), json!(exact));
            }
            IssueKind::TooBig {
                origin,
                maximum,
                inclusive,
                exact,
            } => {
                obj.insert("origin".into(), json!(origin.as_str()));
                obj.insert("maximum".into(), maximum.to_json());
                obj.insert("inclusive".into(), json!(inclusive));
                obj.insert("exact".into(), json!(exact));
            }
            IssueKind::NotMultipleOf { origin, divisor } => {
                obj.insert("origin".into(), json!(origin.as_str()));
                obj.insert("divisor".into(), divisor.to_json());
            }
            IssueKind::InvalidIntersectionTypes { merge_path } => {
                obj.insert("mergePath".into(), merge_path.to_json());
            }
            IssueKind::NotFinite => {}
            IssueKind::Custom { params } => {
                if let Some(params) = params {
                    obj.insert("params".into(), params.clone());
                }
            }
            IssueKind::InvalidKey { origin, issues } => {
                obj.insert("origin".into(), json!(origin.as_str()));
                obj.insert("issues".into(), nested_json(issues));
            }
            IssueKind::InvalidElement {
                origin,
                key,
                issues,
            } => {
                obj.insert("origin".into(), json!(origin.as_str()));
                obj.insert("key".into(), key.to_json());
                obj.insert("issues".into(), nested_json(issues));
            }
            IssueKind::InvalidValue { values } => {
                obj.insert("values".into(), primitives(values));
            }
        }

        if let Some(input) = &self.input {
            obj.insert("input".into(), input.to_json());
        }
        JsonValue::Object(obj)
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };
        write!(f, "{}: {}", path, super::resolve_message(self, None))
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issue>();
    assert_sync::<Issue>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DefaultErrorMap;

    #[test]
    fn test_prefix_reaches_nested_issues() {
        let member = Issue::invalid_type("string", &Value::Number(1.0)).at(Path::from_segments(["x"]));
        let mut union = Issue::new(IssueKind::InvalidUnion {
            errors: vec![vec![member]],
        });

        union.prefix(&PathSegment::Index(2));
        union.prefix(&PathSegment::key("items"));

        assert_eq!(union.path.to_string(), "items[2]");
        assert_eq!(union.nested()[0].path.to_string(), "items[2].x");
    }

    #[test]
    fn test_prefix_path_on_key_issue() {
        let inner = Issue::new(IssueKind::InvalidFormat {
            format: StringFormat::Email,
            pattern: None,
        });
        let mut issue = Issue::new(IssueKind::InvalidKey {
            origin: Origin::Record,
            issues: vec![inner],
        });
        issue.prefix_path(&Path::from_segments(["users"]));
        assert_eq!(issue.nested()[0].path.to_string(), "users");
    }

    #[test]
    fn test_to_json_carries_payload() {
        let issue = Issue::new(IssueKind::TooSmall {
            origin: Origin::Array,
            minimum: Numeric::Number(2.0),
            inclusive: true,
            exact: false,
        })
        .at(Path::from_segments(["tags"]));

        let json = issue.to_json(&DefaultErrorMap);
        assert_eq!(json["code"], "too_small");
        assert_eq!(json["path"], serde_json::json!(["tags"]));
        assert_eq!(json["minimum"], 2.0);
        assert_eq!(json["origin"], "array");
    }

    #[test]
    fn test_display_uses_root_marker() {
        let issue = Issue::custom("nope");
        assert_eq!(issue.to_string(), "(root): nope");
    }
}
