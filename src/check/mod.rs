//! The check subsystem.
//!
//! A [`Check`] is an independent validator or value rewriter attached to a
//! schema node. Checks run in attachment order after the node's structural
//! validation. Each carries an `abort` flag (a failure stops later checks on
//! the same node), an optional `when` gate, an optional author message, and
//! contributes to the node's [`Bag`] when attached.

mod bag;
mod format;
mod numeric;

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use regex::Regex;

use crate::engine::Payload;
use crate::error::{EngineError, Issue, IssueKind, Numeric, Origin, SchemaBuildError};
use crate::path::Path;
use crate::schema::Schema;
use crate::value::Value;

pub use bag::Bag;
pub use format::{datetime_pattern, DateTimeOptions, StringFormat};
pub use numeric::{float_safe_remainder, BigIntFormat, NumberFormat, MAX_SAFE_INTEGER};

pub(crate) use numeric::numeric_of;

/// Gate deciding whether a check runs for the current payload.
pub type WhenFn = Arc<dyn Fn(&Payload) -> bool + Send + Sync>;

/// A value rewrite applied by an overwrite check.
pub type OverwriteFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Collects issues raised by refinements and transforms.
///
/// Paths given to [`add_issue`](RefinementCtx::add_issue) are relative to
/// the value being refined.
#[derive(Debug, Default)]
pub struct RefinementCtx {
    issues: Vec<Issue>,
}

impl RefinementCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Adds a continuing `custom` issue with `message`.
    pub fn add_custom(&mut self, message: impl Into<String>) {
        self.issues.push(Issue::custom(message).continuing(true));
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub(crate) fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

/// User-supplied validation logic.
#[derive(Clone)]
pub enum Refinement {
    Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
    AsyncPredicate(Arc<dyn Fn(&Value) -> BoxFuture<'static, bool> + Send + Sync>),
    Super(Arc<dyn Fn(&Value, &mut RefinementCtx) + Send + Sync>),
}

/// The kind-specific part of a check.
#[derive(Clone)]
pub enum CheckKind {
    LessThan {
        value: Numeric,
        inclusive: bool,
    },
    GreaterThan {
        value: Numeric,
        inclusive: bool,
    },
    MultipleOf(Numeric),
    NumberFormat(NumberFormat),
    BigIntFormat(BigIntFormat),
    MaxSize(u64),
    MinSize(u64),
    SizeEquals(u64),
    MaxLength(usize),
    MinLength(usize),
    LengthEquals(usize),
    StringFormat {
        format: StringFormat,
        pattern: Option<Regex>,
    },
    /// Validates one property of an object value against a schema.
    Property {
        key: String,
        schema: Schema,
    },
    MimeType(Vec<String>),
    Overwrite(OverwriteFn),
    Custom(Refinement),
}

impl CheckKind {
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::LessThan { .. } => "less_than",
            CheckKind::GreaterThan { .. } => "greater_than",
            CheckKind::MultipleOf(_) => "multiple_of",
            CheckKind::NumberFormat(_) => "number_format",
            CheckKind::BigIntFormat(_) => "bigint_format",
            CheckKind::MaxSize(_) => "max_size",
            CheckKind::MinSize(_) => "min_size",
            CheckKind::SizeEquals(_) => "size_equals",
            CheckKind::MaxLength(_) => "max_length",
            CheckKind::MinLength(_) => "min_length",
            CheckKind::LengthEquals(_) => "length_equals",
            CheckKind::StringFormat { .. } => "string_format",
            CheckKind::Property { .. } => "property",
            CheckKind::MimeType(_) => "mime_type",
            CheckKind::Overwrite(_) => "overwrite",
            CheckKind::Custom(_) => "custom",
        }
    }
}

/// Result of evaluating a check that needs nothing but the value.
pub(crate) enum Verdict {
    Pass,
    /// A failure that lets later checks run unless the check aborts.
    Fail(IssueKind),
    /// A failure that stops later checks on the node.
    Fatal(IssueKind),
    /// The check needs the engine (overwrite, property, custom).
    Deferred,
}

/// An attachable validator or value rewriter.
///
/// # Example
///
/// ```rust
/// use assay::{Check, Schema, SchemaLike};
///
/// let schema = Schema::string().check(Check::min_length(3).message("too short"));
/// assert!(schema.safe_parse("ab").unwrap().is_failure());
/// ```
#[derive(Clone)]
pub struct Check {
    pub(crate) kind: CheckKind,
    pub(crate) abort: bool,
    pub(crate) when: Option<WhenFn>,
    pub(crate) message: Option<String>,
    pub(crate) path: Option<Path>,
    pub(crate) params: Option<serde_json::Value>,
}

impl Check {
    pub fn new(kind: CheckKind) -> Self {
        Self {
            kind,
            abort: false,
            when: None,
            message: None,
            path: None,
            params: None,
        }
    }

    pub fn lt(value: impl Into<Numeric>) -> Self {
        Self::new(CheckKind::LessThan {
            value: value.into(),
            inclusive: false,
        })
    }

    pub fn lte(value: impl Into<Numeric>) -> Self {
        Self::new(CheckKind::LessThan {
            value: value.into(),
            inclusive: true,
        })
    }

    pub fn gt(value: impl Into<Numeric>) -> Self {
        Self::new(CheckKind::GreaterThan {
            value: value.into(),
            inclusive: false,
        })
    }

    pub fn gte(value: impl Into<Numeric>) -> Self {
        Self::new(CheckKind::GreaterThan {
            value: value.into(),
            inclusive: true,
        })
    }

    pub fn multiple_of(value: impl Into<Numeric>) -> Self {
        Self::new(CheckKind::MultipleOf(value.into()))
    }

    pub fn number_format(format: NumberFormat) -> Self {
        Self::new(CheckKind::NumberFormat(format))
    }

    pub fn bigint_format(format: BigIntFormat) -> Self {
        Self::new(CheckKind::BigIntFormat(format))
    }

    pub fn min_length(min: usize) -> Self {
        Self::new(CheckKind::MinLength(min))
    }

    pub fn max_length(max: usize) -> Self {
        Self::new(CheckKind::MaxLength(max))
    }

    pub fn length(len: usize) -> Self {
        Self::new(CheckKind::LengthEquals(len))
    }

    pub fn min_size(min: u64) -> Self {
        Self::new(CheckKind::MinSize(min))
    }

    pub fn max_size(max: u64) -> Self {
        Self::new(CheckKind::MaxSize(max))
    }

    pub fn size(size: u64) -> Self {
        Self::new(CheckKind::SizeEquals(size))
    }

    pub fn format(format: StringFormat) -> Self {
        Self::new(CheckKind::StringFormat {
            format,
            pattern: None,
        })
    }

    /// A string format matched by a caller-supplied expression.
    pub fn regex(pattern: &str) -> Result<Self, SchemaBuildError> {
        let regex = Regex::new(pattern)?;
        Ok(Self::new(CheckKind::StringFormat {
            format: StringFormat::Regex,
            pattern: Some(regex),
        }))
    }

    pub fn datetime(options: DateTimeOptions) -> Result<Self, SchemaBuildError> {
        let regex = Regex::new(&datetime_pattern(options))?;
        Ok(Self::new(CheckKind::StringFormat {
            format: StringFormat::DateTime,
            pattern: Some(regex),
        }))
    }

    pub fn includes(needle: impl Into<String>) -> Self {
        Self::format(StringFormat::Includes(needle.into()))
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        Self::format(StringFormat::StartsWith(prefix.into()))
    }

    pub fn ends_with(suffix: impl Into<String>) -> Self {
        Self::format(StringFormat::EndsWith(suffix.into()))
    }

    pub fn property(key: impl Into<String>, schema: impl Into<Schema>) -> Self {
        Self::new(CheckKind::Property {
            key: key.into(),
            schema: schema.into(),
        })
    }

    pub fn mime<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CheckKind::MimeType(types.into_iter().map(Into::into).collect()))
    }

    pub fn overwrite<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self::new(CheckKind::Overwrite(Arc::new(f)))
    }

    pub fn trim() -> Self {
        Self::map_string(|s| s.trim().to_string())
    }

    pub fn to_lower_case() -> Self {
        Self::map_string(str::to_lowercase)
    }

    pub fn to_upper_case() -> Self {
        Self::map_string(str::to_uppercase)
    }

    fn map_string(f: fn(&str) -> String) -> Self {
        Self::overwrite(move |value| match value {
            Value::String(s) => Value::String(f(&s)),
            other => other,
        })
    }

    pub fn refine<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(CheckKind::Custom(Refinement::Predicate(Arc::new(predicate))))
    }

    pub fn refine_async<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> BoxFuture<'static, bool> + Send + Sync + 'static,
    {
        Self::new(CheckKind::Custom(Refinement::AsyncPredicate(Arc::new(
            predicate,
        ))))
    }

    pub fn super_refine<F>(f: F) -> Self
    where
        F: Fn(&Value, &mut RefinementCtx) + Send + Sync + 'static,
    {
        Self::new(CheckKind::Custom(Refinement::Super(Arc::new(f))))
    }

    /// Stops later checks on the node when this check fails.
    pub fn abort(mut self) -> Self {
        self.abort = true;
        self
    }

    /// Runs the check only when `gate` returns true, even after fatal issues.
    pub fn when<F>(mut self, gate: F) -> Self
    where
        F: Fn(&Payload) -> bool + Send + Sync + 'static,
    {
        self.when = Some(Arc::new(gate));
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Extra path appended to issues from a custom check.
    pub fn path(mut self, path: Path) -> Self {
        self.path = Some(path);
        self
    }

    /// Extra data reported on `custom` issues.
    pub fn params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn kind(&self) -> &CheckKind {
        &self.kind
    }

    pub fn is_abort(&self) -> bool {
        self.abort
    }

    pub(crate) fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    /// Whether the check runs for `payload`.
    ///
    /// Length and size checks run whenever the value exposes a length or size;
    /// every other check runs only while no fatal issue exists for the value.
    pub(crate) fn should_run(&self, payload: &Payload, aborted: bool) -> bool {
        if let Some(gate) = &self.when {
            return gate(payload);
        }
        match self.kind {
            CheckKind::MaxLength(_) | CheckKind::MinLength(_) | CheckKind::LengthEquals(_) => {
                payload.value.length().is_some()
            }
            CheckKind::MaxSize(_) | CheckKind::MinSize(_) | CheckKind::SizeEquals(_) => {
                payload.value.size().is_some()
            }
            _ => !aborted,
        }
    }

    /// Folds this check's contribution into `bag`.
    pub fn attach(&self, bag: Bag) -> Bag {
        match &self.kind {
            CheckKind::LessThan { value, inclusive } => bag.tighten_max(*value, *inclusive),
            CheckKind::GreaterThan { value, inclusive } => bag.tighten_min(*value, *inclusive),
            CheckKind::MultipleOf(step) => Bag {
                multiple_of: Some(*step),
                ..bag
            },
            CheckKind::NumberFormat(format) => {
                let (min, max) = format.range();
                let bag = Bag {
                    format: Some(format.name()),
                    ..bag
                };
                bag.tighten_min(Numeric::Number(min), true)
                    .tighten_max(Numeric::Number(max), true)
            }
            CheckKind::BigIntFormat(format) => {
                let (min, max) = format.range();
                let bag = Bag {
                    format: Some(format.name()),
                    ..bag
                };
                bag.tighten_min(Numeric::BigInt(min), true)
                    .tighten_max(Numeric::BigInt(max), true)
            }
            CheckKind::MaxSize(max) => bag.with_max_size(*max),
            CheckKind::MinSize(min) => bag.with_min_size(*min),
            CheckKind::SizeEquals(size) => bag.with_min_size(*size).with_max_size(*size),
            CheckKind::MaxLength(max) => bag.with_max_length(*max),
            CheckKind::MinLength(min) => bag.with_min_length(*min),
            CheckKind::LengthEquals(len) => bag.with_min_length(*len).with_max_length(*len),
            CheckKind::StringFormat { format, pattern } => {
                let mut bag = bag;
                match format {
                    StringFormat::Regex | StringFormat::TemplateLiteral => {}
                    StringFormat::Includes(_)
                    | StringFormat::StartsWith(_)
                    | StringFormat::EndsWith(_) => {}
                    other => bag.format = Some(other.name()),
                }
                if let Some(regex) = pattern {
                    bag.patterns.push(regex.as_str().to_string());
                }
                bag
            }
            CheckKind::MimeType(types) => {
                let mut bag = bag;
                bag.mime.extend(types.iter().cloned());
                bag
            }
            CheckKind::Property { .. } | CheckKind::Overwrite(_) | CheckKind::Custom(_) => bag,
        }
    }

    /// Evaluates checks that depend only on the value.
    pub(crate) fn evaluate(&self, value: &Value) -> Result<Verdict, EngineError> {
        let verdict = match &self.kind {
            CheckKind::LessThan { value: bound, inclusive } => {
                let Some((actual, origin)) = numeric_of(value) else {
                    return Ok(Verdict::Pass);
                };
                let ordering = numeric::compare(&actual, bound)?;
                let ok = match ordering {
                    Some(std::cmp::Ordering::Less) => true,
                    Some(std::cmp::Ordering::Equal) => *inclusive,
                    _ => false,
                };
                fail_unless(
                    ok,
                    IssueKind::TooBig {
                        origin,
                        maximum: *bound,
                        inclusive: *inclusive,
                        exact: false,
                    },
                )
            }
            CheckKind::GreaterThan { value: bound, inclusive } => {
                let Some((actual, origin)) = numeric_of(value) else {
                    return Ok(Verdict::Pass);
                };
                let ordering = numeric::compare(&actual, bound)?;
                let ok = match ordering {
                    Some(std::cmp::Ordering::Greater) => true,
                    Some(std::cmp::Ordering::Equal) => *inclusive,
                    _ => false,
                };
                fail_unless(
                    ok,
                    IssueKind::TooSmall {
                        origin,
                        minimum: *bound,
                        inclusive: *inclusive,
                        exact: false,
                    },
                )
            }
            CheckKind::MultipleOf(divisor) => {
                let Some((actual, origin)) = numeric_of(value) else {
                    return Ok(Verdict::Pass);
                };
                fail_unless(
                    numeric::is_multiple(&actual, divisor)?,
                    IssueKind::NotMultipleOf {
                        origin,
                        divisor: *divisor,
                    },
                )
            }
            CheckKind::NumberFormat(format) => match value {
                Value::Number(n) => match numeric::check_number_format(*n, *format) {
                    Some((kind, true)) => Verdict::Fatal(kind),
                    Some((kind, false)) => Verdict::Fail(kind),
                    None => Verdict::Pass,
                },
                _ => Verdict::Pass,
            },
            CheckKind::BigIntFormat(format) => match value {
                Value::BigInt(n) => match numeric::check_bigint_format(*n, *format) {
                    Some(kind) => Verdict::Fail(kind),
                    None => Verdict::Pass,
                },
                _ => Verdict::Pass,
            },
            CheckKind::MaxLength(max) => {
                measured(value.length().map(|l| l as u64), value, |len, origin| {
                    (len > *max as u64).then(|| IssueKind::TooBig {
                        origin,
                        maximum: Numeric::Number(*max as f64),
                        inclusive: true,
                        exact: false,
                    })
                })
            }
            CheckKind::MinLength(min) => {
                measured(value.length().map(|l| l as u64), value, |len, origin| {
                    (len < *min as u64).then(|| IssueKind::TooSmall {
                        origin,
                        minimum: Numeric::Number(*min as f64),
                        inclusive: true,
                        exact: false,
                    })
                })
            }
            CheckKind::LengthEquals(expected) => {
                measured(value.length().map(|l| l as u64), value, |len, origin| {
                    exact_issue(len, *expected as u64, origin)
                })
            }
            CheckKind::MaxSize(max) => measured(value.size(), value, |size, origin| {
                (size > *max).then(|| IssueKind::TooBig {
                    origin,
                    maximum: Numeric::Number(*max as f64),
                    inclusive: true,
                    exact: false,
                })
            }),
            CheckKind::MinSize(min) => measured(value.size(), value, |size, origin| {
                (size < *min).then(|| IssueKind::TooSmall {
                    origin,
                    minimum: Numeric::Number(*min as f64),
                    inclusive: true,
                    exact: false,
                })
            }),
            CheckKind::SizeEquals(expected) => measured(value.size(), value, |size, origin| {
                exact_issue(size, *expected, origin)
            }),
            CheckKind::StringFormat { format, pattern } => match value {
                Value::String(s) => fail_unless(
                    format.matches(s, pattern.as_ref()),
                    IssueKind::InvalidFormat {
                        format: format.clone(),
                        pattern: pattern.as_ref().map(|r| r.as_str().to_string()),
                    },
                ),
                _ => Verdict::Pass,
            },
            CheckKind::MimeType(types) => match value {
                Value::File(file) => fail_unless(
                    types.iter().any(|t| t == &file.mime_type),
                    IssueKind::InvalidValue {
                        values: types.iter().map(|t| t.as_str().into()).collect(),
                    },
                ),
                _ => Verdict::Pass,
            },
            CheckKind::Property { .. } | CheckKind::Overwrite(_) | CheckKind::Custom(_) => {
                Verdict::Deferred
            }
        };
        Ok(verdict)
    }

    /// Builds the issue for a failed check, applying message and abort.
    pub(crate) fn issue(&self, kind: IssueKind, fatal: bool) -> Issue {
        let mut issue = Issue::new(kind).continuing(!fatal && !self.abort);
        issue.message = self.message.clone();
        issue
    }
}

fn fail_unless(ok: bool, kind: IssueKind) -> Verdict {
    if ok {
        Verdict::Pass
    } else {
        Verdict::Fail(kind)
    }
}

fn measured(
    amount: Option<u64>,
    value: &Value,
    test: impl FnOnce(u64, Origin) -> Option<IssueKind>,
) -> Verdict {
    match (amount, Origin::of(value)) {
        (Some(amount), Some(origin)) => match test(amount, origin) {
            Some(kind) => Verdict::Fail(kind),
            None => Verdict::Pass,
        },
        _ => Verdict::Pass,
    }
}

fn exact_issue(actual: u64, expected: u64, origin: Origin) -> Option<IssueKind> {
    if actual > expected {
        Some(IssueKind::TooBig {
            origin,
            maximum: Numeric::Number(expected as f64),
            inclusive: true,
            exact: true,
        })
    } else if actual < expected {
        Some(IssueKind::TooSmall {
            origin,
            minimum: Numeric::Number(expected as f64),
            inclusive: true,
            exact: true,
        })
    } else {
        None
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("kind", &self.kind.name())
            .field("abort", &self.abort)
            .field("when", &self.when.is_some())
            .field("message", &self.message)
            .finish()
    }
}
