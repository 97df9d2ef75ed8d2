//! Message rendering.
//!
//! Messages are computed from an [`Issue`] on demand. Resolution order is:
//! the message the schema author attached to the issue, then the caller's
//! [`ErrorMap`] (passed through `ParseOptions`), then [`DefaultErrorMap`].

use crate::check::StringFormat;
use crate::value::Primitive;

use super::issue::{Issue, IssueKind, Origin};

/// Renders issues into human-readable messages.
///
/// Returning `None` defers to the default English messages. Any
/// `Fn(&Issue) -> Option<String>` closure is an error map.
///
/// # Example
///
/// ```rust
/// use assay::{ErrorMap, Issue, IssueCode};
///
/// let map = |issue: &Issue| match issue.code() {
///     IssueCode::InvalidType => Some("wrong type".to_string()),
///     _ => None,
/// };
/// let issue = Issue::invalid_type("string", &assay::Value::Null);
/// assert_eq!(map.message(&issue).as_deref(), Some("wrong type"));
/// ```
pub trait ErrorMap: Send + Sync {
    fn message(&self, issue: &Issue) -> Option<String>;
}

impl<F> ErrorMap for F
where
    F: Fn(&Issue) -> Option<String> + Send + Sync,
{
    fn message(&self, issue: &Issue) -> Option<String> {
        self(issue)
    }
}

/// The built-in English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorMap;

impl ErrorMap for DefaultErrorMap {
    fn message(&self, issue: &Issue) -> Option<String> {
        Some(default_message(issue))
    }
}

/// Resolves the message for `issue`.
pub fn resolve_message(issue: &Issue, error_map: Option<&dyn ErrorMap>) -> String {
    if let Some(message) = &issue.message {
        return message.clone();
    }
    error_map
        .and_then(|map| map.message(issue))
        .unwrap_or_else(|| default_message(issue))
}

fn join(values: &[Primitive], separator: &str) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

fn expected_one_of(values: &[Primitive]) -> String {
    match values {
        [single] => format!("Invalid input: expected {}", single),
        _ => format!("Invalid option: expected one of {}", join(values, "|")),
    }
}

fn format_noun(format: &StringFormat) -> &'static str {
    match format {
        StringFormat::Email => "email address",
        StringFormat::Url => "URL",
        StringFormat::Emoji => "emoji",
        StringFormat::Uuid | StringFormat::Guid => "UUID",
        StringFormat::NanoId => "nanoid",
        StringFormat::Cuid => "cuid",
        StringFormat::Cuid2 => "cuid2",
        StringFormat::Ulid => "ULID",
        StringFormat::Xid => "XID",
        StringFormat::Ksuid => "KSUID",
        StringFormat::DateTime => "ISO datetime",
        StringFormat::Date => "ISO date",
        StringFormat::Time => "ISO time",
        StringFormat::Duration => "ISO duration",
        StringFormat::Ipv4 => "IPv4 address",
        StringFormat::Ipv6 => "IPv6 address",
        StringFormat::CidrV4 => "IPv4 range",
        StringFormat::CidrV6 => "IPv6 range",
        StringFormat::Base64 => "base64-encoded string",
        StringFormat::Base64Url => "base64url-encoded string",
        StringFormat::E164 => "E.164 number",
        StringFormat::Jwt => "JWT",
        StringFormat::Lowercase => "lowercase string",
        StringFormat::Uppercase => "uppercase string",
        _ => "input",
    }
}

fn bound_message(
    prefix: &str,
    origin: Origin,
    relation: &str,
    bound: &super::issue::Numeric,
) -> String {
    match origin.unit() {
        Some(unit) => format!(
            "{}: expected {} to have {}{} {}",
            prefix, origin, relation, bound, unit
        ),
        None => format!("{}: expected {} to be {}{}", prefix, origin, relation, bound),
    }
}

/// The default English message for an issue, ignoring any author message.
pub fn default_message(issue: &Issue) -> String {
    match &issue.kind {
        IssueKind::InvalidType { expected, received } => {
            format!("Invalid input: expected {}, received {}", expected, received)
        }
        IssueKind::InvalidLiteral { expected } => expected_one_of(expected),
        IssueKind::InvalidEnumValue { options } => expected_one_of(options),
        IssueKind::InvalidValue { values } => expected_one_of(values),
        IssueKind::UnrecognizedKeys { keys } => {
            let plural = if keys.len() > 1 { "s" } else { "" };
            let quoted: Vec<String> = keys.iter().map(|k| format!("{:?}", k)).collect();
            format!("Unrecognized key{}: {}", plural, quoted.join(", "))
        }
        IssueKind::InvalidUnion { .. } => "Invalid input".to_string(),
        IssueKind::InvalidUnionDiscriminator { options, .. } => format!(
            "Invalid discriminator value. Expected {}",
            join(options, " | ")
        ),
        IssueKind::InvalidFormat { format, pattern } => match format {
            StringFormat::StartsWith(prefix) => {
                format!("Invalid string: must start with {:?}", prefix)
            }
            StringFormat::EndsWith(suffix) => format!("Invalid string: must end with {:?}", suffix),
            StringFormat::Includes(needle) => format!("Invalid string: must include {:?}", needle),
            StringFormat::Regex => format!(
                "Invalid string: must match pattern /{}/",
                pattern.as_deref().unwrap_or_default()
            ),
            other => format!("Invalid {}", format_noun(other)),
        },
        IssueKind::TooSmall {
            origin,
            minimum,
            inclusive,
            exact,
        } => {
            let relation = if *exact {
                ""
            } else if *inclusive {
                ">="
            } else {
                ">"
            };
            bound_message("Too small", *origin, relation, minimum)
        }
        IssueKind::TooBig {
            origin,
            maximum,
            inclusive,
            exact,
        } => {
            let relation = if *exact {
                ""
            } else if *inclusive {
                "<="
            } else {
                "<"
            };
            bound_message("Too big", *origin, relation, maximum)
        }
        IssueKind::NotMultipleOf { divisor, .. } => {
            format!("Invalid number: must be a multiple of {}", divisor)
        }
        IssueKind::InvalidIntersectionTypes { .. } => {
            "Intersection results could not be merged".to_string()
        }
        IssueKind::NotFinite => "Number must be finite".to_string(),
        IssueKind::Custom { .. } => "Invalid input".to_string(),
        IssueKind::InvalidKey { origin, .. } => format!("Invalid key in {}", origin),
        IssueKind::InvalidElement { origin, .. } => format!("Invalid value in {}", origin),
    }
}
