//! String schema.
//!
//! This module provides [`StringSchema`] for validating strings with length
//! constraints, named formats, patterns, and normalizing rewrites.

use crate::check::{Check, DateTimeOptions, StringFormat};
use crate::error::SchemaBuildError;

use super::node::NodeKind;
use super::traits::{schema_builder, SchemaLike};
use super::Schema;

/// A schema for validating string values.
///
/// All constraint violations are reported together; a value that is not a
/// string produces a single `invalid_type` issue and no constraint issues.
///
/// # Example
///
/// ```rust
/// use assay::{IssueCode, Schema, SchemaLike};
///
/// let schema = Schema::string().min(3).max(20).regex(r"^[a-z]+$").unwrap();
///
/// let error = schema.safe_parse("AB").unwrap().into_result().unwrap_err();
/// // Both too short and pattern mismatch.
/// assert_eq!(error.len(), 2);
/// assert_eq!(error.first().code(), IssueCode::TooSmall);
/// ```
#[derive(Clone)]
pub struct StringSchema(Schema);

schema_builder!(StringSchema);

impl StringSchema {
    pub(crate) fn new(coerce: bool) -> Self {
        Self(Schema::from_kind(NodeKind::String { coerce }))
    }

    /// Requires at least `min` characters (Unicode scalar values).
    pub fn min(self, min: usize) -> Self {
        self.check(Check::min_length(min))
    }

    /// Requires at most `max` characters.
    pub fn max(self, max: usize) -> Self {
        self.check(Check::max_length(max))
    }

    /// Requires exactly `len` characters.
    pub fn length(self, len: usize) -> Self {
        self.check(Check::length(len))
    }

    pub fn nonempty(self) -> Self {
        self.min(1)
    }

    pub fn format(self, format: StringFormat) -> Self {
        self.check(Check::format(format))
    }

    pub fn email(self) -> Self {
        self.format(StringFormat::Email)
    }

    pub fn url(self) -> Self {
        self.format(StringFormat::Url)
    }

    pub fn uuid(self) -> Self {
        self.format(StringFormat::Uuid)
    }

    /// Any 8-4-4-4-12 hex identifier, without version checks.
    pub fn guid(self) -> Self {
        self.format(StringFormat::Guid)
    }

    pub fn nanoid(self) -> Self {
        self.format(StringFormat::NanoId)
    }

    pub fn cuid(self) -> Self {
        self.format(StringFormat::Cuid)
    }

    pub fn cuid2(self) -> Self {
        self.format(StringFormat::Cuid2)
    }

    pub fn ulid(self) -> Self {
        self.format(StringFormat::Ulid)
    }

    pub fn xid(self) -> Self {
        self.format(StringFormat::Xid)
    }

    pub fn ksuid(self) -> Self {
        self.format(StringFormat::Ksuid)
    }

    /// ISO 8601 datetime in UTC (`Z` suffix).
    pub fn datetime(self) -> Self {
        self.format(StringFormat::DateTime)
    }

    /// ISO 8601 datetime with configurable offsets and precision.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{DateTimeOptions, Schema, SchemaLike};
    ///
    /// let schema = Schema::string()
    ///     .datetime_with(DateTimeOptions { offset: true, ..Default::default() })
    ///     .unwrap();
    ///
    /// assert!(schema.safe_parse("2024-01-01T00:00:00+02:00").unwrap().is_success());
    /// ```
    pub fn datetime_with(self, options: DateTimeOptions) -> Result<Self, SchemaBuildError> {
        Ok(self.check(Check::datetime(options)?))
    }

    pub fn date(self) -> Self {
        self.format(StringFormat::Date)
    }

    pub fn time(self) -> Self {
        self.format(StringFormat::Time)
    }

    pub fn duration(self) -> Self {
        self.format(StringFormat::Duration)
    }

    pub fn ipv4(self) -> Self {
        self.format(StringFormat::Ipv4)
    }

    pub fn ipv6(self) -> Self {
        self.format(StringFormat::Ipv6)
    }

    pub fn cidrv4(self) -> Self {
        self.format(StringFormat::CidrV4)
    }

    pub fn cidrv6(self) -> Self {
        self.format(StringFormat::CidrV6)
    }

    pub fn base64(self) -> Self {
        self.format(StringFormat::Base64)
    }

    pub fn base64url(self) -> Self {
        self.format(StringFormat::Base64Url)
    }

    pub fn e164(self) -> Self {
        self.format(StringFormat::E164)
    }

    pub fn jwt(self) -> Self {
        self.format(StringFormat::Jwt)
    }

    pub fn emoji(self) -> Self {
        self.format(StringFormat::Emoji)
    }

    pub fn lowercase(self) -> Self {
        self.format(StringFormat::Lowercase)
    }

    pub fn uppercase(self) -> Self {
        self.format(StringFormat::Uppercase)
    }

    /// Requires a match for `pattern`.
    ///
    /// Returns an error if the pattern does not compile.
    pub fn regex(self, pattern: &str) -> Result<Self, SchemaBuildError> {
        Ok(self.check(Check::regex(pattern)?))
    }

    pub fn includes(self, needle: impl Into<String>) -> Self {
        self.check(Check::includes(needle))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.check(Check::starts_with(prefix))
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.check(Check::ends_with(suffix))
    }

    /// Trims surrounding whitespace before later checks run.
    pub fn trim(self) -> Self {
        self.check(Check::trim())
    }

    pub fn to_lower_case(self) -> Self {
        self.check(Check::to_lower_case())
    }

    pub fn to_upper_case(self) -> Self {
        self.check(Check::to_upper_case())
    }

    /// Sets a custom message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the message used when
    /// the value is not a string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, SchemaLike};
    ///
    /// let schema = Schema::string()
    ///     .min(5)
    ///     .error("username must be at least 5 characters");
    ///
    /// let error = schema.parse("hi").unwrap_err();
    /// assert!(error.to_string().contains("username must be at least 5 characters"));
    /// ```
    pub fn error(self, message: impl Into<String>) -> Self {
        let schema = self.0.with_last_message(message.into());
        Self(schema)
    }
}
