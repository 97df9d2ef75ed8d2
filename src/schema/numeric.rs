//! Number, big integer, and date schemas.
//!
//! All three share the numeric comparison checks; bounds must use the same
//! numeric kind as the schema (a bigint bound on a number schema is a
//! programmer error reported by the engine).

use crate::check::{BigIntFormat, Check, NumberFormat};
use crate::error::Numeric;

use super::node::NodeKind;
use super::traits::{schema_builder, SchemaLike};
use super::Schema;

/// A schema for validating numbers.
///
/// `NaN` is rejected as `invalid_type` and infinities as `not_finite`.
///
/// # Example
///
/// ```rust
/// use assay::{Schema, SchemaLike};
///
/// let schema = Schema::number().int().gte(0.0).lt(150.0);
///
/// assert!(schema.safe_parse(42).unwrap().is_success());
/// assert!(schema.safe_parse(-5).unwrap().is_failure());
/// assert!(schema.safe_parse(1.5).unwrap().is_failure());
/// ```
#[derive(Clone)]
pub struct NumberSchema(Schema);

schema_builder!(NumberSchema);

impl NumberSchema {
    pub(crate) fn new(coerce: bool) -> Self {
        Self(Schema::from_kind(NodeKind::Number { coerce }))
    }

    pub fn gt(self, value: f64) -> Self {
        self.check(Check::gt(value))
    }

    pub fn gte(self, value: f64) -> Self {
        self.check(Check::gte(value))
    }

    /// Alias of [`gte`](Self::gte).
    pub fn min(self, value: f64) -> Self {
        self.gte(value)
    }

    pub fn lt(self, value: f64) -> Self {
        self.check(Check::lt(value))
    }

    pub fn lte(self, value: f64) -> Self {
        self.check(Check::lte(value))
    }

    /// Alias of [`lte`](Self::lte).
    pub fn max(self, value: f64) -> Self {
        self.lte(value)
    }

    pub fn positive(self) -> Self {
        self.gt(0.0)
    }

    pub fn nonnegative(self) -> Self {
        self.gte(0.0)
    }

    pub fn negative(self) -> Self {
        self.lt(0.0)
    }

    pub fn nonpositive(self) -> Self {
        self.lte(0.0)
    }

    pub fn multiple_of(self, step: f64) -> Self {
        self.check(Check::multiple_of(step))
    }

    /// Alias of [`multiple_of`](Self::multiple_of).
    pub fn step(self, step: f64) -> Self {
        self.multiple_of(step)
    }

    /// Restricts to safe integers.
    pub fn int(self) -> Self {
        self.format(NumberFormat::SafeInt)
    }

    pub fn format(self, format: NumberFormat) -> Self {
        self.check(Check::number_format(format))
    }

    /// Sets a custom message for the most recent constraint, or for the type
    /// check if there are none.
    pub fn error(self, message: impl Into<String>) -> Self {
        Self(self.0.with_last_message(message.into()))
    }
}

/// A schema for validating big integers.
#[derive(Clone)]
pub struct BigIntSchema(Schema);

schema_builder!(BigIntSchema);

impl BigIntSchema {
    pub(crate) fn new(coerce: bool) -> Self {
        Self(Schema::from_kind(NodeKind::BigInt { coerce }))
    }

    pub fn gt(self, value: i128) -> Self {
        self.check(Check::gt(value))
    }

    pub fn gte(self, value: i128) -> Self {
        self.check(Check::gte(value))
    }

    pub fn min(self, value: i128) -> Self {
        self.gte(value)
    }

    pub fn lt(self, value: i128) -> Self {
        self.check(Check::lt(value))
    }

    pub fn lte(self, value: i128) -> Self {
        self.check(Check::lte(value))
    }

    pub fn max(self, value: i128) -> Self {
        self.lte(value)
    }

    pub fn positive(self) -> Self {
        self.gt(0)
    }

    pub fn nonnegative(self) -> Self {
        self.gte(0)
    }

    pub fn negative(self) -> Self {
        self.lt(0)
    }

    pub fn nonpositive(self) -> Self {
        self.lte(0)
    }

    pub fn multiple_of(self, step: i128) -> Self {
        self.check(Check::multiple_of(step))
    }

    pub fn format(self, format: BigIntFormat) -> Self {
        self.check(Check::bigint_format(format))
    }

    pub fn error(self, message: impl Into<String>) -> Self {
        Self(self.0.with_last_message(message.into()))
    }
}

/// A schema for validating dates; bounds are epoch milliseconds.
///
/// Invalid dates (NaN time) are rejected as `invalid_type`.
#[derive(Clone)]
pub struct DateSchema(Schema);

schema_builder!(DateSchema);

impl DateSchema {
    pub(crate) fn new(coerce: bool) -> Self {
        Self(Schema::from_kind(NodeKind::Date { coerce }))
    }

    /// Earliest accepted date, inclusive.
    pub fn min(self, millis: f64) -> Self {
        self.check(Check::gte(Numeric::Date(millis)))
    }

    /// Latest accepted date, inclusive.
    pub fn max(self, millis: f64) -> Self {
        self.check(Check::lte(Numeric::Date(millis)))
    }

    pub fn error(self, message: impl Into<String>) -> Self {
        Self(self.0.with_last_message(message.into()))
    }
}
