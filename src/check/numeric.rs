//! Numeric comparisons and integer formats.

use crate::error::{EngineError, IssueKind, Numeric, Origin};
use crate::value::Value;

/// Largest integer a double represents exactly.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Representation formats for numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    SafeInt,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl NumberFormat {
    pub fn name(&self) -> &'static str {
        match self {
            NumberFormat::SafeInt => "safeint",
            NumberFormat::Int32 => "int32",
            NumberFormat::Uint32 => "uint32",
            NumberFormat::Float32 => "float32",
            NumberFormat::Float64 => "float64",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            NumberFormat::SafeInt | NumberFormat::Int32 | NumberFormat::Uint32
        )
    }

    /// Inclusive range of the format.
    pub fn range(&self) -> (f64, f64) {
        match self {
            NumberFormat::SafeInt => (-MAX_SAFE_INTEGER, MAX_SAFE_INTEGER),
            NumberFormat::Int32 => (i32::MIN as f64, i32::MAX as f64),
            NumberFormat::Uint32 => (0.0, u32::MAX as f64),
            NumberFormat::Float32 => (f32::MIN as f64, f32::MAX as f64),
            NumberFormat::Float64 => (f64::MIN, f64::MAX),
        }
    }
}

/// Representation formats for big integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigIntFormat {
    Int64,
    Uint64,
}

impl BigIntFormat {
    pub fn name(&self) -> &'static str {
        match self {
            BigIntFormat::Int64 => "int64",
            BigIntFormat::Uint64 => "uint64",
        }
    }

    pub fn range(&self) -> (i128, i128) {
        match self {
            BigIntFormat::Int64 => (i64::MIN as i128, i64::MAX as i128),
            BigIntFormat::Uint64 => (0, u64::MAX as i128),
        }
    }
}

/// A numeric view of a value, paired with the origin used in issues.
pub(crate) fn numeric_of(value: &Value) -> Option<(Numeric, Origin)> {
    match value {
        Value::Number(n) => Some((Numeric::Number(*n), Origin::Number)),
        Value::BigInt(n) => Some((Numeric::BigInt(*n), Origin::BigInt)),
        Value::Date(ms) => Some((Numeric::Date(*ms), Origin::Date)),
        _ => None,
    }
}

fn kind_name(n: &Numeric) -> &'static str {
    match n {
        Numeric::Number(_) => "number",
        Numeric::BigInt(_) => "bigint",
        Numeric::Date(_) => "date",
    }
}

/// Orders `value` against `bound`; both must be the same numeric kind.
pub(crate) fn compare(
    value: &Numeric,
    bound: &Numeric,
) -> Result<Option<std::cmp::Ordering>, EngineError> {
    match (value, bound) {
        (Numeric::Number(a), Numeric::Number(b)) | (Numeric::Date(a), Numeric::Date(b)) => {
            Ok(a.partial_cmp(b))
        }
        (Numeric::BigInt(a), Numeric::BigInt(b)) => Ok(Some(a.cmp(b))),
        _ => Err(EngineError::MixedNumericTypes {
            left: kind_name(value),
            right: kind_name(bound),
        }),
    }
}

fn decimal_places(n: f64) -> u32 {
    let rendered = format!("{}", n);
    rendered
        .split_once('.')
        .map(|(_, frac)| frac.len() as u32)
        .unwrap_or(0)
}

/// Remainder of `value / step` computed on scaled integers, so that
/// `0.3` is a multiple of `0.1`.
pub fn float_safe_remainder(value: f64, step: f64) -> f64 {
    let places = decimal_places(value).max(decimal_places(step)).min(15);
    let scale = 10f64.powi(places as i32);
    let scaled_value = (value * scale).round();
    let scaled_step = (step * scale).round();
    (scaled_value % scaled_step) / scale
}

/// Whether `value` is a multiple of `divisor`.
pub(crate) fn is_multiple(value: &Numeric, divisor: &Numeric) -> Result<bool, EngineError> {
    match (value, divisor) {
        (Numeric::Number(v), Numeric::Number(d)) => {
            Ok(*d != 0.0 && float_safe_remainder(*v, *d) == 0.0)
        }
        (Numeric::BigInt(v), Numeric::BigInt(d)) => Ok(*d != 0 && v % d == 0),
        _ => Err(EngineError::MixedNumericTypes {
            left: kind_name(value),
            right: kind_name(divisor),
        }),
    }
}

/// Checks a number against a representation format.
///
/// Returns the issue and whether it is fatal for the node.
pub(crate) fn check_number_format(n: f64, format: NumberFormat) -> Option<(IssueKind, bool)> {
    if format.is_integer() && n.fract() != 0.0 {
        return Some((
            IssueKind::InvalidType {
                expected: "int",
                received: "number",
            },
            true,
        ));
    }
    let (min, max) = format.range();
    if n < min {
        return Some((
            IssueKind::TooSmall {
                origin: Origin::Number,
                minimum: Numeric::Number(min),
                inclusive: true,
                exact: false,
            },
            false,
        ));
    }
    if n > max {
        return Some((
            IssueKind::TooBig {
                origin: Origin::Number,
                maximum: Numeric::Number(max),
                inclusive: true,
                exact: false,
            },
            false,
        ));
    }
    None
}

pub(crate) fn check_bigint_format(n: i128, format: BigIntFormat) -> Option<IssueKind> {
    let (min, max) = format.range();
    if n < min {
        Some(IssueKind::TooSmall {
            origin: Origin::BigInt,
            minimum: Numeric::BigInt(min),
            inclusive: true,
            exact: false,
        })
    } else if n > max {
        Some(IssueKind::TooBig {
            origin: Origin::BigInt,
            maximum: Numeric::BigInt(max),
            inclusive: true,
            exact: false,
        })
    } else {
        None
    }
}

impl Numeric {
    /// Lossy projection used to order bounds in the bag.
    pub fn as_f64(&self) -> f64 {
        match self {
            Numeric::Number(n) | Numeric::Date(n) => *n,
            Numeric::BigInt(n) => *n as f64,
        }
    }
}
