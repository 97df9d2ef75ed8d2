//! Programmer errors.
//!
//! These are raised immediately instead of being folded into a [`ParseError`]:
//! a schema that cannot be built, or a parse call the schema cannot honour.

use thiserror::Error;

use crate::value::Primitive;

use super::parse_error::ParseError;

/// Errors raised while constructing a schema.
#[derive(Debug, Error)]
pub enum SchemaBuildError {
    #[error("duplicate discriminator value {value} for key '{discriminator}'")]
    DuplicateDiscriminator {
        discriminator: String,
        value: Primitive,
    },

    #[error("option {index} has no literal discriminator for key '{discriminator}'")]
    MissingDiscriminator { discriminator: String, index: usize },

    #[error("invalid regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("template literal part must be a primitive-valued schema, found {0}")]
    UnsupportedTemplatePart(&'static str),
}

/// Errors raised by a parse call that cannot be completed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// A check, transform, or schema produced a pending value during a synchronous parse.
    #[error("encountered a pending computation during synchronous parse; use the async parse API")]
    AsyncInSync,

    #[error("cannot compare {left} with {right} in a numeric check")]
    MixedNumericTypes {
        left: &'static str,
        right: &'static str,
    },

    /// A recursive handle was parsed before its schema finished building.
    #[error("recursive schema handle used before its schema was built")]
    DanglingLazy,
}

/// The error returned by throwing parse calls.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Invalid(#[from] ParseError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl Error {
    /// The validation failure, if this is one.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::Invalid(err) => Some(err),
            Error::Engine(_) => None,
        }
    }

    pub fn into_parse_error(self) -> Option<ParseError> {
        match self {
            Error::Invalid(err) => Some(err),
            Error::Engine(_) => None,
        }
    }
}
