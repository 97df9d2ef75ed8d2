//! Promise and function schemas.

use crate::engine::{self, ParseOptions};
use crate::error::Error;
use crate::value::{FunctionValue, Value};

use super::node::NodeKind;
use super::traits::{schema_builder, SchemaLike};
use super::Schema;

impl Schema {
    /// A value that settles to something `inner` accepts; requires an async
    /// parse. Plain values are validated directly.
    pub fn promise(inner: impl SchemaLike) -> Schema {
        Schema::from_kind(NodeKind::Promise(inner.into_schema()))
    }

    pub fn function() -> FunctionSchema {
        FunctionSchema(Schema::from_kind(NodeKind::Function {
            input: None,
            output: None,
        }))
    }
}

/// A schema for callables.
///
/// Parsing a function yields a wrapper that validates the arguments (as an
/// array) against the input schema before each call, and the result against
/// the output schema after it.
///
/// # Example
///
/// ```rust
/// use assay::{Schema, SchemaLike, Value};
///
/// let double = Schema::function()
///     .input(Schema::tuple([Schema::number()]))
///     .output(Schema::number())
///     .implement(|args| Ok(Value::from(args[0].as_f64().unwrap_or(0.0) * 2.0)));
///
/// assert_eq!(double.call(vec![Value::from(2)]).unwrap(), Value::from(4));
/// assert!(double.call(vec![Value::from("2")]).is_err());
/// ```
#[derive(Clone)]
pub struct FunctionSchema(Schema);

schema_builder!(FunctionSchema);

impl FunctionSchema {
    fn parts(&self) -> (Option<Schema>, Option<Schema>) {
        match self.0.def() {
            NodeKind::Function { input, output } => (input.clone(), output.clone()),
            _ => unreachable!("FunctionSchema always wraps a function node"),
        }
    }

    /// Validates the argument list, given as an array.
    pub fn input(self, args: impl SchemaLike) -> Self {
        let (_, output) = self.parts();
        Self(self.0.with_kind(NodeKind::Function {
            input: Some(args.into_schema()),
            output,
        }))
    }

    /// Validates the return value.
    pub fn output(self, returns: impl SchemaLike) -> Self {
        let (input, _) = self.parts();
        Self(self.0.with_kind(NodeKind::Function {
            input,
            output: Some(returns.into_schema()),
        }))
    }

    /// Wraps `f` so every call is validated.
    pub fn implement<F>(&self, f: F) -> FunctionValue
    where
        F: Fn(Vec<Value>) -> Result<Value, Error> + Send + Sync + 'static,
    {
        let (input, output) = self.parts();
        wrap_function(input, output, FunctionValue::new(f), ParseOptions::default())
    }
}

pub(crate) fn wrap_function(
    input: Option<Schema>,
    output: Option<Schema>,
    f: FunctionValue,
    options: ParseOptions,
) -> FunctionValue {
    FunctionValue::new(move |args: Vec<Value>| {
        let args = match &input {
            Some(schema) => {
                match engine::parse_sync(schema, Value::Array(args), &options)?.into_result()? {
                    Value::Array(args) => args,
                    other => vec![other],
                }
            }
            None => args,
        };
        let returned = f.call(args)?;
        match &output {
            Some(schema) => Ok(engine::parse_sync(schema, returned, &options)?.into_result()?),
            None => Ok(returned),
        }
    })
}
