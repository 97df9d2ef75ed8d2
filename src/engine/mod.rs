//! The parse engine.
//!
//! One traversal walks a schema against a value and threads a [`Payload`]
//! (the current value and the issues found so far) through every node.
//! Children are always attempted, even after a sibling failed, so a single
//! call reports every problem in the input.
//!
//! The traversal is written once, as an async function. A synchronous parse
//! polls it exactly once: nodes that would have to wait (async refinements,
//! async transforms, promises) report [`EngineError::AsyncInSync`] instead.

mod checks;
mod coerce;
mod context;
mod merge;
mod run;

use futures::future::{BoxFuture, FutureExt};
use stillwater::Validation;
use tracing::{debug, trace};

use crate::error::{EngineError, Issue, ParseError};
use crate::path::PathSegment;
use crate::schema::{SafeParseResult, Schema};
use crate::value::Value;

pub use context::{ParseMode, ParseOptions};

pub(crate) use context::ParseContext;
pub(crate) use run::run;

/// The value being validated together with the issues found so far.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub value: Value,
    pub issues: Vec<Issue>,
}

impl Payload {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            issues: Vec::new(),
        }
    }

    pub(crate) fn with_issue(value: Value, issue: Issue) -> Self {
        Self {
            value,
            issues: vec![issue],
        }
    }

    /// No issues were found.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Some issue stops later checks on the node.
    pub fn is_aborted(&self) -> bool {
        self.issues.iter().any(|issue| !issue.continues)
    }

    /// Moves `child`'s issues into this payload under `segment`, returning
    /// the child's value.
    pub(crate) fn absorb(&mut self, child: Payload, segment: &PathSegment) -> Value {
        for mut issue in child.issues {
            issue.prefix(segment);
            self.issues.push(issue);
        }
        child.value
    }
}

/// Runs a synchronous parse.
pub(crate) fn parse_sync(schema: &Schema, input: Value, options: &ParseOptions) -> SafeParseResult {
    let ctx = ParseContext::new(options.clone(), ParseMode::Sync);
    match run(schema, input, &ctx).now_or_never() {
        Some(payload) => Ok(finish(payload?, &ctx)),
        None => {
            debug!(kind = %schema.kind(), "synchronous parse hit a pending computation");
            Err(EngineError::AsyncInSync)
        }
    }
}

/// Runs an asynchronous parse.
pub(crate) fn parse_async(
    schema: Schema,
    input: Value,
    options: ParseOptions,
) -> BoxFuture<'static, SafeParseResult> {
    async move {
        let ctx = ParseContext::new(options, ParseMode::Async);
        let payload = run(&schema, input, &ctx).await?;
        Ok(finish(payload, &ctx))
    }
    .boxed()
}

fn finish(payload: Payload, ctx: &ParseContext) -> Validation<Value, ParseError> {
    trace!(mode = ?ctx.mode(), issues = payload.issues.len(), "parse finished");
    match ParseError::from_vec(payload.issues) {
        None => Validation::Success(payload.value),
        Some(error) => Validation::Failure(error.with_error_map(ctx.options().error_map.clone())),
    }
}
