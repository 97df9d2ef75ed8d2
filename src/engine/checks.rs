//! Running a node's checks.

use crate::check::{Check, CheckKind, Refinement, RefinementCtx, Verdict};
use crate::error::{EngineError, Issue, IssueKind};
use crate::path::PathSegment;
use crate::schema::Schema;

use super::{run, ParseContext, Payload};

/// Runs `schema`'s checks, in attachment order, against the payload.
///
/// A check is skipped once an issue without `continues` exists, unless its
/// gate says otherwise. A failing `abort` check ends the pass, gates
/// included. Overwrites are visible to every later check.
pub(crate) async fn run_checks(
    schema: &Schema,
    mut payload: Payload,
    ctx: &ParseContext,
) -> Result<Payload, EngineError> {
    for check in schema.checks() {
        if !check.should_run(&payload, payload.is_aborted()) {
            continue;
        }
        let before = payload.issues.len();
        match check.evaluate(&payload.value)? {
            Verdict::Pass => {}
            Verdict::Fail(kind) => {
                let issue = ctx.own_issue(check.issue(kind, false), None, &payload.value);
                payload.issues.push(issue);
            }
            Verdict::Fatal(kind) => {
                let issue = ctx.own_issue(check.issue(kind, true), None, &payload.value);
                payload.issues.push(issue);
            }
            Verdict::Deferred => run_deferred(check, &mut payload, ctx).await?,
        }
        if check.is_abort() && payload.issues.len() > before {
            break;
        }
    }
    Ok(payload)
}

async fn run_deferred(
    check: &Check,
    payload: &mut Payload,
    ctx: &ParseContext,
) -> Result<(), EngineError> {
    match check.kind() {
        CheckKind::Overwrite(f) => {
            payload.value = f(std::mem::take(&mut payload.value));
        }
        CheckKind::Property { key, schema } => {
            let value = payload.value.get(key).cloned().unwrap_or_default();
            let result = run(schema, value, ctx).await?;
            payload.absorb(result, &PathSegment::key(key.as_str()));
        }
        CheckKind::Custom(refinement) => {
            let issues = refine(check, refinement, payload, ctx).await?;
            payload.issues.extend(issues);
        }
        _ => {}
    }
    Ok(())
}

async fn refine(
    check: &Check,
    refinement: &Refinement,
    payload: &Payload,
    ctx: &ParseContext,
) -> Result<Vec<Issue>, EngineError> {
    let failed = match refinement {
        Refinement::Predicate(predicate) => !predicate(&payload.value),
        Refinement::AsyncPredicate(predicate) => {
            if !ctx.is_async() {
                return Err(EngineError::AsyncInSync);
            }
            !predicate(&payload.value).await
        }
        Refinement::Super(f) => {
            let mut refinement_ctx = RefinementCtx::new();
            f(&payload.value, &mut refinement_ctx);
            let issues = refinement_ctx
                .into_issues()
                .into_iter()
                .map(|issue| finish_custom(check, issue, payload, ctx))
                .collect();
            return Ok(issues);
        }
    };
    if !failed {
        return Ok(Vec::new());
    }
    let issue = Issue::new(IssueKind::Custom {
        params: check.params.clone(),
    })
    .continuing(true);
    Ok(vec![finish_custom(check, issue, payload, ctx)])
}

fn finish_custom(check: &Check, issue: Issue, payload: &Payload, ctx: &ParseContext) -> Issue {
    let continues = issue.continues && !check.is_abort();
    let mut issue = ctx
        .own_issue(issue, check.message.as_deref(), &payload.value)
        .continuing(continues);
    if let Some(path) = &check.path {
        issue.prefix_path(path);
    }
    issue
}
