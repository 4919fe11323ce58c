//! Conflict resolution commands.

use concord::resolution::{ResolutionRegistry, ResolveOutcome};
use serde_json::json;

use super::CommandResult;
use crate::cli::{RecordsArgs, ResolveArgs};
use crate::output::{OutputFormat, display_bytes, print_json, print_table};

pub async fn resolve(
    registry: &ResolutionRegistry,
    args: &ResolveArgs,
    format: OutputFormat,
) -> CommandResult {
    let outcome = registry
        .attempt_resolve(
            args.base.as_deref().map(str::as_bytes),
            args.v1.as_bytes(),
            args.v2.as_bytes(),
            &args.context,
        )
        .await?;

    match (&outcome, format) {
        (ResolveOutcome::Resolved { strategy, value, .. }, OutputFormat::Human) => {
            println!("resolved by {strategy}: {}", display_bytes(value));
        }
        (ResolveOutcome::Resolved { strategy, value, record_id }, OutputFormat::Json) => {
            print_json(&json!({
                "resolved": true,
                "strategy": strategy,
                "value": display_bytes(value),
                "record_id": record_id,
            }))?;
        }
        (ResolveOutcome::CannotResolve { reason, .. }, OutputFormat::Human) => {
            println!("cannot resolve: {reason}");
            println!("take a lock before editing further");
        }
        (ResolveOutcome::CannotResolve { reason, attempts }, OutputFormat::Json) => {
            let attempts: Vec<_> = attempts
                .iter()
                .map(|a| json!({ "strategy": a.strategy, "reason": a.reason }))
                .collect();
            print_json(&json!({
                "resolved": false,
                "reason": reason,
                "attempts": attempts,
            }))?;
        }
    }
    Ok(())
}

pub fn strategies(registry: &ResolutionRegistry, format: OutputFormat) -> CommandResult {
    let infos = registry.strategies();
    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = infos
                .iter()
                .map(|i| vec![i.priority.to_string(), i.name.clone(), i.category.clone()])
                .collect();
            print_table(&["PRIORITY", "NAME", "CATEGORY"], &rows);
        }
        OutputFormat::Json => print_json(&serde_json::to_value(&infos)?)?,
    }
    Ok(())
}

pub async fn records(
    registry: &ResolutionRegistry,
    args: &RecordsArgs,
    format: OutputFormat,
) -> CommandResult {
    let records = registry.records(args.strategy.as_deref()).await?;
    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = records
                .iter()
                .map(|r| {
                    vec![
                        r.resolved_at.clone(),
                        r.strategy.clone(),
                        r.context.clone(),
                        display_bytes(&r.result),
                    ]
                })
                .collect();
            print_table(&["RESOLVED AT", "STRATEGY", "CONTEXT", "RESULT"], &rows);
        }
        OutputFormat::Json => print_json(&serde_json::to_value(&records)?)?,
    }
    Ok(())
}
