//! Tracked conflict commands.

use concord::{
    ID,
    resolution::{ConflictOutcome, Detection, ManualOutcome, ResolutionRegistry},
};
use serde_json::json;

use super::CommandResult;
use crate::cli::ConflictCommand;
use crate::output::{OutputFormat, display_bytes, print_json, print_table};

pub async fn run(
    registry: &ResolutionRegistry,
    command: &ConflictCommand,
    format: OutputFormat,
) -> CommandResult {
    match command {
        ConflictCommand::Detect {
            v1,
            v2,
            base,
            context,
        } => {
            let detection = registry
                .detect(
                    base.as_deref().map(str::as_bytes),
                    v1.as_bytes(),
                    v2.as_bytes(),
                    context,
                )
                .await?;
            match (detection, format) {
                (Detection::NoConflict, OutputFormat::Human) => println!("no conflict"),
                (Detection::NoConflict, OutputFormat::Json) => {
                    print_json(&json!({ "conflict": false }))?
                }
                (Detection::Detected { conflict_id }, OutputFormat::Human) => {
                    println!("{conflict_id}")
                }
                (Detection::Detected { conflict_id }, OutputFormat::Json) => {
                    print_json(&json!({ "conflict": true, "conflict_id": conflict_id }))?
                }
            }
        }
        ConflictCommand::Resolve { conflict_id } => {
            let outcome = registry.resolve_conflict(&ID::from(conflict_id)).await?;
            print_outcome(&outcome, format)?;
        }
        ConflictCommand::Choose { conflict_id, value } => {
            let outcome = registry
                .manual_resolve(&ID::from(conflict_id), value.as_bytes())
                .await?;
            match (outcome, format) {
                (ManualOutcome::Resolved { value }, OutputFormat::Human) => {
                    println!("resolved manually: {}", display_bytes(&value))
                }
                (ManualOutcome::Resolved { value }, OutputFormat::Json) => print_json(&json!({
                    "resolved": true,
                    "value": display_bytes(&value),
                }))?,
                (ManualOutcome::NotPending { reason }, OutputFormat::Human) => {
                    println!("not pending: {reason}")
                }
                (ManualOutcome::NotPending { reason }, OutputFormat::Json) => {
                    print_json(&json!({ "resolved": false, "reason": reason }))?
                }
            }
        }
        ConflictCommand::Pending => {
            let pending = registry.pending_conflicts().await?;
            match format {
                OutputFormat::Human => {
                    let rows: Vec<Vec<String>> = pending
                        .iter()
                        .map(|c| {
                            vec![
                                c.id.to_string(),
                                c.context.clone(),
                                c.detected_at.clone(),
                                display_bytes(&c.v1),
                                display_bytes(&c.v2),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "CONTEXT", "DETECTED AT", "V1", "V2"], &rows);
                }
                OutputFormat::Json => print_json(&serde_json::to_value(&pending)?)?,
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: &ConflictOutcome, format: OutputFormat) -> CommandResult {
    match (outcome, format) {
        (ConflictOutcome::Resolved { strategy, value, .. }, OutputFormat::Human) => {
            println!("resolved by {strategy}: {}", display_bytes(value));
        }
        (ConflictOutcome::Resolved { strategy, value, record_id }, OutputFormat::Json) => {
            print_json(&json!({
                "status": "resolved",
                "strategy": strategy,
                "value": display_bytes(value),
                "record_id": record_id,
            }))?;
        }
        (ConflictOutcome::RequiresHuman { conflict_id, reason, options }, OutputFormat::Human) => {
            println!("cannot resolve: {reason}");
            for option in options {
                println!("  option: {}", display_bytes(option));
            }
            println!("choose one with `concord conflict choose {conflict_id} <value>`");
        }
        (ConflictOutcome::RequiresHuman { conflict_id, reason, options }, OutputFormat::Json) => {
            let options: Vec<String> = options.iter().map(|o| display_bytes(o)).collect();
            print_json(&json!({
                "status": "requires_human",
                "conflict_id": conflict_id,
                "reason": reason,
                "options": options,
            }))?;
        }
        (ConflictOutcome::NotPending { reason }, OutputFormat::Human) => {
            println!("not pending: {reason}");
        }
        (ConflictOutcome::NotPending { reason }, OutputFormat::Json) => {
            print_json(&json!({ "status": "not_pending", "reason": reason }))?;
        }
    }
    Ok(())
}
