//! Lock commands.

use std::time::Duration;

use concord::{
    ID, LockManager,
    lock::{CheckOut, Lock},
};
use serde_json::json;

use super::CommandResult;
use crate::cli::LockCommand;
use crate::output::{OutputFormat, print_json, print_table};

pub async fn run(
    locks: &LockManager,
    command: &LockCommand,
    format: OutputFormat,
) -> CommandResult {
    match command {
        LockCommand::Checkout {
            resource,
            holder,
            duration,
            reason,
        } => {
            let outcome = locks
                .check_out(
                    resource,
                    holder,
                    duration.map(Duration::from_secs),
                    reason.clone(),
                )
                .await?;
            print_check_out(&outcome, format)?;
        }
        LockCommand::Checkin { lock_id } => {
            locks.check_in(&ID::from(lock_id)).await?;
            match format {
                OutputFormat::Human => println!("released {lock_id}"),
                OutputFormat::Json => print_json(&json!({ "released": lock_id }))?,
            }
        }
        LockCommand::Break {
            lock_id,
            breaker,
            reason,
        } => {
            let previous = locks.break_lock(&ID::from(lock_id), breaker, reason).await?;
            match format {
                OutputFormat::Human => println!("broke {lock_id} held by {previous}"),
                OutputFormat::Json => {
                    print_json(&json!({ "broken": lock_id, "previous_holder": previous }))?
                }
            }
        }
        LockCommand::Renew { lock_id, seconds } => {
            let lock = locks
                .renew(&ID::from(lock_id), Duration::from_secs(*seconds))
                .await?;
            print_locks(&[lock], format)?;
        }
        LockCommand::List { resource } => {
            print_locks(&locks.query_locks(resource.as_deref()).await?, format)?;
        }
        LockCommand::Queue { resource } => {
            let queue = locks.query_queue(resource).await?;
            match format {
                OutputFormat::Human => {
                    let rows: Vec<Vec<String>> = queue
                        .iter()
                        .enumerate()
                        .map(|(i, e)| {
                            vec![
                                (i + 1).to_string(),
                                e.requester.clone(),
                                e.requested_at.to_string(),
                            ]
                        })
                        .collect();
                    print_table(&["POSITION", "REQUESTER", "REQUESTED AT"], &rows);
                }
                OutputFormat::Json => print_json(&serde_json::to_value(&queue)?)?,
            }
        }
    }
    Ok(())
}

fn print_check_out(outcome: &CheckOut, format: OutputFormat) -> CommandResult {
    match (outcome, format) {
        (CheckOut::Granted(lock), OutputFormat::Human) => println!("granted {}", lock.id),
        (CheckOut::Granted(lock), OutputFormat::Json) => {
            print_json(&json!({ "status": "granted", "lock": lock }))?
        }
        (CheckOut::Queued { position }, OutputFormat::Human) => {
            println!("queued at position {position}")
        }
        (CheckOut::Queued { position }, OutputFormat::Json) => {
            print_json(&json!({ "status": "queued", "position": position }))?
        }
        (CheckOut::AlreadyLocked { holder, expires }, OutputFormat::Human) => match expires {
            Some(expires) => println!("already queued; held by {holder} until {expires}"),
            None => println!("already queued; held by {holder} indefinitely"),
        },
        (CheckOut::AlreadyLocked { holder, expires }, OutputFormat::Json) => {
            print_json(&json!({
                "status": "already_locked",
                "holder": holder,
                "expires": expires,
            }))?
        }
    }
    Ok(())
}

fn print_locks(locks: &[Lock], format: OutputFormat) -> CommandResult {
    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = locks
                .iter()
                .map(|l| {
                    vec![
                        l.id.to_string(),
                        l.resource.clone(),
                        l.holder.clone(),
                        l.expires.map_or_else(|| "never".to_string(), |e| e.to_string()),
                        l.reason.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(&["ID", "RESOURCE", "HOLDER", "EXPIRES", "REASON"], &rows);
        }
        OutputFormat::Json => print_json(&serde_json::to_value(locks)?)?,
    }
    Ok(())
}
