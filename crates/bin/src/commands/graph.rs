//! Version graph commands.

use concord::{ID, VersionGraph, graph::VersionNode};
use serde_json::json;

use super::CommandResult;
use crate::cli::GraphCommand;
use crate::output::{OutputFormat, display_bytes, print_json, print_table};

pub async fn run(
    graph: &VersionGraph,
    command: &GraphCommand,
    format: OutputFormat,
) -> CommandResult {
    match command {
        GraphCommand::Append {
            content_ref,
            parents,
            metadata,
        } => {
            let parents: Vec<ID> = parents.iter().map(ID::from).collect();
            let id = graph
                .append(&parents, content_ref.as_str(), metadata.as_bytes())
                .await?;
            match format {
                OutputFormat::Human => println!("{id}"),
                OutputFormat::Json => print_json(&json!({ "id": id }))?,
            }
        }
        GraphCommand::Show { id } => {
            let node = graph.get_node(&ID::from(id)).await?;
            show_node(&node, format)?;
        }
        GraphCommand::Ancestors { id } => {
            print_ids(&graph.ancestors(&ID::from(id)).await?, format)?;
        }
        GraphCommand::Descendants { id } => {
            print_ids(&graph.descendants(&ID::from(id)).await?, format)?;
        }
        GraphCommand::Common { a, b } => {
            let common = graph.common_ancestor(&ID::from(a), &ID::from(b)).await?;
            match format {
                OutputFormat::Human => match common {
                    Some(id) => println!("{id}"),
                    None => println!("(disjoint histories)"),
                },
                OutputFormat::Json => print_json(&json!({ "common_ancestor": common }))?,
            }
        }
        GraphCommand::Path { from, to } => {
            print_ids(&graph.between(&ID::from(from), &ID::from(to)).await?, format)?;
        }
        GraphCommand::Heads => {
            print_ids(&graph.heads().await?, format)?;
        }
    }
    Ok(())
}

fn print_ids(ids: &[ID], format: OutputFormat) -> CommandResult {
    match format {
        OutputFormat::Human => ids.iter().for_each(|id| println!("{id}")),
        OutputFormat::Json => print_json(&json!(ids))?,
    }
    Ok(())
}

fn show_node(node: &VersionNode, format: OutputFormat) -> CommandResult {
    match format {
        OutputFormat::Human => {
            let join = |ids: &[ID]| {
                ids.iter()
                    .map(ID::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            print_table(
                &["FIELD", "VALUE"],
                &[
                    vec!["id".into(), node.id().to_string()],
                    vec!["content".into(), node.content_ref().to_string()],
                    vec!["parents".into(), join(node.parents())],
                    vec!["children".into(), join(node.children())],
                    vec!["metadata".into(), display_bytes(node.metadata())],
                    vec!["created".into(), node.created_at().to_string()],
                ],
            );
        }
        OutputFormat::Json => print_json(&serde_json::to_value(node)?)?,
    }
    Ok(())
}
