//! CLI argument definitions for the Concord binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Output format flag
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    /// Aligned tables and plain lines
    Human,
    /// One JSON document per command
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Human => OutputFormat::Human,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Version history, conflict resolution, and locks over a local JSON store
#[derive(Parser, Debug)]
#[command(name = "concord")]
#[command(version)]
pub struct Cli {
    /// JSON file holding the store. Created on first write.
    #[arg(short = 'f', long, default_value = "concord.json", env = "CONCORD_DATA_FILE")]
    pub data_file: PathBuf,

    /// Log filter directives, e.g. `concord=debug`
    #[arg(long, env = "CONCORD_LOG")]
    pub log: Option<String>,

    /// Output format
    #[arg(long, default_value = "human", global = true)]
    pub format: Format,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Version graph operations
    #[command(subcommand)]
    Graph(GraphCommand),
    /// Merge two concurrent values
    Resolve(ResolveArgs),
    /// List registered strategies in dispatch order
    Strategies,
    /// List resolution audit records
    Records(RecordsArgs),
    /// Exclusive lock operations
    #[command(subcommand)]
    Lock(LockCommand),
    /// Tracked conflict operations
    #[command(subcommand)]
    Conflict(ConflictCommand),
}

#[derive(Subcommand, Debug)]
pub enum GraphCommand {
    /// Append a node and print its id
    Append {
        /// Reference to the node's content
        content_ref: String,
        /// Parent node id (repeatable)
        #[arg(short, long = "parent")]
        parents: Vec<String>,
        /// Metadata stored with the node, as text
        #[arg(short, long, default_value = "")]
        metadata: String,
    },
    /// Show one node
    Show { id: String },
    /// List ancestors, oldest first
    Ancestors { id: String },
    /// List descendants
    Descendants { id: String },
    /// Find the nearest common ancestor of two nodes
    Common { a: String, b: String },
    /// Find a path from one node to a descendant
    Path { from: String, to: String },
    /// List nodes without children
    Heads,
}

/// Arguments for the resolve command
#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    pub v1: String,
    pub v2: String,
    /// Common base both values were written against
    #[arg(short, long)]
    pub base: Option<String>,
    /// Free-form hint recorded with the resolution
    #[arg(short, long, default_value = "")]
    pub context: String,
}

/// Arguments for the records command
#[derive(clap::Args, Debug)]
pub struct RecordsArgs {
    /// Only records produced by this strategy
    #[arg(short, long)]
    pub strategy: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum LockCommand {
    /// Take the lock on a resource, or join its queue
    Checkout {
        resource: String,
        holder: String,
        /// Lock duration in seconds; indefinite when omitted
        #[arg(short, long)]
        duration: Option<u64>,
        #[arg(short, long)]
        reason: Option<String>,
    },
    /// Release a lock
    Checkin { lock_id: String },
    /// Remove a lock regardless of its holder
    Break {
        lock_id: String,
        breaker: String,
        reason: String,
    },
    /// Extend a lock by a number of seconds
    Renew { lock_id: String, seconds: u64 },
    /// List live locks
    List {
        #[arg(short, long)]
        resource: Option<String>,
    },
    /// List the wait queue of a resource
    Queue { resource: String },
}

#[derive(Subcommand, Debug)]
pub enum ConflictCommand {
    /// Record a conflict if both values diverged from the base
    Detect {
        v1: String,
        v2: String,
        #[arg(short, long)]
        base: Option<String>,
        #[arg(short, long, default_value = "")]
        context: String,
    },
    /// Try the registered strategies on a pending conflict
    Resolve { conflict_id: String },
    /// Settle a pending conflict with a chosen value
    Choose { conflict_id: String, value: String },
    /// List conflicts still pending
    Pending,
}
