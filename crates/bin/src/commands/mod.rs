pub mod conflict;
pub mod graph;
pub mod lock;
pub mod resolve;

/// Result type for command handlers.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;
