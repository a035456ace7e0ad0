//! Command handlers for the Safety Copilot CLI.

pub mod ingest;
pub mod route;

// Re-export command types for convenience
pub use ingest::IngestCommand;
pub use route::RouteCommand;
