pub mod config;
pub mod document;
pub mod error;
pub mod formatter;
pub mod lsp;
pub mod text;

// Re-export config types for convenience
pub use config::{FormatterSettings, WorkspaceSettings};

// Re-export the main server implementation
pub use lsp::Seisho;
