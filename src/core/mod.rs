pub mod announce;
pub mod checks;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod options;
pub mod paths;
pub mod pipeline;
pub mod recording;
pub mod settings;
pub mod ssh;
pub mod steps;
pub mod tasks;

// Re-export common types for convenience
pub use context::Deployment;
pub use error::{Error, ErrorCode, Result};
pub use settings::{Settings, SettingsDecl};
