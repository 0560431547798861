//! go-lombok command line front end
//!
//! Walks a Go module, generates one `<package>.properties.go` file per
//! package that asks for accessors, and reports tag suggestions for fields
//! whose hand-written accessors could be replaced by a tag.

pub mod cli;
pub mod config;
pub mod modfile;
pub mod sync;
pub mod task;
pub mod walker;

// Re-export commonly used types for convenience
pub use cli::{build_cli, config_from_matches};
pub use config::{ReportFormat, TaskConfig};
pub use sync::{FileSync, SyncStats};
pub use task::{run_clear, run_generate, TaskSummary};
pub use walker::{walk, PackageDir};
