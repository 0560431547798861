//! # Lombok Core
//!
//! Accessor synthesis for Go structs driven by struct tags:
//! - Go syntax subset and gofmt-style source generation
//! - tree-sitter based Go parser
//! - Property model built by scanning a package's source files
//! - Tag interpretation and tag suggestions from existing accessors
//! - Accessor synthesizer producing the generated file text
//!
//! A field asks for accessors through its tag:
//!
//! ```go
//! type User struct {
//!     name  string `prop:""`        // Name() / SetName()
//!     email string `get:"@"`        // GetEmail()
//!     tags  []string `get:"&"`      // Tags() *[]string
//! }
//! ```
//!
//! The crate never writes files; callers decide what to do with the text
//! returned by [`synthesize`].

#![warn(clippy::all)]

pub mod ast;
pub mod diagnostics;
pub mod model;
pub mod naming;
pub mod parser;
pub mod scanner;
pub mod synth;
pub mod tag;

use std::path::PathBuf;

// Re-export commonly used types
pub use ast::ToSource;
pub use diagnostics::{PackageReport, Suggestion, TypeReport};
pub use model::{Package, Property, Type};
pub use parser::{create_parser, GoParser, SourceParser};
pub use scanner::{scan_package, scan_source, Scanner};
pub use synth::{generate_source, synthesize, DEFAULT_RECEIVER};
pub use tag::{suggest_tag, TagDirectives};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for lombok components
pub fn init_tracing() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["lombok_core=info", "lombok_cli=info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Error types for scanning and generation
#[derive(thiserror::Error, Debug)]
pub enum LombokError {
    /// Malformed Go source
    #[error("{file}:{line}:{column}: syntax error: {message}")]
    Syntax {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// Source file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The Go grammar could not be loaded into tree-sitter
    #[error("failed to load Go grammar: {0}")]
    Language(String),

    /// tree-sitter returned no tree at all
    #[error("parser gave up on {file}")]
    ParseAborted { file: String },
}

impl LombokError {
    /// Attach the originating file name to a parse error
    pub fn with_file(self, name: String) -> Self {
        match self {
            LombokError::Syntax {
                line,
                column,
                message,
                ..
            } => LombokError::Syntax {
                file: name,
                line,
                column,
                message,
            },
            LombokError::ParseAborted { .. } => LombokError::ParseAborted { file: name },
            other => other,
        }
    }
}

/// Result type for lombok core operations
pub type Result<T> = std::result::Result<T, LombokError>;
