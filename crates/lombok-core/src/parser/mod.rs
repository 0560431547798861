// Parser module - turns Go source text into the crate's AST
use std::path::Path;

use crate::ast::File;
use crate::{LombokError, Result};

pub mod go;

pub use go::GoParser;

/// Label used in errors for source text that did not come from a file
pub const INLINE_SOURCE: &str = "<source>";

/// Trait for Go source parsers
pub trait SourceParser {
    /// Parse source code into a file AST
    fn parse(&mut self, source: &str) -> Result<File>;

    /// Parse a file, labelling any syntax error with its path
    fn parse_file(&mut self, path: &Path) -> Result<File> {
        let source = std::fs::read_to_string(path).map_err(|source| LombokError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(&source)
            .map_err(|e| e.with_file(path.display().to_string()))
    }

    /// Get parser name for debugging
    fn name(&self) -> &'static str;
}

/// Create the default Go parser
pub fn create_parser() -> Result<Box<dyn SourceParser>> {
    Ok(Box::new(GoParser::new()?))
}
