//! Directory walker: finds the Go packages below the root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::trace;

use crate::config::TaskConfig;

const GO_EXTENSION: &str = ".go";
const TEST_SUFFIX: &str = "_test.go";

/// The Go files of one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDir {
    pub dir: PathBuf,
    /// Hand-written, non-test sources, sorted by name
    pub sources: Vec<PathBuf>,
    /// Previously generated files
    pub generated: Vec<PathBuf>,
}

impl PackageDir {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.generated.is_empty()
    }
}

/// Visit every directory below `config.root` that holds Go files.
///
/// Entries starting with `_` or `.` are skipped, as are excluded directories.
pub fn walk<F>(config: &TaskConfig, mut handler: F) -> Result<()>
where
    F: FnMut(&PackageDir) -> Result<()>,
{
    let excludes = config.resolved_excludes();
    visit(&config.root, config, &excludes, &mut handler)
}

fn visit<F>(dir: &Path, config: &TaskConfig, excludes: &[PathBuf], handler: &mut F) -> Result<()>
where
    F: FnMut(&PackageDir) -> Result<()>,
{
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("failed to list {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut package = PackageDir {
        dir: dir.to_path_buf(),
        ..Default::default()
    };
    let mut subdirs = Vec::new();

    for entry in entries {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with('_') || name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", path.display()))?;

        if file_type.is_dir() {
            if excludes.iter().any(|exclude| exclude == &path) {
                trace!("excluded {}", path.display());
                continue;
            }
            subdirs.push(path);
        } else if name.ends_with(GO_EXTENSION) {
            if config.is_generated(name) {
                package.generated.push(path);
            } else if !name.ends_with(TEST_SUFFIX) {
                package.sources.push(path);
            }
        }
    }

    if !package.is_empty() {
        handler(&package)?;
    }
    for subdir in subdirs {
        visit(&subdir, config, excludes, handler)?;
    }
    Ok(())
}
