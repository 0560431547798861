/*!
# File Sync

Persists generated text next to the sources it was generated from, and removes
generated files that no longer have a reason to exist.
*/

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TaskConfig;
use crate::walker::PackageDir;

/// Outcome counts of syncing one or more directories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

impl SyncStats {
    pub fn merge(&mut self, other: SyncStats) {
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.deleted += other.deleted;
    }
}

pub struct FileSync<'c> {
    config: &'c TaskConfig,
}

impl<'c> FileSync<'c> {
    pub fn new(config: &'c TaskConfig) -> Self {
        Self { config }
    }

    /// Bring the generated file of `package` in line with `text`.
    ///
    /// With text, `<package_name>.properties.go` is written when its content
    /// differs and every other generated file in the directory is removed.
    /// Without text, all generated files in the directory are removed.
    pub fn sync(
        &self,
        package: &PackageDir,
        package_name: &str,
        text: Option<&str>,
    ) -> Result<SyncStats> {
        let mut stats = SyncStats::default();
        let target = package
            .dir
            .join(self.config.output_file_name(package_name));

        if let Some(text) = text {
            if read_existing(&target)?.as_deref() == Some(text) {
                debug!("unchanged {}", target.display());
                stats.unchanged += 1;
            } else {
                info!("updated {}", target.display());
                if !self.config.dry_run {
                    fs::write(&target, text)
                        .with_context(|| format!("failed to write {}", target.display()))?;
                }
                stats.updated += 1;
            }
        }

        for stale in &package.generated {
            if text.is_some() && stale == &target {
                continue;
            }
            self.remove(stale)?;
            stats.deleted += 1;
        }

        Ok(stats)
    }

    /// Remove every generated file of `package`
    pub fn clear(&self, package: &PackageDir) -> Result<SyncStats> {
        let mut stats = SyncStats::default();
        for generated in &package.generated {
            self.remove(generated)?;
            stats.deleted += 1;
        }
        Ok(stats)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        info!("removed {}", path.display());
        if self.config.dry_run {
            return Ok(());
        }
        fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))
    }
}

fn read_existing(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}
