//! Generate and clear runs over a directory tree.

use anyhow::{Context, Result};
use lombok_core::{scan_package, synthesize, PackageReport};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ReportFormat, TaskConfig};
use crate::modfile::{package_path, read_module_path};
use crate::sync::{FileSync, SyncStats};
use crate::walker::walk;

/// Result of a generate run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub stats: SyncStats,
    /// Packages with tag suggestions
    pub reports: Vec<PackageReport>,
}

impl TaskSummary {
    /// Render the tag suggestions in the requested format
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.reports.iter().map(ToString::to_string).collect()),
            ReportFormat::Json => {
                serde_json::to_string_pretty(&self.reports).context("failed to encode report")
            }
        }
    }
}

/// Scan every package below the root, then write, refresh or remove its
/// generated file.
pub fn run_generate(config: &TaskConfig) -> Result<TaskSummary> {
    let base = read_module_path(&config.root)?;
    debug!("module path: {base:?}");

    let sync = FileSync::new(config);
    let mut summary = TaskSummary::default();

    walk(config, |package| {
        let path = package_path(&base, &config.root, &package.dir);
        let pkg = scan_package(&path, &package.sources)
            .with_context(|| format!("failed to scan {}", package.dir.display()))?;

        let text = synthesize(&pkg);
        let stats = sync.sync(package, pkg.name(), text.as_deref())?;
        summary.stats.merge(stats);

        let report = PackageReport::build(&pkg);
        if !report.is_empty() {
            summary.reports.push(report);
        }
        Ok(())
    })?;

    let stats = &summary.stats;
    info!(
        "generate finished: {} updated, {} unchanged, {} deleted",
        stats.updated, stats.unchanged, stats.deleted
    );
    Ok(summary)
}

/// Remove every generated file below the root
pub fn run_clear(config: &TaskConfig) -> Result<SyncStats> {
    let sync = FileSync::new(config);
    let mut stats = SyncStats::default();

    walk(config, |package| {
        stats.merge(sync.clear(package)?);
        Ok(())
    })?;

    info!("clear finished: {} deleted", stats.deleted);
    Ok(stats)
}
