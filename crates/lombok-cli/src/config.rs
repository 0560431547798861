use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

/// Suffix of every generated file
pub const GENERATED_SUFFIX: &str = ".properties.go";

/// How tag suggestions are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(anyhow::anyhow!("unknown report format: {other}")),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Settings for one generate or clear run
#[derive(Debug, Clone)]
pub struct TaskConfig {
    /// Directory to walk, usually the module root
    pub root: PathBuf,
    /// Directories to skip, relative to the root or absolute
    pub excludes: Vec<PathBuf>,
    /// Suffix of generated files
    pub output_suffix: String,
    pub format: ReportFormat,
    /// Report what would change without touching any file
    pub dry_run: bool,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            root: ".".into(),
            excludes: Vec::new(),
            output_suffix: GENERATED_SUFFIX.to_string(),
            format: ReportFormat::default(),
            dry_run: false,
        }
    }
}

impl TaskConfig {
    /// File name of the generated file for a package
    pub fn output_file_name(&self, package_name: &str) -> String {
        format!("{package_name}{}", self.output_suffix)
    }

    pub fn is_generated(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.output_suffix)
    }

    /// Exclusions resolved against the root
    pub fn resolved_excludes(&self) -> Vec<PathBuf> {
        self.excludes
            .iter()
            .map(|exclude| {
                if exclude.is_absolute() {
                    exclude.clone()
                } else {
                    self.root.join(exclude)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TaskConfig::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.output_file_name("shop"), "shop.properties.go");
        assert!(config.is_generated("shop.properties.go"));
        assert!(!config.is_generated("shop.go"));
        assert_eq!(config.format, ReportFormat::Text);
    }

    #[test]
    fn test_report_format_parse() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("text".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert!("yaml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_resolved_excludes() {
        let config = TaskConfig {
            root: "/work/mod".into(),
            excludes: vec!["vendor".into(), "/tmp/gen".into()],
            ..Default::default()
        };
        assert_eq!(
            config.resolved_excludes(),
            vec![PathBuf::from("/work/mod/vendor"), PathBuf::from("/tmp/gen")]
        );
    }
}
