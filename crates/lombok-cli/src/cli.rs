use std::path::PathBuf;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::config::{ReportFormat, TaskConfig};

fn dir_arg() -> Arg {
    Arg::new("dir")
        .long("dir")
        .short('d')
        .value_name("DIR")
        .help("Root directory to process")
        .default_value(".")
}

/// Command line definition of `go-lombok`
pub fn build_cli() -> Command {
    Command::new("go-lombok")
        .version(lombok_core::VERSION)
        .about("Generate getters and setters for Go struct fields from their tags")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("generate")
                .visible_aliases(["gen", "g"])
                .about("Generate <package>.properties.go files")
                .arg(dir_arg())
                .arg(
                    Arg::new("exclude")
                        .long("exclude")
                        .short('e')
                        .value_name("PATH")
                        .help("Directory to skip, relative to the root or absolute")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_name("FORMAT")
                        .help("Format of the tag suggestion report")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Report changes without writing or deleting files")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("clear")
                .about("Remove all generated files")
                .arg(dir_arg()),
        )
}

/// Build the run settings from a subcommand's arguments
pub fn config_from_matches(matches: &ArgMatches) -> Result<TaskConfig> {
    let mut config = TaskConfig::default();

    if let Some(dir) = matches.get_one::<String>("dir") {
        config.root = PathBuf::from(dir);
    }
    if let Ok(Some(excludes)) = matches.try_get_many::<String>("exclude") {
        config.excludes = excludes.map(PathBuf::from).collect();
    }
    if let Ok(Some(format)) = matches.try_get_one::<String>("format") {
        config.format = format.parse::<ReportFormat>()?;
    }
    if let Ok(Some(dry_run)) = matches.try_get_one::<bool>("dry-run") {
        config.dry_run = *dry_run;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> (String, TaskConfig) {
        let matches = build_cli().try_get_matches_from(args).unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        (name.to_string(), config_from_matches(sub).unwrap())
    }

    #[test]
    fn test_generate_defaults() {
        let (name, config) = parse(&["go-lombok", "generate"]);
        assert_eq!(name, "generate");
        assert_eq!(config.root, PathBuf::from("."));
        assert!(config.excludes.is_empty());
        assert_eq!(config.format, ReportFormat::Text);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_generate_alias_and_options() {
        let (name, config) = parse(&[
            "go-lombok", "gen", "-d", "/src/app", "-e", "vendor", "--exclude", "third_party",
            "--format", "json", "--dry-run",
        ]);
        assert_eq!(name, "generate");
        assert_eq!(config.root, PathBuf::from("/src/app"));
        assert_eq!(
            config.excludes,
            vec![PathBuf::from("vendor"), PathBuf::from("third_party")]
        );
        assert_eq!(config.format, ReportFormat::Json);
        assert!(config.dry_run);
    }

    #[test]
    fn test_clear() {
        let (name, config) = parse(&["go-lombok", "clear", "--dir", "pkg"]);
        assert_eq!(name, "clear");
        assert_eq!(config.root, PathBuf::from("pkg"));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(build_cli()
            .try_get_matches_from(["go-lombok", "g", "--format", "yaml"])
            .is_err());
    }
}
