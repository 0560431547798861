//! Module path discovery from `go.mod`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path};

use anyhow::{Context, Result};
use regex::Regex;

pub const GO_MOD: &str = "go.mod";

/// Module path declared in `content`, if any
pub fn parse_module_path(content: &str) -> Option<String> {
    let re = Regex::new(r#"(?m)^\s*module\s+"?([\w./~-]+)"?"#).ok()?;
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('/').to_string())
}

/// Module path of the `go.mod` at `root`; empty when there is none
pub fn read_module_path(root: &Path) -> Result<String> {
    let path = root.join(GO_MOD);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(parse_module_path(&content).unwrap_or_default()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Import path of `dir`, given the module path of `root`.
///
/// Empty when the module path is unknown.
pub fn package_path(base: &str, root: &Path, dir: &Path) -> String {
    if base.is_empty() {
        return String::new();
    }

    let relative: Vec<_> = dir
        .strip_prefix(root)
        .map(|rel| {
            rel.components()
                .filter_map(|component| match component {
                    Component::Normal(part) => part.to_str(),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if relative.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{}", relative.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_module_path() {
        let content = "// comment\nmodule github.com/acme/shop\n\ngo 1.22\n";
        assert_eq!(
            parse_module_path(content).as_deref(),
            Some("github.com/acme/shop")
        );
        assert_eq!(parse_module_path("go 1.22\n"), None);
        assert_eq!(
            parse_module_path("module \"example.com/quoted-name\"\n").as_deref(),
            Some("example.com/quoted-name")
        );
    }

    #[test]
    fn test_read_module_path() {
        let root = TempDir::new().unwrap();
        assert_eq!(read_module_path(root.path()).unwrap(), "");

        fs::write(root.path().join(GO_MOD), "module example.com/app\n").unwrap();
        assert_eq!(read_module_path(root.path()).unwrap(), "example.com/app");
    }

    #[test]
    fn test_package_path() {
        let root = Path::new("/work/app");
        assert_eq!(package_path("example.com/app", root, root), "example.com/app");
        assert_eq!(
            package_path("example.com/app", root, &root.join("internal/store")),
            "example.com/app/internal/store"
        );
        assert_eq!(package_path("", root, &root.join("internal")), "");
    }
}
