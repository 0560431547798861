//! Import table of one generated file.

use std::collections::{BTreeMap, HashSet};

use crate::ast::{last_segment, Decl, Expr, ImportSpec};

/// Module paths referenced by a generated file and the aliases chosen for them
#[derive(Debug, Default)]
pub struct ImportTable {
    /// Path of the package being generated; its types stay unqualified
    own_path: String,
    aliases: BTreeMap<String, String>,
    taken: HashSet<String>,
}

impl ImportTable {
    pub fn new(own_path: &str) -> Self {
        Self {
            own_path: own_path.trim_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Alias for `path`, registering the import on first use.
    ///
    /// Returns `None` for the package's own path.
    pub fn find_or_add(&mut self, path: &str) -> Option<String> {
        let path = path.trim_matches('/');
        if path == self.own_path {
            return None;
        }
        if let Some(alias) = self.aliases.get(path) {
            return Some(alias.clone());
        }

        let base = base_alias(path);
        let mut alias = base.clone();
        let mut suffix = 2;
        while self.taken.contains(&alias) {
            alias = format!("{base}{suffix}");
            suffix += 1;
        }

        self.taken.insert(alias.clone());
        self.aliases.insert(path.to_string(), alias.clone());
        Some(alias)
    }

    /// Rewrite path-qualified references in a type to this file's aliases
    pub fn qualify(&mut self, ty: &Expr) -> Expr {
        ty.map_qualified(&mut |path, sel| {
            Some(match self.find_or_add(path) {
                Some(alias) => Expr::selector(Expr::ident(alias), sel),
                None => Expr::ident(sel),
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Import declaration sorted by path, or `None` when nothing was imported
    pub fn build(&self) -> Option<Decl> {
        if self.is_empty() {
            return None;
        }

        let specs = self
            .aliases
            .iter()
            .map(|(path, alias)| ImportSpec {
                alias: (alias != last_segment(path)).then(|| alias.clone()),
                path: path.clone(),
            })
            .collect();
        Some(Decl::Import(specs))
    }
}

/// Identifier derived from the last meaningful segment of an import path
fn base_alias(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let mut segment = segments.next().unwrap_or_default();
    if is_major_version(segment) {
        if let Some(previous) = segments.next() {
            segment = previous;
        }
    }
    // gopkg.in/yaml.v3
    if let Some((name, version)) = segment.rsplit_once('.') {
        if is_major_version(version) {
            segment = name;
        }
    }

    let alias: String = segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    match alias.chars().next() {
        None => "pkg".to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{alias}"),
        Some(_) => alias,
    }
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
