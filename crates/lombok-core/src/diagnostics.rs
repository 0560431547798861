//! Tag suggestions for fields whose existing accessors are not yet described
//! by their tag.

use std::fmt;

use serde::Serialize;

use crate::model::Package;
use crate::naming::pad_right;
use crate::tag::{suggest_tag, tag_content};

const COLUMN_WIDTH: usize = 20;

/// Suggestions for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    pub package: String,
    pub types: Vec<TypeReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeReport {
    pub name: String,
    /// Receiver override from a `recv` tag
    pub recv: Option<String>,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub field: String,
    /// Tag literal currently on the field
    pub current: Option<String>,
    pub suggested: String,
}

impl PackageReport {
    /// Collect suggestions that differ from the tag a field already carries
    pub fn build(pkg: &Package) -> Self {
        let types = pkg
            .types()
            .filter_map(|typ| {
                let suggestions: Vec<_> = typ
                    .properties()
                    .filter_map(|prop| {
                        let suggested = suggest_tag(prop)?;
                        let current = prop.tag.as_deref().and_then(tag_content);
                        if current.as_deref() == Some(suggested.trim_matches('`')) {
                            return None;
                        }
                        Some(Suggestion {
                            field: prop.name.clone(),
                            current: prop.tag.clone(),
                            suggested,
                        })
                    })
                    .collect();

                (!suggestions.is_empty()).then(|| TypeReport {
                    name: typ.name().to_string(),
                    recv: typ.recv_name().map(str::to_string),
                    suggestions,
                })
            })
            .collect();

        Self {
            package: pkg.path().to_string(),
            types,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Number of fields with a suggestion
    pub fn len(&self) -> usize {
        self.types.iter().map(|typ| typ.suggestions.len()).sum()
    }
}

impl fmt::Display for PackageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }

        writeln!(f, "package {}", self.package)?;
        for typ in &self.types {
            writeln!(f, "type {}: recv={}", typ.name, typ.recv.as_deref().unwrap_or(""))?;
            for suggestion in &typ.suggestions {
                writeln!(
                    f,
                    "    {}.{} {} => {}",
                    pad_right(&typ.name, COLUMN_WIDTH),
                    pad_right(&suggestion.field, COLUMN_WIDTH),
                    pad_right(suggestion.current.as_deref().unwrap_or("-"), COLUMN_WIDTH),
                    suggestion.suggested
                )?;
            }
        }
        Ok(())
    }
}
