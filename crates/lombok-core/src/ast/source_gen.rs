// Source code generation from AST
// Renders Go nodes the way gofmt lays them out: tab indentation, one blank line
// between top-level declarations, a trailing newline at the end of the file.

use super::*;

/// Trait for types that can generate their source code representation
pub trait ToSource {
    fn to_source(&self) -> String;
}

fn join_sources<T: ToSource>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|item| item.to_source())
        .collect::<Vec<_>>()
        .join(sep)
}

impl ToSource for Expr {
    fn to_source(&self) -> String {
        match self {
            Expr::Ident(name) => name.clone(),
            Expr::Selector { x, sel } => format!("{}.{}", x.to_source(), sel),
            Expr::Star(x) => format!("*{}", x.to_source()),
            Expr::Unary { op, x } => format!("{}{}", op, x.to_source()),
            Expr::Index { x, indices } => {
                format!("{}[{}]", x.to_source(), join_sources(indices, ", "))
            }
            Expr::Array { len, elt } => match len {
                Some(len) => format!("[{}]{}", len, elt.to_source()),
                None => format!("[]{}", elt.to_source()),
            },
            Expr::Map { key, value } => {
                format!("map[{}]{}", key.to_source(), value.to_source())
            }
            Expr::Chan { dir, value } => match dir {
                ChanDir::Both => format!("chan {}", value.to_source()),
                ChanDir::Send => format!("chan<- {}", value.to_source()),
                ChanDir::Recv => format!("<-chan {}", value.to_source()),
            },
            Expr::Paren(x) => format!("({})", x.to_source()),
            Expr::Func { params, results } => format!("func{}", signature(params, results)),
            Expr::Struct(fields) if fields.is_empty() => "struct{}".to_string(),
            Expr::Struct(fields) => format!("struct{{ {} }}", join_sources(fields, "; ")),
            Expr::Interface(elems) if elems.is_empty() => "interface{}".to_string(),
            Expr::Interface(elems) => {
                format!("interface{{ {} }}", join_sources(elems, "; "))
            }
            Expr::Ellipsis(x) => format!("...{}", x.to_source()),
            Expr::Raw(text) => text.clone(),
        }
    }
}

// Parameter list and results of a function type or declaration
fn signature(params: &[Field], results: &[Field]) -> String {
    let params = format!("({})", join_sources(params, ", "));
    match results {
        [] => params,
        [single] if single.names.is_empty() => format!("{} {}", params, single.ty.to_source()),
        results => format!("{} ({})", params, join_sources(results, ", ")),
    }
}

impl ToSource for InterfaceElem {
    fn to_source(&self) -> String {
        match self {
            InterfaceElem::Method {
                name,
                params,
                results,
            } => format!("{}{}", name, signature(params, results)),
            InterfaceElem::Embed(terms) => join_sources(terms, " | "),
        }
    }
}

impl ToSource for Stmt {
    fn to_source(&self) -> String {
        match self {
            Stmt::Return(results) => {
                if results.is_empty() {
                    "return".to_string()
                } else {
                    format!("return {}", join_sources(results, ", "))
                }
            }
            Stmt::Assign { lhs, op, rhs } => format!(
                "{} {} {}",
                join_sources(lhs, ", "),
                op,
                join_sources(rhs, ", ")
            ),
            Stmt::Other(text) => text.clone(),
        }
    }
}

impl ToSource for Field {
    fn to_source(&self) -> String {
        if self.names.is_empty() {
            self.ty.to_source()
        } else {
            format!("{} {}", self.names.join(", "), self.ty.to_source())
        }
    }
}

impl ToSource for FuncDecl {
    fn to_source(&self) -> String {
        let mut result = String::new();
        for line in &self.doc {
            if line.is_empty() {
                result.push_str("//\n");
            } else {
                result.push_str(&format!("// {line}\n"));
            }
        }

        result.push_str("func ");
        if let Some(recv) = &self.recv {
            result.push_str(&format!("({}) ", recv.to_source()));
        }
        result.push_str(&self.name);
        result.push_str(&signature(&self.params, &self.results));

        if let Some(body) = &self.body {
            result.push_str(" {\n");
            for stmt in body {
                result.push_str(&format!("\t{}\n", stmt.to_source()));
            }
            result.push('}');
        }
        result
    }
}

impl ToSource for ImportSpec {
    fn to_source(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} {}", alias, quote(&self.path)),
            None => quote(&self.path),
        }
    }
}

impl ToSource for StructField {
    fn to_source(&self) -> String {
        let mut result = if self.names.is_empty() {
            self.ty.to_source()
        } else {
            format!("{} {}", self.names.join(", "), self.ty.to_source())
        };
        if let Some(tag) = &self.tag {
            result.push(' ');
            result.push_str(tag);
        }
        result
    }
}

impl ToSource for TypeSpec {
    fn to_source(&self) -> String {
        let name = if self.type_params.is_empty() {
            self.name.clone()
        } else {
            format!("{}[{}]", self.name, join_sources(&self.type_params, ", "))
        };
        let assign = if self.alias { " = " } else { " " };
        format!("{}{}{}", name, assign, self.ty.to_source())
    }
}

impl ToSource for Decl {
    fn to_source(&self) -> String {
        match self {
            Decl::Import(specs) => match specs.as_slice() {
                [single] => format!("import {}", single.to_source()),
                specs => {
                    let mut result = "import (\n".to_string();
                    for spec in specs {
                        result.push_str(&format!("\t{}\n", spec.to_source()));
                    }
                    result.push(')');
                    result
                }
            },
            Decl::Type(specs) => match specs.as_slice() {
                [single] => format!("type {}", single.to_source()),
                specs => {
                    let mut result = "type (\n".to_string();
                    for spec in specs {
                        result.push_str(&format!("\t{}\n", spec.to_source()));
                    }
                    result.push(')');
                    result
                }
            },
            Decl::Func(func) => func.to_source(),
        }
    }
}

impl ToSource for File {
    fn to_source(&self) -> String {
        let mut result = format!("package {}\n", self.package);
        for decl in &self.decls {
            result.push('\n');
            result.push_str(&decl.to_source());
            result.push('\n');
        }
        result
    }
}

// Go interpreted string literal for an import path
fn quote(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str(r#"\""#),
            '\\' => result.push_str(r"\\"),
            '\n' => result.push_str(r"\n"),
            '\t' => result.push_str(r"\t"),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}
