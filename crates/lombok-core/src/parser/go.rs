use tree_sitter::Node;
use tracing::trace;

use crate::ast::{
    ChanDir, Decl, Expr, Field, File, FuncDecl, ImportSpec, InterfaceElem, Stmt, StructField,
    TypeSpec,
};
use crate::parser::{SourceParser, INLINE_SOURCE};
use crate::{LombokError, Result};

/// Go parser backed by tree-sitter-go
///
/// The concrete syntax tree is converted into [`crate::ast`] nodes right away;
/// tree-sitter types never leave this module.
pub struct GoParser {
    parser: tree_sitter::Parser,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| LombokError::Language(e.to_string()))?;

        Ok(Self { parser })
    }
}

impl SourceParser for GoParser {
    fn parse(&mut self, source: &str) -> Result<File> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| LombokError::ParseAborted {
                file: INLINE_SOURCE.to_string(),
            })?;

        let root = tree.root_node();
        if let Some(bad) = first_error(root) {
            let pos = bad.start_position();
            let message = if bad.is_missing() {
                format!("missing {}", bad.kind())
            } else {
                let snippet: String = text(bad, source).chars().take(20).collect();
                format!("unexpected `{}`", snippet.trim())
            };
            return Err(LombokError::Syntax {
                file: INLINE_SOURCE.to_string(),
                line: pos.row + 1,
                column: pos.column + 1,
                message,
            });
        }

        Ok(convert_file(root, source))
    }

    fn name(&self) -> &'static str {
        "tree-sitter-go"
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

fn text<'s>(node: Node, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

// Named children without comments, which tree-sitter attaches anywhere
fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn field_texts(node: Node, field: &str, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor)
        .map(|child| text(child, source).to_string())
        .collect()
}

fn convert_file(root: Node, source: &str) -> File {
    let mut file = File::new(String::new());

    for child in named_children(root) {
        match child.kind() {
            "package_clause" => {
                if let Some(name) = named_children(child).first() {
                    file.package = text(*name, source).to_string();
                }
            }
            "import_declaration" => {
                file.decls.push(Decl::Import(convert_imports(child, source)));
            }
            "type_declaration" => {
                let specs = named_children(child)
                    .into_iter()
                    .filter_map(|spec| convert_type_spec(spec, source))
                    .collect();
                file.decls.push(Decl::Type(specs));
            }
            "method_declaration" | "function_declaration" => {
                file.decls.push(Decl::Func(convert_func(child, source)));
            }
            // var/const declarations carry nothing the scanner needs
            other => trace!("skipping top-level {other}"),
        }
    }

    file
}

fn convert_imports(node: Node, source: &str) -> Vec<ImportSpec> {
    let mut specs = Vec::new();
    for child in named_children(node) {
        match child.kind() {
            "import_spec" => specs.extend(convert_import_spec(child, source)),
            "import_spec_list" => {
                for spec in named_children(child) {
                    if spec.kind() == "import_spec" {
                        specs.extend(convert_import_spec(spec, source));
                    }
                }
            }
            _ => {}
        }
    }
    specs
}

fn convert_import_spec(node: Node, source: &str) -> Option<ImportSpec> {
    let path = node.child_by_field_name("path")?;
    let path = text(path, source).trim_matches(|c| c == '"' || c == '`');
    if path.is_empty() {
        return None;
    }
    let alias = node
        .child_by_field_name("name")
        .map(|name| text(name, source).to_string());

    Some(ImportSpec {
        alias,
        path: path.to_string(),
    })
}

fn convert_type_spec(node: Node, source: &str) -> Option<TypeSpec> {
    if node.kind() != "type_spec" && node.kind() != "type_alias" {
        return None;
    }
    let name = text(node.child_by_field_name("name")?, source).to_string();
    let type_params = node
        .child_by_field_name("type_parameters")
        .map(|params| convert_params(params, source))
        .unwrap_or_default();

    let ty = node.child_by_field_name("type")?;

    Some(TypeSpec {
        name,
        type_params,
        alias: node.kind() == "type_alias",
        ty: convert_type(ty, source),
    })
}

fn convert_struct(node: Node, source: &str) -> Vec<StructField> {
    let mut fields = Vec::new();
    for list in named_children(node) {
        if list.kind() != "field_declaration_list" {
            continue;
        }
        for decl in named_children(list) {
            if decl.kind() != "field_declaration" {
                continue;
            }
            let Some(ty) = decl.child_by_field_name("type") else {
                continue;
            };
            let names = field_texts(decl, "name", source);
            let mut ty = convert_type(ty, source);
            // embedded `*T` keeps its star outside the type field
            if names.is_empty() && decl.child(0).is_some_and(|first| first.kind() == "*") {
                ty = Expr::star(ty);
            }
            let tag = decl
                .child_by_field_name("tag")
                .map(|tag| text(tag, source).to_string());

            fields.push(StructField { names, ty, tag });
        }
    }
    fields
}

fn convert_type(node: Node, source: &str) -> Expr {
    match node.kind() {
        "type_identifier" | "identifier" | "package_identifier" => Expr::ident(text(node, source)),
        "qualified_type" => {
            match (
                node.child_by_field_name("package"),
                node.child_by_field_name("name"),
            ) {
                (Some(package), Some(name)) => {
                    Expr::selector(Expr::ident(text(package, source)), text(name, source))
                }
                _ => Expr::Raw(text(node, source).to_string()),
            }
        }
        "pointer_type" => match named_children(node).first() {
            Some(inner) => Expr::star(convert_type(*inner, source)),
            None => Expr::Raw(text(node, source).to_string()),
        },
        "slice_type" => match node.child_by_field_name("element") {
            Some(elt) => Expr::Array {
                len: None,
                elt: Box::new(convert_type(elt, source)),
            },
            None => Expr::Raw(text(node, source).to_string()),
        },
        "array_type" => match (
            node.child_by_field_name("length"),
            node.child_by_field_name("element"),
        ) {
            (Some(len), Some(elt)) => Expr::Array {
                len: Some(text(len, source).to_string()),
                elt: Box::new(convert_type(elt, source)),
            },
            _ => Expr::Raw(text(node, source).to_string()),
        },
        "map_type" => match (
            node.child_by_field_name("key"),
            node.child_by_field_name("value"),
        ) {
            (Some(key), Some(value)) => Expr::Map {
                key: Box::new(convert_type(key, source)),
                value: Box::new(convert_type(value, source)),
            },
            _ => Expr::Raw(text(node, source).to_string()),
        },
        "channel_type" => match node.child_by_field_name("value") {
            Some(value) => Expr::Chan {
                dir: channel_dir(node),
                value: Box::new(convert_type(value, source)),
            },
            None => Expr::Raw(text(node, source).to_string()),
        },
        "generic_type" => {
            let Some(base) = node.child_by_field_name("type") else {
                return Expr::Raw(text(node, source).to_string());
            };
            let indices = node
                .child_by_field_name("type_arguments")
                .map(|args| {
                    named_children(args)
                        .into_iter()
                        .map(|arg| convert_type(arg, source))
                        .collect()
                })
                .unwrap_or_default();
            Expr::Index {
                x: Box::new(convert_type(base, source)),
                indices,
            }
        }
        "parenthesized_type" => match named_children(node).first() {
            Some(inner) => Expr::Paren(Box::new(convert_type(*inner, source))),
            None => Expr::Raw(text(node, source).to_string()),
        },
        // a type argument is a union of terms; a single term is just a type
        "type_elem" | "type_constraint" | "constraint_elem" => {
            match named_children(node).as_slice() {
                [single] => convert_type(*single, source),
                _ => Expr::Raw(text(node, source).to_string()),
            }
        }
        "negated_type" | "constraint_term" => match named_children(node).as_slice() {
            [inner] if text(node, source).starts_with('~') => Expr::Unary {
                op: "~".to_string(),
                x: Box::new(convert_type(*inner, source)),
            },
            [inner] => convert_type(*inner, source),
            _ => Expr::Raw(text(node, source).to_string()),
        },
        "function_type" => {
            let (params, results) = convert_signature(node, source);
            Expr::Func { params, results }
        }
        "struct_type" => Expr::Struct(convert_struct(node, source)),
        "interface_type" => Expr::Interface(convert_interface(node, source)),
        _ => Expr::Raw(text(node, source).to_string()),
    }
}

fn convert_interface(node: Node, source: &str) -> Vec<InterfaceElem> {
    named_children(node)
        .into_iter()
        .filter_map(|elem| match elem.kind() {
            "method_elem" | "method_spec" => {
                let name = text(elem.child_by_field_name("name")?, source).to_string();
                let (params, results) = convert_signature(elem, source);
                Some(InterfaceElem::Method {
                    name,
                    params,
                    results,
                })
            }
            "type_elem" | "constraint_elem" => Some(InterfaceElem::Embed(
                named_children(elem)
                    .into_iter()
                    .map(|term| convert_type(term, source))
                    .collect(),
            )),
            // grammars without type_elem put embedded names directly in the body
            _ => Some(InterfaceElem::Embed(vec![convert_type(elem, source)])),
        })
        .collect()
}

fn channel_dir(node: Node) -> ChanDir {
    let mut cursor = node.walk();
    let tokens: Vec<&str> = node
        .children(&mut cursor)
        .filter(|child| !child.is_named())
        .map(|child| child.kind())
        .collect();
    match tokens.as_slice() {
        ["<-", "chan", ..] => ChanDir::Recv,
        ["chan", "<-", ..] => ChanDir::Send,
        _ => ChanDir::Both,
    }
}

fn convert_params(node: Node, source: &str) -> Vec<Field> {
    named_children(node)
        .into_iter()
        .filter_map(|param| {
            let ty = param.child_by_field_name("type")?;
            let names = field_texts(param, "name", source);
            let ty = match param.kind() {
                "variadic_parameter_declaration" => {
                    Expr::Ellipsis(Box::new(convert_type(ty, source)))
                }
                _ => convert_type(ty, source),
            };
            Some(Field::new(names, ty))
        })
        .collect()
}

// Parameters and results of a function declaration, function type or interface method
fn convert_signature(node: Node, source: &str) -> (Vec<Field>, Vec<Field>) {
    let params = node
        .child_by_field_name("parameters")
        .map(|list| convert_params(list, source))
        .unwrap_or_default();

    let results = match node.child_by_field_name("result") {
        Some(result) if result.kind() == "parameter_list" => convert_params(result, source),
        Some(result) => vec![Field::unnamed(convert_type(result, source))],
        None => Vec::new(),
    };

    (params, results)
}

fn convert_func(node: Node, source: &str) -> FuncDecl {
    let name = node
        .child_by_field_name("name")
        .map(|name| text(name, source).to_string())
        .unwrap_or_default();

    // a receiver list with several entries is invalid Go; treat it as absent
    let recv = node
        .child_by_field_name("receiver")
        .map(|list| convert_params(list, source))
        .and_then(|mut fields| match fields.len() {
            1 => fields.pop(),
            _ => None,
        });

    let (params, results) = convert_signature(node, source);

    let body = node
        .child_by_field_name("body")
        .map(|block| convert_block(block, source));

    FuncDecl {
        doc: Vec::new(),
        recv,
        name,
        params,
        results,
        body,
    }
}

fn convert_block(node: Node, source: &str) -> Vec<Stmt> {
    let mut stmts = Vec::new();
    for child in named_children(node) {
        if child.kind() == "statement_list" {
            stmts.extend(
                named_children(child)
                    .into_iter()
                    .map(|stmt| convert_stmt(stmt, source)),
            );
        } else {
            stmts.push(convert_stmt(child, source));
        }
    }
    stmts
}

fn convert_stmt(node: Node, source: &str) -> Stmt {
    match node.kind() {
        "return_statement" => {
            let results = named_children(node)
                .into_iter()
                .flat_map(|child| expression_list(child, source))
                .collect();
            Stmt::Return(results)
        }
        "assignment_statement" => {
            let (Some(left), Some(right)) = (
                node.child_by_field_name("left"),
                node.child_by_field_name("right"),
            ) else {
                return Stmt::Other(text(node, source).to_string());
            };
            let op = match node.child_by_field_name("operator") {
                Some(op) => text(op, source).to_string(),
                None => operator_between(node, source).unwrap_or_else(|| "=".to_string()),
            };
            Stmt::Assign {
                lhs: expression_list(left, source),
                op,
                rhs: expression_list(right, source),
            }
        }
        _ => Stmt::Other(text(node, source).to_string()),
    }
}

fn operator_between(node: Node, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let op = node
        .children(&mut cursor)
        .find(|child| !child.is_named())
        .map(|child| text(child, source).to_string());
    op
}

fn expression_list(node: Node, source: &str) -> Vec<Expr> {
    if node.kind() == "expression_list" {
        named_children(node)
            .into_iter()
            .map(|expr| convert_expr(expr, source))
            .collect()
    } else {
        vec![convert_expr(node, source)]
    }
}

fn convert_expr(node: Node, source: &str) -> Expr {
    match node.kind() {
        "identifier" | "field_identifier" => Expr::ident(text(node, source)),
        "selector_expression" => match (
            node.child_by_field_name("operand"),
            node.child_by_field_name("field"),
        ) {
            (Some(operand), Some(field)) => {
                Expr::selector(convert_expr(operand, source), text(field, source))
            }
            _ => Expr::Raw(text(node, source).to_string()),
        },
        "unary_expression" => match (
            node.child_by_field_name("operator"),
            node.child_by_field_name("operand"),
        ) {
            (Some(op), Some(operand)) => Expr::Unary {
                op: text(op, source).to_string(),
                x: Box::new(convert_expr(operand, source)),
            },
            _ => Expr::Raw(text(node, source).to_string()),
        },
        "parenthesized_expression" => match named_children(node).first() {
            Some(inner) => Expr::Paren(Box::new(convert_expr(*inner, source))),
            None => Expr::Raw(text(node, source).to_string()),
        },
        _ => Expr::Raw(text(node, source).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ToSource;

    fn parse(source: &str) -> File {
        let mut parser = GoParser::new().unwrap();
        parser.parse(source).unwrap()
    }

    #[test]
    fn test_package_and_imports() {
        let file = parse(
            r#"
package shop

import "time"

import (
	ord "github.com/acme/shop/order"
	_ "embed"
	"github.com/acme/shop/user"
)
"#,
        );
        assert_eq!(file.package, "shop");

        let imports: Vec<_> = file.imports().cloned().collect();
        assert_eq!(imports.len(), 4);
        assert_eq!(imports[0].path, "time");
        assert_eq!(imports[0].alias, None);
        assert_eq!(imports[1].alias.as_deref(), Some("ord"));
        assert_eq!(imports[1].path, "github.com/acme/shop/order");
        assert_eq!(imports[2].alias.as_deref(), Some("_"));
        assert_eq!(imports[3].local_name(), "user");
    }

    #[test]
    fn test_struct_fields() {
        let file = parse(
            r#"
package shop

type Cart struct {
	id      int64 `get:""`
	a, b    string
	items   []*ord.Item `prop:"@"`
	byName  map[string]ord.Item
	*Base
}
"#,
        );
        let spec = file.type_specs().next().unwrap();
        assert_eq!(spec.name, "Cart");
        let Expr::Struct(fields) = &spec.ty else {
            panic!("expected struct, got {:?}", spec.ty);
        };
        assert_eq!(fields.len(), 5);

        assert_eq!(fields[0].names, vec!["id"]);
        assert_eq!(fields[0].ty, Expr::ident("int64"));
        assert_eq!(fields[0].tag.as_deref(), Some("`get:\"\"`"));

        assert_eq!(fields[1].names, vec!["a", "b"]);
        assert_eq!(fields[1].tag, None);

        assert_eq!(fields[2].ty.to_source(), "[]*ord.Item");
        assert_eq!(fields[3].ty.to_source(), "map[string]ord.Item");

        assert!(fields[4].names.is_empty());
        assert_eq!(fields[4].ty.to_source(), "*Base");
    }

    #[test]
    fn test_generic_type_spec() {
        let file = parse(
            r#"
package shop

type Page[T any] struct {
	items []T `get:""`
	next  *Cursor[T]
}
"#,
        );
        let spec = file.type_specs().next().unwrap();
        assert_eq!(spec.type_params.len(), 1);
        assert_eq!(spec.type_params[0].to_source(), "T any");
        let Expr::Struct(fields) = &spec.ty else {
            panic!("expected struct");
        };
        assert_eq!(fields[1].ty.to_source(), "*Cursor[T]");
    }

    #[test]
    fn test_inline_types() {
        let file = parse(
            r#"
package shop

type Hooks struct {
	onSave  func(ctx context.Context, u m.User) error
	log     func(format string, args ...any)
	source  interface {
		Load(id m.ID) (*m.User, error)
		io.Closer
	}
	meta    struct {
		owner m.User `json:"owner"`
	}
}

type Number interface {
	~int | ~float64
}

type Legacy = struct{ id int }
"#,
        );
        let specs: Vec<_> = file.type_specs().collect();
        assert_eq!(specs.len(), 3);
        let Expr::Struct(fields) = &specs[0].ty else {
            panic!("expected struct, got {:?}", specs[0].ty);
        };

        assert_eq!(
            fields[0].ty,
            Expr::Func {
                params: vec![
                    Field::named("ctx", Expr::selector(Expr::ident("context"), "Context")),
                    Field::named("u", Expr::selector(Expr::ident("m"), "User")),
                ],
                results: vec![Field::unnamed(Expr::ident("error"))],
            }
        );
        assert_eq!(
            fields[1].ty.to_source(),
            "func(format string, args ...any)"
        );
        assert_eq!(
            fields[2].ty.to_source(),
            "interface{ Load(id m.ID) (*m.User, error); io.Closer }"
        );
        assert_eq!(
            fields[3].ty.to_source(),
            "struct{ owner m.User `json:\"owner\"` }"
        );

        assert_eq!(specs[1].ty.to_source(), "interface{ ~int | ~float64 }");
        assert!(!specs[1].alias);
        assert!(specs[2].alias);
        assert_eq!(specs[2].to_source(), "Legacy = struct{ id int }");
    }

    #[test]
    fn test_method_shapes() {
        let file = parse(
            r#"
package shop

// Total of the cart
func (c *Cart) Total() int64 {
	return c.total
}

func (c Cart) SetTotal(v int64) {
	c.total = v
}

func helper(a, b int) (int, error) {
	return a + b, nil
}
"#,
        );
        let funcs: Vec<_> = file.funcs().collect();
        assert_eq!(funcs.len(), 3);

        let getter = funcs[0];
        assert_eq!(getter.name, "Total");
        assert!(getter.doc.is_empty());
        let recv = getter.recv.as_ref().unwrap();
        assert_eq!(recv.names, vec!["c"]);
        assert_eq!(recv.ty.to_source(), "*Cart");
        assert_eq!(getter.results.len(), 1);
        assert_eq!(
            getter.body.as_ref().unwrap().as_slice(),
            &[Stmt::Return(vec![Expr::selector(Expr::ident("c"), "total")])]
        );

        let setter = funcs[1];
        assert_eq!(setter.params, vec![Field::named("v", Expr::ident("int64"))]);
        assert_eq!(
            setter.body.as_ref().unwrap().as_slice(),
            &[Stmt::Assign {
                lhs: vec![Expr::selector(Expr::ident("c"), "total")],
                op: "=".to_string(),
                rhs: vec![Expr::ident("v")],
            }]
        );

        let helper = funcs[2];
        assert!(helper.recv.is_none());
        assert_eq!(helper.params[0].names, vec!["a", "b"]);
        assert_eq!(helper.results.len(), 2);
    }

    #[test]
    fn test_syntax_error_location() {
        let mut parser = GoParser::new().unwrap();
        let err = parser
            .parse("package shop\n\ntype Cart struct {\n\tid int64\n")
            .unwrap_err();
        match err {
            LombokError::Syntax { file, line, .. } => {
                assert_eq!(file, INLINE_SOURCE);
                assert!(line >= 3, "unexpected line {line}");
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}
