/*!
# Source Scanner

Walks parsed Go files and fills the property model: struct fields with their
tags, the receiver names existing methods use, and which existing methods
already look like getters or setters.
*/

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::ast::{Expr, Field, File, FuncDecl, Stmt, TypeSpec};
use crate::model::Package;
use crate::parser::{create_parser, SourceParser};
use crate::tag::TagDirectives;
use crate::Result;

const BLANK: &str = "_";

/// Accumulates the model of one package across its source files
pub struct Scanner {
    parser: Box<dyn SourceParser>,
    package: Package,
}

impl Scanner {
    /// Create a scanner for the package at module path `package_path`
    pub fn new(package_path: &str) -> Result<Self> {
        Ok(Self::with_parser(package_path, create_parser()?))
    }

    pub fn with_parser(package_path: &str, parser: Box<dyn SourceParser>) -> Self {
        Self {
            parser,
            package: Package::new(package_path),
        }
    }

    /// Parse and scan one source file
    pub fn scan_file(&mut self, path: &Path) -> Result<()> {
        debug!("scanning {} with {}", path.display(), self.parser.name());
        let file = self.parser.parse_file(path)?;
        self.scan_ast(&file);
        Ok(())
    }

    /// Parse and scan source text that did not come from a file
    pub fn scan_source(&mut self, code: &str) -> Result<()> {
        let file = self.parser.parse(code)?;
        self.scan_ast(&file);
        Ok(())
    }

    /// Scan an already parsed file
    pub fn scan_ast(&mut self, file: &File) {
        if !file.package.is_empty() {
            self.package.set_name(file.package.as_str());
        }

        let imports = ImportTable::from_file(file);

        for spec in file.type_specs() {
            self.scan_type(spec, &imports);
        }
        for func in file.funcs() {
            self.scan_method(func);
        }
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Finish scanning and hand out the model
    pub fn finish(self) -> Package {
        self.package
    }

    fn scan_type(&mut self, spec: &TypeSpec, imports: &ImportTable) {
        let Expr::Struct(fields) = &spec.ty else {
            return;
        };
        if spec.alias {
            return;
        }

        let typ = self.package.type_mut(&spec.name);
        typ.set_type_params(
            spec.type_params
                .iter()
                .flat_map(|param| param.names.iter().cloned())
                .collect(),
        );

        for field in fields {
            // embedded fields have no names and are skipped
            for name in field.names.iter().filter(|name| name.as_str() != BLANK) {
                let directives = field
                    .tag
                    .as_deref()
                    .map(|tag| TagDirectives::parse(name, tag))
                    .unwrap_or_default();

                if let Some(recv) = &directives.recv {
                    typ.set_recv_name(recv.as_str());
                }

                let prop = typ.add_property(name);
                prop.ty = Some(imports.qualify(&field.ty));
                prop.tag = field.tag.clone();
                prop.getter = directives.getter;
                prop.setter = directives.setter;
                prop.ref_getter = directives.ref_getter;
                trace!(
                    "{}.{}: getter={:?} setter={:?} ref={}",
                    spec.name,
                    name,
                    prop.getter,
                    prop.setter,
                    prop.ref_getter
                );
            }
        }
    }

    fn scan_method(&mut self, func: &FuncDecl) {
        let Some((recv, type_name)) = func.recv.as_ref().and_then(receiver) else {
            return;
        };

        let typ = self.package.type_mut(type_name);
        typ.record_receiver(recv);

        if let Some(field) = getter_field(func, recv) {
            debug!("{type_name}.{}: existing getter for {field}", func.name);
            typ.property_mut(field).record_existing_getter(&func.name);
        } else if let Some(field) = setter_field(func, recv) {
            debug!("{type_name}.{}: existing setter for {field}", func.name);
            typ.property_mut(field).record_existing_setter(&func.name);
        } else {
            trace!("{type_name}.{}: not an accessor", func.name);
        }
    }
}

/// Receiver name and base type name of `(r T)`, `(r *T)` or `(r *T[K])`
fn receiver(field: &Field) -> Option<(&str, &str)> {
    let [name] = field.names.as_slice() else {
        return None;
    };
    if name == BLANK {
        return None;
    }

    let base = match &field.ty {
        Expr::Star(inner) => inner.as_ref(),
        other => other,
    };
    let type_name = match base {
        Expr::Ident(type_name) => type_name.as_str(),
        Expr::Index { x, .. } => x.as_ident()?,
        _ => return None,
    };

    Some((name.as_str(), type_name))
}

fn result_count(results: &[Field]) -> usize {
    results.iter().map(|field| field.names.len().max(1)).sum()
}

fn single_stmt(func: &FuncDecl) -> Option<&Stmt> {
    match func.body.as_deref() {
        Some([stmt]) => Some(stmt),
        _ => None,
    }
}

/// Field read by a `func (r T) Name() F { return r.field }` method
fn getter_field<'f>(func: &'f FuncDecl, recv: &str) -> Option<&'f str> {
    if !func.params.is_empty() || result_count(&func.results) != 1 {
        return None;
    }
    let Stmt::Return(values) = single_stmt(func)? else {
        return None;
    };
    let [value] = values.as_slice() else {
        return None;
    };

    match value.as_ident_selector()? {
        (obj, field) if obj == recv => Some(field),
        _ => None,
    }
}

/// Field written by a `func (r *T) SetName(v F) { r.field = v }` method
fn setter_field<'f>(func: &'f FuncDecl, recv: &str) -> Option<&'f str> {
    let [param] = func.params.as_slice() else {
        return None;
    };
    let [param] = param.names.as_slice() else {
        return None;
    };
    if !func.results.is_empty() {
        return None;
    }
    let Stmt::Assign { lhs, op, rhs } = single_stmt(func)? else {
        return None;
    };
    if op != "=" {
        return None;
    }
    let ([target], [value]) = (lhs.as_slice(), rhs.as_slice()) else {
        return None;
    };
    if value.as_ident() != Some(param.as_str()) {
        return None;
    }

    match target.as_ident_selector()? {
        (obj, field) if obj == recv => Some(field),
        _ => None,
    }
}

/// Local import names of one file, mapped to their module paths
struct ImportTable {
    paths: HashMap<String, String>,
}

impl ImportTable {
    fn from_file(file: &File) -> Self {
        let paths = file
            .imports()
            .filter(|spec| !matches!(spec.alias.as_deref(), Some("_") | Some(".")))
            .map(|spec| (spec.local_name().to_string(), spec.path.clone()))
            .collect();
        Self { paths }
    }

    /// Rewrite `alias.Name` references into `module/path.Name`
    fn qualify(&self, ty: &Expr) -> Expr {
        ty.map_qualified(&mut |qualifier, sel| {
            let path = self.paths.get(qualifier)?;
            Some(Expr::selector(Expr::ident(path.as_str()), sel))
        })
    }
}

/// Scan the given files of one package.
///
/// The first file that cannot be read or parsed aborts the scan.
pub fn scan_package(package_path: &str, files: &[PathBuf]) -> Result<Package> {
    let mut scanner = Scanner::new(package_path)?;
    for file in files {
        scanner.scan_file(file)?;
    }
    Ok(scanner.finish())
}

/// Scan a single source text
pub fn scan_source(package_path: &str, code: &str) -> Result<Package> {
    let mut scanner = Scanner::new(package_path)?;
    scanner.scan_source(code)?;
    Ok(scanner.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LombokError;

    fn scan(code: &str) -> Package {
        scan_source("github.com/acme/shop", code).unwrap()
    }

    #[test]
    fn test_fields_and_tags() {
        let pkg = scan(
            r#"package shop

type User struct {
	id         int
	first_name string `get:"" set:""`
	email      string `get:"@"`
	a, b       int    `prop:""`
	Base
	*Other
}
"#,
        );
        assert_eq!(pkg.name(), "shop");
        let user = pkg.get_type("User").unwrap();
        assert_eq!(user.field_names(), &["id", "first_name", "email", "a", "b"]);

        let id = user.property("id").unwrap();
        assert!(!id.wants_accessors());
        assert_eq!(id.tag, None);

        let first = user.property("first_name").unwrap();
        assert_eq!(first.getter.as_deref(), Some("FirstName"));
        assert_eq!(first.setter.as_deref(), Some("SetFirstName"));
        assert_eq!(first.tag.as_deref(), Some(r#"`get:"" set:""`"#));

        let email = user.property("email").unwrap();
        assert_eq!(email.getter.as_deref(), Some("GetEmail"));
        assert_eq!(email.setter, None);

        assert_eq!(user.property("b").unwrap().getter.as_deref(), Some("B"));
        assert_eq!(user.property("b").unwrap().ty, Some(Expr::ident("int")));
    }

    #[test]
    fn test_recv_tag_sets_override() {
        let pkg = scan(
            r#"package shop

type Cart struct {
	items []string `recv:"c" get:""`
}
"#,
        );
        assert_eq!(pkg.get_type("Cart").unwrap().recv_name(), Some("c"));
    }

    #[test]
    fn test_value_receiver_getter_shape() {
        let pkg = scan(
            r#"package shop

type T struct {
	p1 string
}

func (t T) P1() string { return t.p1 }
"#,
        );
        let typ = pkg.get_type("T").unwrap();
        assert!(typ.property("p1").unwrap().has_existing_getter("P1"));
        assert_eq!(typ.observed_receiver(), Some("t"));
    }

    #[test]
    fn test_pointer_receiver_setter_shape() {
        let pkg = scan(
            r#"package shop

type T struct {
	p string
}

func (x *T) setP(v string) { x.p = v }
"#,
        );
        let typ = pkg.get_type("T").unwrap();
        assert_eq!(typ.observed_receiver(), Some("x"));
        assert!(typ.property("p").unwrap().has_existing_setter("setP"));
    }

    #[test]
    fn test_non_accessor_methods_ignored() {
        let pkg = scan(
            r#"package shop

type T struct {
	a int
	b int
}

func (t *T) Sum() int { return t.a + t.b }
func (t *T) Ref() *int { return &t.a }
func (t *T) Inc(n int) { t.a += n }
func (t *T) Swap(v int) { t.a = t.b }
func (t *T) Other(o *T) int { return o.a }
func (t *T) Pair() (int, int) { return t.a, t.b }
func (t *T) Log() {
	t.a = 1
	t.b = 2
}
func (_ *T) Blank() int { return 0 }
func Free() int { return 0 }
"#,
        );
        let typ = pkg.get_type("T").unwrap();
        for name in ["a", "b"] {
            let prop = typ.property(name).unwrap();
            assert_eq!(prop.existing_getters().count(), 0, "{name}");
            assert_eq!(prop.existing_setters().count(), 0, "{name}");
        }
        assert_eq!(typ.observed_receiver(), Some("t"));
    }

    #[test]
    fn test_conflicting_receivers() {
        let pkg = scan(
            r#"package shop

type T struct {
	a int
}

func (t *T) A() int { return t.a }
func (self *T) SetA(v int) { self.a = v }
"#,
        );
        let typ = pkg.get_type("T").unwrap();
        assert_eq!(typ.observed_receiver(), None);
        let receivers: Vec<_> = typ.observed_receivers().collect();
        assert_eq!(receivers, vec!["t", "self"]);
    }

    #[test]
    fn test_accessor_for_undeclared_field_not_listed() {
        let pkg = scan(
            r#"package shop

type T struct{}

func (t *T) Ghost() int { return t.ghost }
"#,
        );
        let typ = pkg.get_type("T").unwrap();
        assert_eq!(typ.properties().count(), 0);
        assert!(typ.property("ghost").unwrap().has_existing_getter("Ghost"));
    }

    #[test]
    fn test_qualified_types_rewritten_to_paths() {
        let pkg = scan(
            r#"package shop

import (
	"time"
	ord "github.com/acme/shop/order"
	_ "embed"
)

type Cart struct {
	created time.Time                `get:""`
	orders  map[string][]*ord.Order `get:""`
	local   Item                     `get:""`
}
"#,
        );
        let cart = pkg.get_type("Cart").unwrap();
        assert_eq!(
            cart.property("created").unwrap().ty,
            Some(Expr::selector(Expr::ident("time"), "Time"))
        );
        let order = Expr::selector(Expr::ident("github.com/acme/shop/order"), "Order");
        assert_eq!(
            cart.property("orders").unwrap().ty,
            Some(Expr::Map {
                key: Box::new(Expr::ident("string")),
                value: Box::new(Expr::Array {
                    len: None,
                    elt: Box::new(Expr::star(order)),
                }),
            })
        );
        assert_eq!(cart.property("local").unwrap().ty, Some(Expr::ident("Item")));
    }

    #[test]
    fn test_inline_types_rewritten_to_paths() {
        let pkg = scan(
            r#"package shop

import (
	"context"
	m "github.com/acme/model"
)

type Service struct {
	hook  func(ctx context.Context, u m.User) error `get:""`
	store interface{ Find(id m.ID) *m.User }      `get:""`
}

type Alias = struct {
	hidden int `get:""`
}
"#,
        );
        let service = pkg.get_type("Service").unwrap();
        let model = |name: &str| Expr::selector(Expr::ident("github.com/acme/model"), name);
        assert_eq!(
            service.property("hook").unwrap().ty,
            Some(Expr::Func {
                params: vec![
                    Field::named("ctx", Expr::selector(Expr::ident("context"), "Context")),
                    Field::named("u", model("User")),
                ],
                results: vec![Field::unnamed(Expr::ident("error"))],
            })
        );
        assert_eq!(
            service.property("store").unwrap().ty,
            Some(Expr::Interface(vec![crate::ast::InterfaceElem::Method {
                name: "Find".to_string(),
                params: vec![Field::named("id", model("ID"))],
                results: vec![Field::unnamed(Expr::star(model("User")))],
            }]))
        );
        assert!(pkg.get_type("Alias").is_none());
    }

    #[test]
    fn test_generic_receiver_and_params() {
        let pkg = scan(
            r#"package shop

type Cache[K comparable, V any] struct {
	items map[K]V `get:""`
}

func (c *Cache[K, V]) Items() map[K]V { return c.items }
"#,
        );
        let cache = pkg.get_type("Cache").unwrap();
        assert_eq!(cache.type_params(), &["K", "V"]);
        assert_eq!(cache.observed_receiver(), Some("c"));
        assert!(cache.property("items").unwrap().has_existing_getter("Items"));
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let code = r#"package shop

type T struct {
	b int `prop:""`
	a int `get:"@"`
}

func (t *T) B() int { return t.b }
"#;
        let mut scanner = Scanner::new("shop").unwrap();
        scanner.scan_source(code).unwrap();
        let first = scanner.package().clone();
        scanner.scan_source(code).unwrap();
        assert_eq!(scanner.package(), &first);
    }

    #[test]
    fn test_syntax_error_aborts() {
        let err = scan_source("shop", "package shop\n\ntype T struct {\n").unwrap_err();
        assert!(matches!(err, LombokError::Syntax { .. }), "{err}");
    }
}
