// Accessor synthesizer
// Turns the finished property model into the text of the generated file.

pub mod imports;

pub use imports::ImportTable;

use tracing::debug;

use crate::ast::{Decl, Expr, Field, File, FuncDecl, Stmt, ToSource};
use crate::model::{Package, Property, Type};
use crate::scanner::scan_source;
use crate::Result;

/// Receiver name used when neither a tag nor existing methods decide it
pub const DEFAULT_RECEIVER: &str = "t";

const VALUE_PARAM: &str = "v";
const VALUE_PARAM_ALT: &str = "value";

/// Generate the accessor file for a package.
///
/// Returns `None` when no field asks for an accessor.
pub fn synthesize(pkg: &Package) -> Option<String> {
    let mut imports = ImportTable::new(pkg.path());
    let mut decls = Vec::new();

    for typ in pkg.types() {
        let accessors = type_accessors(typ, &mut imports);
        if !accessors.is_empty() {
            debug!("{}: {} accessor(s)", typ.name(), accessors.len());
        }
        decls.extend(accessors.into_iter().map(Decl::Func));
    }

    if decls.is_empty() {
        return None;
    }

    let mut file = File::new(pkg.name());
    file.decls.extend(imports.build());
    file.decls.extend(decls);
    Some(file.to_source())
}

/// Scan one source text and generate its accessor file
pub fn generate_source(package_path: &str, code: &str) -> Result<Option<String>> {
    let pkg = scan_source(package_path, code)?;
    Ok(synthesize(&pkg))
}

/// Receiver name: explicit override, then the single observed name, then `t`
pub fn receiver_name(typ: &Type) -> &str {
    typ.recv_name()
        .or_else(|| typ.observed_receiver())
        .unwrap_or(DEFAULT_RECEIVER)
}

fn receiver_type(typ: &Type) -> Expr {
    let base = Expr::ident(typ.name());
    let base = match typ.type_params() {
        [] => base,
        params => Expr::Index {
            x: Box::new(base),
            indices: params.iter().map(|param| Expr::ident(param.as_str())).collect(),
        },
    };
    Expr::star(base)
}

fn type_accessors(typ: &Type, imports: &mut ImportTable) -> Vec<FuncDecl> {
    let recv_name = receiver_name(typ);
    let recv = Field::named(recv_name, receiver_type(typ));
    let value_name = if recv_name == VALUE_PARAM {
        VALUE_PARAM_ALT
    } else {
        VALUE_PARAM
    };

    let mut decls = Vec::new();
    for prop in typ.properties().filter(|prop| prop.wants_accessors()) {
        let Some(ty) = &prop.ty else {
            continue;
        };
        let ty = imports.qualify(ty);
        let fetch = Expr::selector(Expr::ident(recv_name), prop.name.as_str());

        if let Some(getter) = &prop.getter {
            decls.push(getter_decl(prop, getter, &recv, &ty, &fetch));
        }
        if let Some(setter) = &prop.setter {
            decls.push(FuncDecl {
                doc: Vec::new(),
                recv: Some(recv.clone()),
                name: setter.clone(),
                params: vec![Field::named(value_name, ty.clone())],
                results: Vec::new(),
                body: Some(vec![Stmt::Assign {
                    lhs: vec![fetch.clone()],
                    op: "=".to_string(),
                    rhs: vec![Expr::ident(value_name)],
                }]),
            });
        }
    }

    if let Some(first) = decls.first_mut() {
        first.doc = vec![format!("properties for {}", typ.name())];
    }
    decls
}

fn getter_decl(prop: &Property, name: &str, recv: &Field, ty: &Expr, fetch: &Expr) -> FuncDecl {
    let (result, value) = if prop.ref_getter {
        (Expr::star(ty.clone()), Expr::address_of(fetch.clone()))
    } else {
        (ty.clone(), fetch.clone())
    };

    FuncDecl {
        doc: Vec::new(),
        recv: Some(recv.clone()),
        name: name.to_string(),
        params: Vec::new(),
        results: vec![Field::unnamed(result)],
        body: Some(vec![Stmt::Return(vec![value])]),
    }
}
