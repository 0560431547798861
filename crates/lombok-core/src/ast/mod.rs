// Go syntax subset
// Produced by the tree-sitter front end and by the accessor synthesizer.
// Only the shapes the scanner matches on and the synthesizer emits are modelled
// structurally; everything else is carried as raw source text.

pub mod source_gen;
pub use source_gen::ToSource;

/// Channel direction of a `chan` type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    /// chan T
    Both,
    /// chan<- T
    Send,
    /// <-chan T
    Recv,
}

/// Expressions, including type expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Plain identifier: x, int, MyType
    Ident(String),
    /// Selector: x.field, or pkg.Type for qualified types
    Selector { x: Box<Expr>, sel: String },
    /// Pointer type or dereference: *T
    Star(Box<Expr>),
    /// Unary operation: &x, -x, !x
    Unary { op: String, x: Box<Expr> },
    /// Generic instantiation: T[A, B]
    Index { x: Box<Expr>, indices: Vec<Expr> },
    /// Array or slice type: [N]T, []T
    Array { len: Option<String>, elt: Box<Expr> },
    /// map[K]V
    Map { key: Box<Expr>, value: Box<Expr> },
    /// chan T, chan<- T, <-chan T
    Chan { dir: ChanDir, value: Box<Expr> },
    /// Parenthesized expression or type: (T)
    Paren(Box<Expr>),
    /// Function type: func(a A) (B, error)
    Func { params: Vec<Field>, results: Vec<Field> },
    /// Inline struct type: struct{ a A }
    Struct(Vec<StructField>),
    /// Inline interface type: interface{ M() error }
    Interface(Vec<InterfaceElem>),
    /// Variadic parameter type: ...T
    Ellipsis(Box<Expr>),
    /// Anything not modelled above, kept verbatim
    Raw(String),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn selector(x: Expr, sel: impl Into<String>) -> Self {
        Expr::Selector {
            x: Box::new(x),
            sel: sel.into(),
        }
    }

    pub fn star(x: Expr) -> Self {
        Expr::Star(Box::new(x))
    }

    pub fn address_of(x: Expr) -> Self {
        Expr::Unary {
            op: "&".to_string(),
            x: Box::new(x),
        }
    }

    /// Name of a bare identifier, if this is one
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Rebuild this type with every `qualifier.Name` reference replaced by
    /// what `f` returns for it; `None` keeps the reference unchanged.
    pub fn map_qualified<F>(&self, f: &mut F) -> Expr
    where
        F: FnMut(&str, &str) -> Option<Expr>,
    {
        match self {
            Expr::Selector { x, sel } => match x.as_ident().and_then(|q| f(q, sel.as_str())) {
                Some(replaced) => replaced,
                None => self.clone(),
            },
            Expr::Star(inner) => Expr::star(inner.map_qualified(f)),
            Expr::Unary { op, x } => Expr::Unary {
                op: op.clone(),
                x: Box::new(x.map_qualified(f)),
            },
            Expr::Index { x, indices } => Expr::Index {
                x: Box::new(x.map_qualified(f)),
                indices: indices.iter().map(|index| index.map_qualified(f)).collect(),
            },
            Expr::Array { len, elt } => Expr::Array {
                len: len.clone(),
                elt: Box::new(elt.map_qualified(f)),
            },
            Expr::Map { key, value } => Expr::Map {
                key: Box::new(key.map_qualified(f)),
                value: Box::new(value.map_qualified(f)),
            },
            Expr::Chan { dir, value } => Expr::Chan {
                dir: *dir,
                value: Box::new(value.map_qualified(f)),
            },
            Expr::Paren(inner) => Expr::Paren(Box::new(inner.map_qualified(f))),
            Expr::Func { params, results } => Expr::Func {
                params: map_fields(params, f),
                results: map_fields(results, f),
            },
            Expr::Struct(fields) => Expr::Struct(
                fields
                    .iter()
                    .map(|field| StructField {
                        names: field.names.clone(),
                        ty: field.ty.map_qualified(f),
                        tag: field.tag.clone(),
                    })
                    .collect(),
            ),
            Expr::Interface(elems) => Expr::Interface(
                elems
                    .iter()
                    .map(|elem| match elem {
                        InterfaceElem::Method {
                            name,
                            params,
                            results,
                        } => InterfaceElem::Method {
                            name: name.clone(),
                            params: map_fields(params, f),
                            results: map_fields(results, f),
                        },
                        InterfaceElem::Embed(terms) => InterfaceElem::Embed(
                            terms.iter().map(|term| term.map_qualified(f)).collect(),
                        ),
                    })
                    .collect(),
            ),
            Expr::Ellipsis(inner) => Expr::Ellipsis(Box::new(inner.map_qualified(f))),
            Expr::Ident(_) | Expr::Raw(_) => self.clone(),
        }
    }

    /// `(operand, field)` when this is `ident.field`
    pub fn as_ident_selector(&self) -> Option<(&str, &str)> {
        match self {
            Expr::Selector { x, sel } => x.as_ident().map(|obj| (obj, sel.as_str())),
            _ => None,
        }
    }
}

fn map_fields<F>(fields: &[Field], f: &mut F) -> Vec<Field>
where
    F: FnMut(&str, &str) -> Option<Expr>,
{
    fields
        .iter()
        .map(|field| Field::new(field.names.clone(), field.ty.map_qualified(f)))
        .collect()
}

/// One line of an interface type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElem {
    /// Method signature: Close() error
    Method {
        name: String,
        params: Vec<Field>,
        results: Vec<Field>,
    },
    /// Embedded interface or union of type terms: io.Reader, ~int | ~string
    Embed(Vec<Expr>),
}

/// Statements inside a function body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// return a, b
    Return(Vec<Expr>),
    /// lhs op rhs, where op is one of =, +=, -=, ...
    Assign {
        lhs: Vec<Expr>,
        op: String,
        rhs: Vec<Expr>,
    },
    /// Any other statement, kept verbatim
    Other(String),
}

/// A field in a parameter, result or receiver list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Declared names; empty for unnamed parameters
    pub names: Vec<String>,
    pub ty: Expr,
}

impl Field {
    pub fn new(names: Vec<String>, ty: Expr) -> Self {
        Self { names, ty }
    }

    pub fn named(name: impl Into<String>, ty: Expr) -> Self {
        Self {
            names: vec![name.into()],
            ty,
        }
    }

    pub fn unnamed(ty: Expr) -> Self {
        Self {
            names: Vec::new(),
            ty,
        }
    }
}

/// A function or method declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    /// Comment lines rendered above the declaration, without `//`
    pub doc: Vec<String>,
    pub recv: Option<Field>,
    pub name: String,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    /// None for declarations without a body (assembly stubs)
    pub body: Option<Vec<Stmt>>,
}

/// One field line of a struct type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    /// Declared names; empty for embedded fields
    pub names: Vec<String>,
    pub ty: Expr,
    /// Tag literal exactly as written, quotes included
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    /// Type parameters with their constraints: `[K comparable, V any]`
    pub type_params: Vec<Field>,
    /// `type A = B`; methods cannot be declared on an alias of a type literal
    pub alias: bool,
    /// `Expr::Struct` for struct types
    pub ty: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit alias, including `_` and `.`
    pub alias: Option<String>,
    /// Unquoted import path
    pub path: String,
}

impl ImportSpec {
    /// Name the import is referred to by in the importing file
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => last_segment(&self.path),
        }
    }
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Import(Vec<ImportSpec>),
    Type(Vec<TypeSpec>),
    Func(FuncDecl),
}

/// A parsed or generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub package: String,
    pub decls: Vec<Decl>,
}

impl File {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            decls: Vec::new(),
        }
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Import(specs) => Some(specs),
                _ => None,
            })
            .flatten()
    }

    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Type(specs) => Some(specs),
                _ => None,
            })
            .flatten()
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }
}

/// Last `/`-separated segment of an import path
pub fn last_segment(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}
