//! Value-semantic declaration model.
//!
//! Everything the later stages look at is captured here as plain owned data:
//! no references into `syn` trees, structural equality everywhere, cheap to
//! clone and compare across passes. The parsing frontend fills these in; the
//! [`SymbolIndex`] is rebuilt on demand from a [`Program`] and never stored
//! inside the records themselves.

use std::collections::HashMap;

use crate::names;

/// All declarations collected from a source tree for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub types: Vec<TypeDecl>,
    pub functions: Vec<FreeFn>,
}

/// A free function with the module path it was declared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeFn {
    pub namespace: Vec<String>,
    pub func: FnDecl,
}

/// A struct or enum declaration plus everything attached to it: attributes,
/// named fields, trait impls, and inherent methods (impl blocks are folded in
/// regardless of which file they appeared in).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub namespace: Vec<String>,
    pub doc: String,
    pub attrs: Vec<AttrData>,
    pub members: Vec<MemberDecl>,
    pub impls: Vec<TraitImpl>,
    pub methods: Vec<FnDecl>,
}

impl TypeDecl {
    /// `ns::ns::Name` display form.
    #[must_use]
    pub fn full_name(&self) -> String {
        names::full_name(&self.namespace, &self.name)
    }

    /// Emission-side path (`crate::ns::Name`).
    #[must_use]
    pub fn crate_path(&self) -> String {
        names::crate_path(&self.namespace, &self.name)
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&AttrData> {
        self.attrs.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// First impl of the named trait, if any.
    #[must_use]
    pub fn trait_impl(&self, trait_name: &str) -> Option<&TraitImpl> {
        self.impls.iter().find(|i| i.trait_name == trait_name)
    }

    #[must_use]
    pub fn has_trait_impl(&self, trait_name: &str) -> bool {
        self.trait_impl(trait_name).is_some()
    }

    /// Inherent method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&FnDecl> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A parsed attribute: `#[api_route("/pets/{id}", GET, auth_policy = "p")]`
/// becomes name `api_route`, two positional values, one named value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrData {
    pub name: String,
    pub positional: Vec<AttrValue>,
    pub named: Vec<(String, AttrValue)>,
}

impl AttrData {
    #[must_use]
    pub fn named_value(&self, name: &str) -> Option<&AttrValue> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// A named flag counts as set when present bare or as `name = true`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        match self.named_value(name) {
            Some(AttrValue::Bool(b)) => *b,
            Some(_) => true,
            None => self
                .positional
                .iter()
                .any(|v| matches!(v, AttrValue::Ident(i) if i == name)),
        }
    }

    #[must_use]
    pub fn named_str(&self, name: &str) -> Option<&str> {
        match self.named_value(name) {
            Some(AttrValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A literal or identifier appearing in an attribute argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Int(u64),
    Bool(bool),
    Ident(String),
}

impl AttrValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            AttrValue::Ident(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A named field of a struct declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    pub name: String,
    pub ty: TypeName,
    pub attrs: Vec<AttrData>,
    pub doc: String,
}

impl MemberDecl {
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&AttrData> {
        self.attrs.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

/// A declared type with `Option<_>` peeled off into the `optional` flag.
/// `display` is the space-free token rendering of the remaining type
/// (`String`, `i64`, `Vec<String>`, `UploadedFile`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub display: String,
    pub optional: bool,
}

impl TypeName {
    #[must_use]
    pub fn new(display: impl Into<String>, optional: bool) -> Self {
        Self {
            display: display.into(),
            optional,
        }
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        self.display == "String"
    }

    #[must_use]
    pub fn is_string_vec(&self) -> bool {
        self.display == "Vec<String>"
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.last_segment() == "UploadedFile"
    }

    #[must_use]
    pub fn is_file_vec(&self) -> bool {
        self.display.starts_with("Vec<") && self.display.ends_with("UploadedFile>")
    }

    fn last_segment(&self) -> &str {
        self.display.rsplit("::").next().unwrap_or(&self.display)
    }
}

/// A trait implementation attached to a type: trait name, type arguments as
/// written at the impl site, and the methods the impl provides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitImpl {
    pub trait_name: String,
    pub type_args: Vec<String>,
    pub methods: Vec<FnDecl>,
}

impl TraitImpl {
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&FnDecl> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A function with its lowered body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FnDecl {
    pub name: String,
    pub body: Vec<Expr>,
}

/// Lowered expression IR.
///
/// Only the node shapes the pipeline inspects are modeled; all other
/// expression forms flatten into [`Expr::Other`] with their child expressions
/// preserved, so a descendant walk still sees every nested call the way the
/// original syntax tree would show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `recv.method(args...)`
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// `path::to::fn(args...)`
    Call { path: Vec<String>, args: Vec<Expr> },
    /// `path::to::Type { field: expr, ... }`
    StructLit {
        path: Vec<String>,
        fields: Vec<(String, Expr)>,
    },
    /// `name!(...)` — body tokens are not lowered, only the name is kept.
    MacroCall { name: String },
    Path(Vec<String>),
    Int(u64),
    Str(String),
    /// Any other expression form, flattened to its children.
    Other(Vec<Expr>),
}

impl Expr {
    /// Direct children, in source order.
    #[must_use]
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::MethodCall {
                receiver, args, ..
            } => std::iter::once(receiver.as_ref()).chain(args.iter()).collect(),
            Expr::Call { args, .. } => args.iter().collect(),
            Expr::StructLit { fields, .. } => fields.iter().map(|(_, e)| e).collect(),
            Expr::Other(children) => children.iter().collect(),
            Expr::MacroCall { .. } | Expr::Path(_) | Expr::Int(_) | Expr::Str(_) => Vec::new(),
        }
    }

    /// Depth-first visit of this node and every descendant.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Expr)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

/// Depth-first visit over a whole lowered body.
pub fn walk_body<'a>(body: &'a [Expr], visit: &mut dyn FnMut(&'a Expr)) {
    for expr in body {
        expr.walk(visit);
    }
}

/// Per-pass lookup over a [`Program`]: types by name and callables by path.
/// Built where needed, dropped with the pass.
pub struct SymbolIndex<'a> {
    types_by_simple: HashMap<&'a str, Vec<&'a TypeDecl>>,
    free_by_simple: HashMap<&'a str, Vec<&'a FreeFn>>,
}

/// A resolved callable: stable key for memoization plus the declaration.
pub struct CallableRef<'a> {
    pub key: String,
    pub decl: &'a FnDecl,
}

impl<'a> SymbolIndex<'a> {
    #[must_use]
    pub fn build(program: &'a Program) -> Self {
        let mut types_by_simple: HashMap<&str, Vec<&TypeDecl>> = HashMap::new();
        for ty in &program.types {
            types_by_simple.entry(ty.name.as_str()).or_default().push(ty);
        }
        let mut free_by_simple: HashMap<&str, Vec<&FreeFn>> = HashMap::new();
        for f in &program.functions {
            free_by_simple
                .entry(f.func.name.as_str())
                .or_default()
                .push(f);
        }
        Self {
            types_by_simple,
            free_by_simple,
        }
    }

    /// Resolve a type reference as written in source (`CreatePet` or
    /// `pets::CreatePet`) to its declaration. Qualified references must match
    /// a suffix of the declared path; bare names must be unambiguous.
    #[must_use]
    pub fn resolve_type(&self, text: &str) -> Option<&'a TypeDecl> {
        let segments: Vec<&str> = text.split("::").collect();
        let simple = *segments.last()?;
        let candidates = self.types_by_simple.get(simple)?;
        if segments.len() == 1 {
            return if candidates.len() == 1 {
                Some(candidates[0])
            } else {
                None
            };
        }
        let matches: Vec<&&TypeDecl> = candidates
            .iter()
            .filter(|ty| path_suffix_matches(&ty.namespace, &segments[..segments.len() - 1]))
            .collect();
        if matches.len() == 1 {
            Some(*matches[0])
        } else {
            None
        }
    }

    /// Resolve a type reference to its full display name.
    #[must_use]
    pub fn resolve_type_name(&self, text: &str) -> Option<String> {
        self.resolve_type(text).map(TypeDecl::full_name)
    }

    /// True when `text` resolves to exactly the given declaration.
    #[must_use]
    pub fn resolves_to(&self, text: &str, decl: &TypeDecl) -> bool {
        self.resolve_type(text)
            .is_some_and(|resolved| std::ptr::eq(resolved, decl))
    }

    /// Resolve a call path to a callable body: `helper` (free fn),
    /// `ns::helper`, `Type::new`, or `ns::Type::new` (inherent method).
    #[must_use]
    pub fn resolve_callable(&self, path: &[String]) -> Option<CallableRef<'a>> {
        let (last, init) = path.split_last()?;
        if !init.is_empty() {
            // A parent segment naming a known type means an inherent method.
            let owner_text = init.join("::");
            if let Some(ty) = self.resolve_type(&owner_text) {
                let decl = ty.method(last)?;
                return Some(CallableRef {
                    key: format!("{}::{}", ty.full_name(), last),
                    decl,
                });
            }
        }
        let candidates = self.free_by_simple.get(last.as_str())?;
        let matches: Vec<&&FreeFn> = if init.is_empty() {
            candidates.iter().collect()
        } else {
            candidates
                .iter()
                .filter(|f| path_suffix_matches(&f.namespace, init_as_strs(init).as_slice()))
                .collect()
        };
        if matches.len() == 1 {
            let f = matches[0];
            Some(CallableRef {
                key: names::full_name(&f.namespace, &f.func.name),
                decl: &f.func,
            })
        } else {
            None
        }
    }

}

fn init_as_strs(init: &[String]) -> Vec<&str> {
    init.iter().map(String::as_str).collect()
}

/// True when `written` matches the tail of `declared`, segment-aligned
/// (`crate::`-style prefixes in `written` are ignored).
fn path_suffix_matches(declared: &[String], written: &[&str]) -> bool {
    let written: Vec<&str> = written
        .iter()
        .copied()
        .filter(|s| *s != "crate" && *s != "self" && *s != "super")
        .collect();
    if written.len() > declared.len() {
        return false;
    }
    declared
        .iter()
        .rev()
        .zip(written.iter().rev())
        .all(|(d, w)| d == w)
}
