//! Parsing frontend: source tree in, [`Program`] out.
//!
//! Files are parsed with `syn` and folded into the value model. The module
//! path of a declaration is derived from its file path relative to the
//! scanned root (with `mod.rs`/`lib.rs`/`main.rs` naming their directory) and
//! extended by inline `mod` blocks. Impl blocks are collected separately and
//! attached to their target type at the end, so declaration order and file
//! layout do not matter.

use std::path::Path;

use anyhow::{Context, Result};
use quote::ToTokens;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use tracing::debug;
use walkdir::WalkDir;

use super::lower;
use super::types::{
    AttrData, AttrValue, FnDecl, FreeFn, MemberDecl, Program, TraitImpl, TypeDecl, TypeName,
};

/// Parse every `*.rs` file under `root` into one [`Program`].
pub fn load_program(root: &Path) -> Result<Program> {
    let mut builder = ProgramBuilder::default();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to scan {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("rs") {
            continue;
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let namespace = namespace_for(root, path);
        debug!(file = %path.display(), namespace = namespace.join("::"), "scanning source file");
        let file: syn::File = syn::parse_file(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        builder.collect_items(&file.items, &namespace);
    }
    Ok(builder.finish())
}

/// Parse in-memory units: `(module_path, source)` pairs where the module path
/// is `::`-joined (empty string for the crate root). Used by tests and by
/// callers that already hold source text.
pub fn parse_program(units: &[(&str, &str)]) -> Result<Program> {
    let mut builder = ProgramBuilder::default();
    for (module, text) in units {
        let namespace: Vec<String> = module
            .split("::")
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let file: syn::File = syn::parse_file(text).with_context(|| {
            let shown = if module.is_empty() { "<root>" } else { module };
            format!("failed to parse module {shown}")
        })?;
        builder.collect_items(&file.items, &namespace);
    }
    Ok(builder.finish())
}

fn namespace_for(root: &Path, path: &Path) -> Vec<String> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut segments: Vec<String> = rel
        .parent()
        .map(|p| {
            p.components()
                .filter_map(|c| c.as_os_str().to_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if let Some(stem) = rel.file_stem().and_then(|s| s.to_str()) {
        if stem != "mod" && stem != "lib" && stem != "main" {
            segments.push(stem.to_string());
        }
    }
    segments
}

#[derive(Default)]
struct ProgramBuilder {
    types: Vec<TypeDecl>,
    functions: Vec<FreeFn>,
    impls: Vec<PendingImpl>,
}

struct PendingImpl {
    self_name: String,
    namespace: Vec<String>,
    trait_name: Option<String>,
    type_args: Vec<String>,
    methods: Vec<FnDecl>,
}

impl ProgramBuilder {
    fn collect_items(&mut self, items: &[syn::Item], namespace: &[String]) {
        for item in items {
            match item {
                syn::Item::Struct(s) => self.collect_struct(s, namespace),
                syn::Item::Enum(e) => self.types.push(TypeDecl {
                    name: e.ident.to_string(),
                    namespace: namespace.to_vec(),
                    doc: doc_text(&e.attrs),
                    attrs: parse_attrs(&e.attrs),
                    ..TypeDecl::default()
                }),
                syn::Item::Fn(f) => self.functions.push(FreeFn {
                    namespace: namespace.to_vec(),
                    func: FnDecl {
                        name: f.sig.ident.to_string(),
                        body: lower::lower_block(&f.block),
                    },
                }),
                syn::Item::Impl(imp) => self.collect_impl(imp, namespace),
                syn::Item::Mod(m) => {
                    if let Some((_, nested)) = &m.content {
                        let mut inner = namespace.to_vec();
                        inner.push(m.ident.to_string());
                        self.collect_items(nested, &inner);
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_struct(&mut self, s: &syn::ItemStruct, namespace: &[String]) {
        let members = match &s.fields {
            syn::Fields::Named(named) => named
                .named
                .iter()
                .filter_map(|f| {
                    let name = f.ident.as_ref()?.to_string();
                    Some(MemberDecl {
                        name,
                        ty: type_name(&f.ty),
                        attrs: parse_attrs(&f.attrs),
                        doc: doc_text(&f.attrs),
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        self.types.push(TypeDecl {
            name: s.ident.to_string(),
            namespace: namespace.to_vec(),
            doc: doc_text(&s.attrs),
            attrs: parse_attrs(&s.attrs),
            members,
            impls: Vec::new(),
            methods: Vec::new(),
        });
    }

    fn collect_impl(&mut self, imp: &syn::ItemImpl, namespace: &[String]) {
        let syn::Type::Path(self_path) = imp.self_ty.as_ref() else {
            return;
        };
        let Some(self_name) = self_path.path.segments.last().map(|s| s.ident.to_string())
        else {
            return;
        };
        let (trait_name, type_args) = match &imp.trait_ {
            Some((_, path, _)) => {
                let Some(last) = path.segments.last() else {
                    return;
                };
                let args = match &last.arguments {
                    syn::PathArguments::AngleBracketed(a) => a
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            syn::GenericArgument::Type(t) => Some(type_text(t)),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                (Some(last.ident.to_string()), args)
            }
            None => (None, Vec::new()),
        };
        let methods = imp
            .items
            .iter()
            .filter_map(|item| match item {
                syn::ImplItem::Fn(f) => Some(FnDecl {
                    name: f.sig.ident.to_string(),
                    body: lower::lower_block(&f.block),
                }),
                _ => None,
            })
            .collect();
        self.impls.push(PendingImpl {
            self_name,
            namespace: namespace.to_vec(),
            trait_name,
            type_args,
            methods,
        });
    }

    fn finish(self) -> Program {
        let ProgramBuilder {
            mut types,
            functions,
            impls,
        } = self;
        for pending in impls {
            let Some(target) = find_target(&mut types, &pending.self_name, &pending.namespace)
            else {
                // Impl for a type outside the scanned tree; nothing to attach to.
                debug!(target = pending.self_name, "skipping impl for unknown type");
                continue;
            };
            match pending.trait_name {
                Some(trait_name) => target.impls.push(TraitImpl {
                    trait_name,
                    type_args: pending.type_args,
                    methods: pending.methods,
                }),
                None => target.methods.extend(pending.methods),
            }
        }
        Program { types, functions }
    }
}

/// Pick the declaration an impl block targets: same module first, then a
/// unique name match anywhere.
fn find_target<'a>(
    types: &'a mut [TypeDecl],
    name: &str,
    namespace: &[String],
) -> Option<&'a mut TypeDecl> {
    let mut same_ns = None;
    let mut by_name = Vec::new();
    for (idx, ty) in types.iter().enumerate() {
        if ty.name == name {
            if ty.namespace == namespace {
                same_ns = Some(idx);
            }
            by_name.push(idx);
        }
    }
    let idx = same_ns.or_else(|| by_name.first().copied())?;
    types.get_mut(idx)
}

/// Join `#[doc]` attribute lines the way rustdoc sees them.
fn doc_text(attrs: &[syn::Attribute]) -> String {
    let mut lines = Vec::new();
    for attr in attrs {
        if let syn::Meta::NameValue(nv) = &attr.meta {
            if nv.path.is_ident("doc") {
                if let syn::Expr::Lit(lit) = &nv.value {
                    if let syn::Lit::Str(s) = &lit.lit {
                        let raw = s.value();
                        lines.push(raw.strip_prefix(' ').unwrap_or(&raw).to_string());
                    }
                }
            }
        }
    }
    lines.join("\n")
}

fn parse_attrs(attrs: &[syn::Attribute]) -> Vec<AttrData> {
    let mut out = Vec::new();
    for attr in attrs {
        let Some(name) = attr.path().segments.last().map(|s| s.ident.to_string()) else {
            continue;
        };
        if name == "doc" {
            continue;
        }
        match &attr.meta {
            syn::Meta::Path(_) => out.push(AttrData {
                name,
                ..AttrData::default()
            }),
            syn::Meta::NameValue(nv) => {
                let positional = attr_value_of_expr(&nv.value).into_iter().collect();
                out.push(AttrData {
                    name,
                    positional,
                    named: Vec::new(),
                });
            }
            syn::Meta::List(_) => {
                let parsed =
                    attr.parse_args_with(Punctuated::<ArgToken, syn::Token![,]>::parse_terminated);
                match parsed {
                    Ok(tokens) => {
                        let mut data = AttrData {
                            name,
                            ..AttrData::default()
                        };
                        for token in tokens {
                            match token {
                                ArgToken::Positional(v) => data.positional.push(v),
                                ArgToken::Named(n, v) => data.named.push((n, v)),
                            }
                        }
                        out.push(data);
                    }
                    Err(_) => {
                        // Unparseable argument list: keep the bare attribute so
                        // resolution can still report what is missing.
                        debug!(attr = name, "could not parse attribute arguments");
                        out.push(AttrData {
                            name,
                            ..AttrData::default()
                        });
                    }
                }
            }
        }
    }
    out
}

enum ArgToken {
    Positional(AttrValue),
    Named(String, AttrValue),
}

impl Parse for ArgToken {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        if input.peek(syn::Ident) && input.peek2(syn::Token![=]) {
            let ident: syn::Ident = input.parse()?;
            let _eq: syn::Token![=] = input.parse()?;
            Ok(ArgToken::Named(ident.to_string(), parse_value(input)?))
        } else {
            Ok(ArgToken::Positional(parse_value(input)?))
        }
    }
}

fn parse_value(input: ParseStream<'_>) -> syn::Result<AttrValue> {
    if input.peek(syn::LitStr) {
        let lit: syn::LitStr = input.parse()?;
        Ok(AttrValue::Str(lit.value()))
    } else if input.peek(syn::LitInt) {
        let lit: syn::LitInt = input.parse()?;
        Ok(AttrValue::Int(lit.base10_parse()?))
    } else if input.peek(syn::LitBool) {
        let lit: syn::LitBool = input.parse()?;
        Ok(AttrValue::Bool(lit.value()))
    } else {
        let path: syn::Path = input.parse()?;
        let joined = path
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect::<Vec<_>>()
            .join("::");
        Ok(AttrValue::Ident(joined))
    }
}

fn attr_value_of_expr(expr: &syn::Expr) -> Option<AttrValue> {
    match expr {
        syn::Expr::Lit(lit) => match &lit.lit {
            syn::Lit::Str(s) => Some(AttrValue::Str(s.value())),
            syn::Lit::Int(i) => i.base10_parse().ok().map(AttrValue::Int),
            syn::Lit::Bool(b) => Some(AttrValue::Bool(b.value())),
            _ => None,
        },
        _ => None,
    }
}

/// Space-free token rendering of a type (`Vec<String>`, `Option<i64>`).
fn type_text(ty: &syn::Type) -> String {
    let mut text = ty.to_token_stream().to_string();
    text.retain(|c| c != ' ');
    text
}

fn type_name(ty: &syn::Type) -> TypeName {
    let text = type_text(ty);
    match split_option(&text) {
        Some(inner) => TypeName::new(inner, true),
        None => TypeName::new(text, false),
    }
}

/// Peel `Option<...>` (optionally path-qualified) off a rendered type.
fn split_option(text: &str) -> Option<&str> {
    let idx = text.find("Option<")?;
    let at_path_position = idx == 0 || text.as_bytes().get(idx - 1) == Some(&b':');
    if !at_path_position {
        return None;
    }
    text[idx + "Option<".len()..].strip_suffix('>')
}
