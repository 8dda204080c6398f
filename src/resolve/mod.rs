//! Binding resolution: turn route candidates into [`ResolvedRoute`] records.
//!
//! Resolution is where the loose candidate sets become a coherent picture per
//! route: attribute arguments, the matching handler and validator, every
//! bindable member with its wire name and fetch source, documentation, body
//! kind, and the auth requirements. A route that cannot be resolved yields
//! diagnostics and is skipped; the rest of the batch is unaffected.
//!
//! Every output record is an owned value with structural equality. Nothing
//! here keeps a reference into the declaration model, so resolved sets from
//! two passes over the same sources compare equal.

mod docs;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::diagnostics::Diagnostic;
use crate::discover::{Candidates, HandlerCandidate, PREPARE_TRAIT, ROUTE_ATTR};
use crate::model::{Program, SymbolIndex, TypeDecl, TypeName};
use crate::names;
use crate::runtime::{BodyKind, FetchSource, Method};

pub use docs::DocComment;

/// Member attribute names, in the order they are probed.
pub const FETCH_ATTRS: [(&str, FetchSource); 4] = [
    ("from_route", FetchSource::Route),
    ("from_query", FetchSource::Query),
    ("from_header", FetchSource::Header),
    ("from_form", FetchSource::Form),
];

const HIDDEN_ATTR: &str = "hidden";

/// Route member reserved for the authenticated-user id; machinery, not a
/// bindable member.
pub const AUTH_MEMBER: &str = "authenticated_user_id";

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\{([^}:]+)[^}]*\}").expect("placeholder pattern is valid")
});

/// Reference to a declared type, carried by name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub simple_name: String,
    pub full_name: String,
    pub crate_path: String,
}

impl TypeRef {
    fn from_decl(decl: &TypeDecl) -> Self {
        Self {
            simple_name: decl.name.clone(),
            full_name: decl.full_name(),
            crate_path: decl.crate_path(),
        }
    }
}

/// A bindable member of a route declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyBinding {
    pub declared_name: String,
    pub wire_name: String,
    pub ty: TypeName,
    pub fetch: FetchSource,
    pub summary: String,
    pub hidden: bool,
}

impl PropertyBinding {
    /// A member is required unless its declared type is `Option<_>`.
    #[must_use]
    pub fn required(&self) -> bool {
        !self.ty.optional
    }

    #[must_use]
    pub fn is_form_file(&self) -> bool {
        self.fetch == FetchSource::Form && (self.ty.is_file() || self.ty.is_file_vec())
    }
}

/// The matched handler for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerBinding {
    pub type_ref: TypeRef,
    /// Display name of the response type argument, or `NoBody`.
    pub response_type: String,
}

/// Everything emission needs to know about one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub route: TypeRef,
    pub template: String,
    pub method: Method,
    pub docs: DocComment,
    pub body: BodyKind,
    pub members: Vec<PropertyBinding>,
    pub handler: HandlerBinding,
    pub validator: Option<TypeRef>,
    pub requires_auth: bool,
    pub auth_policy: String,
    pub has_prepare: bool,
    /// Status code to optional description, numeric order. Populated by
    /// response inference after resolution.
    pub responses: Vec<(u16, Option<String>)>,
}

impl ResolvedRoute {
    /// Auth machinery applies when the flag is set or a policy is named.
    #[must_use]
    pub fn auth_active(&self) -> bool {
        self.requires_auth || !self.auth_policy.is_empty()
    }

    /// Any member binding from form data makes the whole route form-bound.
    #[must_use]
    pub fn reads_form(&self) -> bool {
        self.members.iter().any(|m| m.fetch == FetchSource::Form)
    }
}

/// Resolve every route candidate. Failures surface as diagnostics; the
/// returned set holds only the routes that resolved cleanly.
pub fn resolve_routes(
    program: &Program,
    candidates: &Candidates<'_>,
) -> (Vec<ResolvedRoute>, Vec<Diagnostic>) {
    let index = SymbolIndex::build(program);
    let mut resolved = Vec::with_capacity(candidates.routes.len());
    let mut issues = Vec::new();
    let mut seen: HashSet<(String, Method)> = HashSet::new();

    for decl in &candidates.routes {
        match resolve_route(decl, candidates, &index, &mut issues) {
            Some(route) => {
                let key = (route.template.clone(), route.method);
                if !seen.insert(key) {
                    issues.push(
                        Diagnostic::error(
                            route_location(decl),
                            "duplicate_route",
                            format!(
                                "route template `{}` with method {} is already registered",
                                route.template, route.method
                            ),
                        )
                        .with_suggestion("change the template or the method"),
                    );
                    continue;
                }
                debug!(route = route.route.full_name, template = route.template, "route resolved");
                resolved.push(route);
            }
            None => {
                debug!(route = decl.full_name(), "route skipped");
            }
        }
    }
    (resolved, issues)
}

fn route_location(decl: &TypeDecl) -> String {
    format!("route:{}", decl.full_name())
}

fn resolve_route(
    decl: &TypeDecl,
    candidates: &Candidates<'_>,
    index: &SymbolIndex<'_>,
    issues: &mut Vec<Diagnostic>,
) -> Option<ResolvedRoute> {
    let attr = decl.attr(ROUTE_ATTR)?;

    let Some(template) = attr.positional.first().and_then(|v| v.as_str()) else {
        issues.push(Diagnostic::error(
            route_location(decl),
            "invalid_route_attribute",
            "route attribute needs a template string as its first argument",
        ));
        return None;
    };
    let method = match attr
        .positional
        .get(1)
        .and_then(|v| v.as_ident())
        .and_then(Method::from_ident)
    {
        Some(m) => m,
        None => {
            issues.push(Diagnostic::error(
                route_location(decl),
                "invalid_route_attribute",
                "route attribute needs an HTTP method as its second argument",
            ));
            return None;
        }
    };

    let requires_auth = attr.flag("require_auth");
    let auth_policy = attr.named_str("auth_policy").unwrap_or("").to_string();
    let auth_active = requires_auth || !auth_policy.is_empty();

    if auth_active && !has_auth_member(decl) {
        issues.push(
            Diagnostic::error(
                route_location(decl),
                "missing_auth_member",
                format!(
                    "authenticated route must declare a `{AUTH_MEMBER}: String` member"
                ),
            )
            .with_suggestion(format!("add `pub {AUTH_MEMBER}: String` to the declaration")),
        );
        return None;
    }

    let handler = match_handler(decl, candidates, index, issues)?;

    let validator = candidates
        .validators
        .iter()
        .find(|v| {
            v.imp
                .type_args
                .first()
                .is_some_and(|arg| arg_matches(index, arg, decl))
        })
        .map(|v| TypeRef::from_decl(v.decl));

    let members = resolve_members(decl, auth_active);
    check_template_params(decl, template, &members, issues);

    let body = if members.iter().any(|m| m.fetch == FetchSource::Form) {
        BodyKind::Form
    } else if matches!(
        method,
        Method::Post | Method::Put | Method::Delete | Method::Patch
    ) {
        BodyKind::Json
    } else {
        BodyKind::None
    };

    Some(ResolvedRoute {
        route: TypeRef::from_decl(decl),
        template: template.to_string(),
        method,
        docs: DocComment::parse(&decl.doc),
        body,
        members,
        handler,
        validator,
        requires_auth,
        auth_policy,
        has_prepare: decl.has_trait_impl(PREPARE_TRAIT),
        responses: Vec::new(),
    })
}

fn has_auth_member(decl: &TypeDecl) -> bool {
    decl.members
        .iter()
        .any(|m| m.name == AUTH_MEMBER && m.ty.is_string() && !m.ty.optional)
}

/// A trait type argument matches when it resolves to the route declaration
/// itself.
fn arg_matches(index: &SymbolIndex<'_>, arg: &str, decl: &TypeDecl) -> bool {
    index.resolves_to(arg, decl)
}

fn match_handler(
    decl: &TypeDecl,
    candidates: &Candidates<'_>,
    index: &SymbolIndex<'_>,
    issues: &mut Vec<Diagnostic>,
) -> Option<HandlerBinding> {
    let matches: Vec<&HandlerCandidate<'_>> = candidates
        .handlers
        .iter()
        .filter(|h| {
            h.imp
                .type_args
                .first()
                .is_some_and(|arg| arg_matches(index, arg, decl))
        })
        .collect();
    match matches.as_slice() {
        [] => {
            issues.push(
                Diagnostic::error(
                    route_location(decl),
                    "missing_handler",
                    format!("no handler found for route `{}`", decl.full_name()),
                )
                .with_suggestion(format!(
                    "implement `Handler<{}>` for a concrete type",
                    decl.name
                )),
            );
            None
        }
        [only] => {
            let response_type = only
                .imp
                .type_args
                .get(1)
                .map(|arg| {
                    index
                        .resolve_type_name(arg)
                        .unwrap_or_else(|| arg.clone())
                })
                .unwrap_or_else(|| "NoBody".to_string());
            Some(HandlerBinding {
                type_ref: TypeRef::from_decl(only.decl),
                response_type,
            })
        }
        many => {
            let names: Vec<&str> = many.iter().map(|h| h.decl.name.as_str()).collect();
            issues.push(Diagnostic::error(
                route_location(decl),
                "ambiguous_handler",
                format!(
                    "route `{}` matches {} handlers: {}",
                    decl.full_name(),
                    names.len(),
                    names.join(", ")
                ),
            ));
            None
        }
    }
}

fn resolve_members(decl: &TypeDecl, auth_active: bool) -> Vec<PropertyBinding> {
    decl.members
        .iter()
        .filter(|m| !(auth_active && m.name == AUTH_MEMBER))
        .map(|m| {
            let mut fetch = FetchSource::None;
            let mut explicit_name: Option<String> = None;
            for (attr_name, source) in FETCH_ATTRS {
                if let Some(attr) = m.attr(attr_name) {
                    fetch = source;
                    explicit_name = attr.named_str("name").map(str::to_string);
                    break;
                }
            }
            let wire_name =
                explicit_name.unwrap_or_else(|| names::wire_camel(&m.name));
            PropertyBinding {
                declared_name: m.name.clone(),
                wire_name,
                ty: m.ty.clone(),
                fetch,
                summary: DocComment::parse(&m.doc).summary,
                hidden: m.has_attr(HIDDEN_ATTR),
            }
        })
        .collect()
}

/// Route-sourced members should correspond to a `{placeholder}` in the
/// template; a mismatch binds nothing at runtime.
fn check_template_params(
    decl: &TypeDecl,
    template: &str,
    members: &[PropertyBinding],
    issues: &mut Vec<Diagnostic>,
) {
    let placeholders: HashSet<&str> = PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    for member in members {
        if member.fetch == FetchSource::Route && !placeholders.contains(member.wire_name.as_str())
        {
            issues.push(
                Diagnostic::warning(
                    route_location(decl),
                    "route_param_not_in_template",
                    format!(
                        "member `{}` binds from the route but `{{{}}}` is not in template `{}`",
                        member.declared_name, member.wire_name, template
                    ),
                )
                .with_suggestion("add the placeholder to the template or change the source"),
            );
        }
    }
}
