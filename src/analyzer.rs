//! Static checks over the candidate sets, reported as diagnostics.
//!
//! These rules run alongside resolution but are independent of it: they flag
//! code that resolves fine yet behaves badly at runtime. A handler that can
//! abort the process takes the whole host down with it, and a form-bound
//! route member without a source attribute binds nothing and silently keeps
//! its default.

use std::collections::BTreeSet;

use crate::diagnostics::Diagnostic;
use crate::discover::{Candidates, HandlerCandidate, DISPATCH_METHOD};
use crate::model::{walk_body, Expr, MemberDecl, TypeDecl};
use crate::resolve::{AUTH_MEMBER, FETCH_ATTRS};
use crate::runtime::FetchSource;

/// Macros that unwind or abort instead of returning an outcome.
const PANIC_MACROS: [&str; 4] = ["panic", "todo", "unimplemented", "unreachable"];

/// Methods that panic on the failure case they are hiding.
const PANIC_METHODS: [&str; 2] = ["unwrap", "expect"];

/// Run every rule over the discovered candidates.
#[must_use]
pub fn analyze(candidates: &Candidates<'_>) -> Vec<Diagnostic> {
    let mut issues = Vec::new();
    for handler in &candidates.handlers {
        check_handler_panics(handler, &mut issues);
    }
    for route in &candidates.routes {
        check_form_members(route, &mut issues);
    }
    issues
}

/// A dispatch body that reaches `panic!` or `unwrap()` aborts the request
/// thread instead of producing a response. Each offending name is reported
/// once per handler.
fn check_handler_panics(handler: &HandlerCandidate<'_>, issues: &mut Vec<Diagnostic>) {
    let Some(method) = handler.imp.method(DISPATCH_METHOD) else {
        return;
    };
    let mut found: BTreeSet<String> = BTreeSet::new();
    walk_body(&method.body, &mut |expr| match expr {
        Expr::MacroCall { name } if PANIC_MACROS.contains(&name.as_str()) => {
            found.insert(format!("{name}!"));
        }
        Expr::MethodCall { method, .. } if PANIC_METHODS.contains(&method.as_str()) => {
            found.insert(format!("{method}()"));
        }
        _ => {}
    });
    for name in found {
        issues.push(
            Diagnostic::error(
                format!("handler:{}", handler.decl.full_name()),
                "handler_may_panic",
                format!(
                    "handler `{}` can abort dispatch through `{name}`",
                    handler.decl.name
                ),
            )
            .with_suggestion("return an error outcome instead of panicking"),
        );
    }
}

/// Within a form-bound route, a bindable member without any source attribute
/// is skipped by binding and keeps its default value.
fn check_form_members(route: &TypeDecl, issues: &mut Vec<Diagnostic>) {
    let has_source =
        |member: &MemberDecl| FETCH_ATTRS.iter().any(|(attr, _)| member.has_attr(attr));
    let form_attr = FETCH_ATTRS
        .iter()
        .find(|(_, source)| *source == FetchSource::Form)
        .map(|(attr, _)| *attr)
        .unwrap_or_default();

    let form_bound = route.members.iter().any(|m| m.has_attr(form_attr));
    if !form_bound {
        return;
    }
    for member in &route.members {
        if member.name == AUTH_MEMBER || has_source(member) {
            continue;
        }
        issues.push(
            Diagnostic::warning(
                format!("route:{}", route.full_name()),
                "form_member_missing_source",
                format!(
                    "member `{}` of form-bound route `{}` has no source attribute and will not bind",
                    member.name, route.name
                ),
            )
            .with_suggestion(format!("annotate it with `#[{form_attr}]`")),
        );
    }
}
