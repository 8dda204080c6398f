//! Response inference: read each route's handler dispatch method and derive
//! the set of HTTP statuses it can produce.
//!
//! Success helpers are recognized by name (`ok`, `no_content`, `accepted`).
//! The two-argument error helper carries its status directly, as an integer
//! literal or a named constant. The one-argument form takes a built error
//! value, so the walker follows the construction transitively: a direct
//! `RequestError::new(...)` terminates the search, and calls into resolvable
//! functions are walked with a per-pass memo and a depth bound. Anything the
//! walker cannot see through is an inference gap — the route simply gets no
//! entry for it, never an error.

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::discover::{DISPATCH_METHOD, HANDLER_TRAIT};
use crate::model::{walk_body, Expr, FnDecl, Program, SymbolIndex};
use crate::resolve::ResolvedRoute;

/// Success helper name to the status it produces.
static RESPONSE_OPS: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    HashMap::from([("ok", 200), ("no_content", 204), ("accepted", 202)])
});

/// Named status constants, mirroring the runtime `status` module.
static STATUS_NAMES: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    HashMap::from([
        ("OK", 200),
        ("CREATED", 201),
        ("ACCEPTED", 202),
        ("NO_CONTENT", 204),
        ("BAD_REQUEST", 400),
        ("UNAUTHORIZED", 401),
        ("PAYMENT_REQUIRED", 402),
        ("FORBIDDEN", 403),
        ("NOT_FOUND", 404),
        ("METHOD_NOT_ALLOWED", 405),
        ("NOT_ACCEPTABLE", 406),
        ("REQUEST_TIMEOUT", 408),
        ("CONFLICT", 409),
        ("GONE", 410),
        ("PRECONDITION_FAILED", 412),
        ("PAYLOAD_TOO_LARGE", 413),
        ("UNSUPPORTED_MEDIA_TYPE", 415),
        ("UNPROCESSABLE_ENTITY", 422),
        ("TOO_MANY_REQUESTS", 429),
        ("INTERNAL_SERVER_ERROR", 500),
        ("NOT_IMPLEMENTED", 501),
        ("BAD_GATEWAY", 502),
        ("SERVICE_UNAVAILABLE", 503),
        ("GATEWAY_TIMEOUT", 504),
    ])
});

const ERROR_OP: &str = "error";
const ERROR_STATUS_OP: &str = "error_status";
const ERROR_TYPE: &str = "RequestError";

/// Infer and attach the response set for every resolved route.
pub fn attach_responses(
    program: &Program,
    routes: &mut [ResolvedRoute],
    max_call_depth: usize,
) {
    let index = SymbolIndex::build(program);
    let mut walker = Walker {
        index: &index,
        max_call_depth,
        memo: HashMap::new(),
        visiting: HashSet::new(),
    };
    for route in routes.iter_mut() {
        let Some(body) = dispatch_body(&index, route) else {
            debug!(route = route.route.full_name, "no dispatch body found");
            continue;
        };
        route.responses = walker.infer(body);
        debug!(
            route = route.route.full_name,
            statuses = ?route.responses.iter().map(|(s, _)| *s).collect::<Vec<_>>(),
            "responses inferred"
        );
    }
}

/// Locate the handler impl serving this route and return its dispatch body.
fn dispatch_body<'a>(
    index: &SymbolIndex<'a>,
    route: &ResolvedRoute,
) -> Option<&'a [Expr]> {
    let route_decl = index.resolve_type(&route.route.full_name)?;
    let handler_decl = index.resolve_type(&route.handler.type_ref.full_name)?;
    let imp = handler_decl
        .impls
        .iter()
        .filter(|i| i.trait_name == HANDLER_TRAIT)
        .find(|i| {
            i.type_args
                .first()
                .is_some_and(|arg| index.resolves_to(arg, route_decl))
        })?;
    imp.method(DISPATCH_METHOD).map(|m| m.body.as_slice())
}

struct Walker<'a> {
    index: &'a SymbolIndex<'a>,
    max_call_depth: usize,
    /// Callable key to the status its body (transitively) constructs.
    memo: HashMap<String, Option<u16>>,
    visiting: HashSet<String>,
}

impl Walker<'_> {
    /// Collect statuses from one dispatch body, deduplicated by code in
    /// numeric order. The first description for a code wins; inference itself
    /// never produces one, the slot is for downstream documentation.
    fn infer(&mut self, body: &[Expr]) -> Vec<(u16, Option<String>)> {
        let mut calls: Vec<(&str, &[Expr])> = Vec::new();
        walk_body(body, &mut |expr| {
            if let Expr::MethodCall { method, args, .. } = expr {
                calls.push((method.as_str(), args.as_slice()));
            }
        });

        let mut statuses: BTreeMap<u16, Option<String>> = BTreeMap::new();
        for (method, args) in calls {
            let status = if let Some(code) = RESPONSE_OPS.get(method) {
                Some(*code)
            } else if method == ERROR_STATUS_OP {
                args.first().and_then(status_of_expr)
            } else if method == ERROR_OP {
                args.first().and_then(|arg| self.error_status_of(arg, 0))
            } else {
                None
            };
            if let Some(code) = status {
                statuses.entry(code).or_insert(None);
            }
        }
        statuses.into_iter().collect()
    }

    /// Search an error-helper argument for the status it carries, following
    /// calls into resolvable bodies.
    fn error_status_of(&mut self, expr: &Expr, depth: usize) -> Option<u16> {
        match expr {
            Expr::Call { path, args } => {
                if is_error_ctor(path) {
                    return args.first().and_then(status_of_expr);
                }
                if let Some(found) = self.callable_status(path, depth) {
                    return Some(found);
                }
                args.iter().find_map(|a| self.error_status_of(a, depth))
            }
            Expr::StructLit { path, fields } => {
                if path.last().map(String::as_str) == Some(ERROR_TYPE) {
                    if let Some(code) = fields
                        .iter()
                        .find(|(name, _)| name == "status")
                        .and_then(|(_, value)| status_of_expr(value))
                    {
                        return Some(code);
                    }
                }
                fields
                    .iter()
                    .find_map(|(_, value)| self.error_status_of(value, depth))
            }
            _ => expr
                .children()
                .into_iter()
                .find_map(|child| self.error_status_of(child, depth)),
        }
    }

    /// Walk into a called function body, memoized and depth-bounded.
    fn callable_status(&mut self, path: &[String], depth: usize) -> Option<u16> {
        let callable = self.index.resolve_callable(path)?;
        if let Some(known) = self.memo.get(&callable.key) {
            return *known;
        }
        if depth >= self.max_call_depth || self.visiting.contains(&callable.key) {
            // Bound hit or a recursion cycle: treat as a gap, do not poison
            // the memo for shallower call sites.
            return None;
        }
        self.visiting.insert(callable.key.clone());
        let result = self.body_status(callable.decl, depth + 1);
        self.visiting.remove(&callable.key);
        self.memo.insert(callable.key, result);
        result
    }

    fn body_status(&mut self, decl: &FnDecl, depth: usize) -> Option<u16> {
        decl.body
            .iter()
            .find_map(|expr| self.error_status_of(expr, depth))
    }
}

fn is_error_ctor(path: &[String]) -> bool {
    match path {
        [.., ty, method] => ty == ERROR_TYPE && method == "new",
        _ => false,
    }
}

/// A status argument: integer literal in the valid range, or a named
/// constant's trailing path segment.
fn status_of_expr(expr: &Expr) -> Option<u16> {
    match expr {
        Expr::Int(n) if (100..=599).contains(n) => u16::try_from(*n).ok(),
        Expr::Path(segments) => segments
            .last()
            .and_then(|name| STATUS_NAMES.get(name.as_str()))
            .copied(),
        _ => None,
    }
}
