//! Code emission: resolved routes in, generated source files out.
//!
//! The writers are pure text producers. They never touch the filesystem, so
//! the same resolved set always yields byte-identical artifacts and tests can
//! assert on contents directly. Four kinds of file make up the generated
//! module:
//!
//! - `routes.rs` - one template constant per route
//! - `route_config.rs` - metadata registry, dispatch functions, mounting
//! - `<route>_auth.rs` - [`AuthenticatedRoute`] impl per authenticated route
//! - `strings.rs` - the interned literals every other artifact references
//!
//! plus a `mod.rs` declaring them. Emission interns strings in a fixed order
//! (route constants first, then the configuration file), so the cache dump is
//! deterministic as well.
//!
//! [`AuthenticatedRoute`]: crate::runtime::AuthenticatedRoute

pub mod strings;
pub mod writer;


use std::collections::{BTreeSet, HashSet};

use crate::names;
use crate::resolve::{PropertyBinding, ResolvedRoute, TypeRef};
use crate::runtime::{BodyKind, FetchSource};

use strings::StringCache;
use writer::{CodeWriter, ScopeBrackets};

/// Header stamped on every artifact so editors and review tooling treat the
/// files as machine-written.
pub const GENERATED_HEADER: &str = "// @generated by preroute. Do not edit.";

/// One emitted file: name relative to the output module directory, plus its
/// full contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub contents: String,
}

/// Emits every artifact for `routes`: the route constants, the route
/// configuration, one auth helper per authenticated route, the interned
/// strings, and the module root tying them together. An empty route set
/// emits nothing.
pub fn emit_artifacts(routes: &[ResolvedRoute], cache: &mut StringCache) -> Vec<GeneratedFile> {
    if routes.is_empty() {
        return Vec::new();
    }
    let plans = plan_routes(routes);
    let mut files = Vec::new();
    files.push(routes_file(&plans, cache));
    files.push(route_config_file(&plans, cache));
    files.extend(auth_files(&plans));
    files.push(strings_file(cache));
    files.push(module_root(&plans));
    files
}

/// Per-route emission names, fixed up front so every artifact agrees on
/// them. Constant names can collide once their `Query`/`Command` suffix is
/// stripped; later routes get a numeric suffix.
struct RoutePlan<'a> {
    route: &'a ResolvedRoute,
    const_name: String,
    dispatch_name: String,
    stem: String,
}

fn plan_routes(routes: &[ResolvedRoute]) -> Vec<RoutePlan<'_>> {
    let mut taken: HashSet<String> = HashSet::new();
    routes
        .iter()
        .map(|route| RoutePlan {
            const_name: claim(&mut taken, names::route_const_name(&route.route.simple_name)),
            dispatch_name: names::dispatch_fn_name(&route.route.crate_path),
            stem: names::artifact_stem(&route.route.crate_path),
            route,
        })
        .collect()
}

fn claim(taken: &mut HashSet<String>, base: String) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{base}_{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// `routes.rs`: one `pub const` per route naming its template.
fn routes_file(plans: &[RoutePlan<'_>], cache: &mut StringCache) -> GeneratedFile {
    let mut w = CodeWriter::new();
    w.line(GENERATED_HEADER);
    w.blank();
    w.line("use super::strings;");
    for plan in plans {
        let reference = cache.add(&plan.route.route.crate_path, &plan.route.template);
        w.blank();
        w.line(format!("/// `{}`", plan.route.route.crate_path));
        w.line(format!(
            "pub const {}: &str = {reference};",
            plan.const_name
        ));
    }
    GeneratedFile {
        name: "routes.rs".to_string(),
        contents: w.finish(),
    }
}

/// `route_config.rs`: the metadata registry, the mount function, and one
/// dispatch function per route.
fn route_config_file(plans: &[RoutePlan<'_>], cache: &mut StringCache) -> GeneratedFile {
    let mut w = CodeWriter::new();
    w.line(GENERATED_HEADER);
    w.blank();
    w.line(format!(
        "use preroute::runtime::{{{}}};",
        runtime_imports(plans)
    ));
    w.blank();
    w.line("use super::routes;");
    w.line("use super::strings;");
    w.blank();

    w.line("/// Metadata for every generated route, in generation order.");
    w.scope("pub fn route_table() -> Vec<RouteMetadata>", |w| {
        w.scope_with("vec!", ScopeBrackets::SQUARE, |w| {
            for plan in plans {
                route_metadata_entry(w, plan, cache);
            }
        });
    });
    w.blank();

    w.line("/// Registers every route on the host, then hands each mounted");
    w.line("/// route's metadata to the filters in registration order.");
    w.scope(
        "pub fn mount_routes(host: &mut dyn RouteHost, filters: &[Box<dyn EndpointFilter>])",
        |w| {
            for plan in plans {
                w.line(format!(
                    "host.register(routes::{}, Method::{}, {});",
                    plan.const_name,
                    plan.route.method.variant(),
                    plan.dispatch_name
                ));
            }
            w.line("let table = route_table();");
            w.scope("for filter in filters", |w| {
                w.scope("for route in &table", |w| {
                    w.line("filter.handle(route);");
                });
            });
        },
    );

    for plan in plans {
        w.blank();
        dispatch_fn(&mut w, plan, cache);
    }

    GeneratedFile {
        name: "route_config.rs".to_string(),
        contents: w.finish(),
    }
}

/// Only the runtime items the emitted file actually uses, so generated code
/// compiles without unused-import warnings.
fn runtime_imports(plans: &[RoutePlan<'_>]) -> String {
    let mut items: BTreeSet<&str> = BTreeSet::from([
        "BodyKind",
        "EndpointFilter",
        "Handler",
        "Method",
        "Outcome",
        "RequestParts",
        "Response",
        "RouteHost",
        "RouteMetadata",
    ]);
    if plans.iter().any(|p| !p.route.members.is_empty()) {
        items.insert("FetchSource");
        items.insert("PropertyMeta");
    }
    if plans.iter().any(|p| p.route.validator.is_some()) {
        items.insert("RequestValidator");
    }
    if plans.iter().any(|p| p.route.has_prepare) {
        items.insert("PrepareRequest");
    }
    items.into_iter().collect::<Vec<_>>().join(", ")
}

fn route_metadata_entry(w: &mut CodeWriter, plan: &RoutePlan<'_>, cache: &mut StringCache) {
    let route = plan.route;
    let template_ref = cache.add(&route.route.crate_path, &route.template);
    w.scope_with("RouteMetadata", ScopeBrackets::BRACE_ITEM, |w| {
        w.line(format!("template: {template_ref},"));
        w.line(format!("method: Method::{},", route.method.variant()));
        w.line(format!("summary: {},", quote_str(&route.docs.summary)));
        w.line(format!("description: {},", quote_str(&route.docs.remarks)));
        w.line(format!("body: BodyKind::{},", route.body.variant()));
        w.line(format!(
            "request_type: {},",
            quote_str(&route.route.crate_path)
        ));
        w.line(format!(
            "response_type: {},",
            quote_str(&route.handler.response_type)
        ));
        w.line(format!(
            "handler_type: {},",
            quote_str(&route.handler.type_ref.crate_path)
        ));
        w.line(format!(
            "validator_type: {},",
            match &route.validator {
                Some(v) => format!("Some({})", quote_str(&v.crate_path)),
                None => "None".to_string(),
            }
        ));
        w.line(format!("requires_auth: {},", route.requires_auth));
        w.line(format!("auth_policy: {},", quote_str(&route.auth_policy)));
        if route.members.is_empty() {
            w.line("properties: vec![],");
        } else {
            w.scope_with("properties: vec!", ScopeBrackets::SQUARE_ITEM, |w| {
                for member in &route.members {
                    property_meta_entry(w, route, member, cache);
                }
            });
        }
        let responses: Vec<String> = route
            .responses
            .iter()
            .map(|(code, desc)| match desc {
                Some(text) => format!("({code}, Some({}))", quote_str(text)),
                None => format!("({code}, None)"),
            })
            .collect();
        w.line(format!("responses: vec![{}],", responses.join(", ")));
    });
}

fn property_meta_entry(
    w: &mut CodeWriter,
    route: &ResolvedRoute,
    member: &PropertyBinding,
    cache: &mut StringCache,
) {
    let name_ref = member_ref(route, member, cache);
    w.scope_with("PropertyMeta", ScopeBrackets::BRACE_ITEM, |w| {
        w.line(format!("name: {name_ref},"));
        w.line(format!("type_name: {},", quote_str(&member.ty.display)));
        w.line(format!("required: {},", member.required()));
        w.line(format!("fetch: FetchSource::{},", member.fetch.variant()));
        w.line(format!("summary: {},", quote_str(&member.summary)));
        w.line(format!("hidden: {},", member.hidden));
    });
}

/// Interns a member's wire name under `<route>_<wire>` and returns the
/// constant reference.
fn member_ref(route: &ResolvedRoute, member: &PropertyBinding, cache: &mut StringCache) -> String {
    cache.add(
        &format!("{}_{}", route.route.crate_path, member.wire_name),
        &member.wire_name,
    )
}

fn dispatch_fn(w: &mut CodeWriter, plan: &RoutePlan<'_>, cache: &mut StringCache) {
    let route = plan.route;
    let bound: Vec<&PropertyBinding> = route
        .members
        .iter()
        .filter(|m| m.fetch != FetchSource::None)
        .collect();
    let uses_parts = !bound.is_empty()
        || route.body == BodyKind::Json
        || route.auth_active()
        || route.has_prepare;
    let parts_name = if uses_parts { "parts" } else { "_parts" };

    w.line(format!("/// Dispatch for `{}`.", route.route.crate_path));
    w.scope(
        format!(
            "pub fn {}({parts_name}: &RequestParts) -> Response",
            plan.dispatch_name
        ),
        |w| {
            if route.reads_form() {
                w.line("let form = parts.form();");
            }
            for member in &bound {
                member_binding(w, route, member, cache);
            }
            if route.reads_form() || !bound.is_empty() {
                w.blank();
            }

            construction(w, route, &bound);
            w.blank();

            if let Some(validator) = &route.validator {
                validation(w, validator);
                w.blank();
            }

            w.line(format!(
                "let handler = {}::default();",
                route.handler.type_ref.crate_path
            ));
            w.scope("match handler.invoke(request)", |w| {
                w.line("Outcome::Success(response) => response,");
                w.line("Outcome::Error(error) => Response::problem(error.status, &error.message),");
            });
        },
    );
}

/// Raw fetch plus conversion for one bound member. Required members that are
/// missing, empty, or unparsable return 400 before anything else runs;
/// optional members collapse those cases to `None`.
fn member_binding(
    w: &mut CodeWriter,
    route: &ResolvedRoute,
    member: &PropertyBinding,
    cache: &mut StringCache,
) {
    let key = member_ref(route, member, cache);
    let n = &member.declared_name;

    if member.is_form_file() {
        if member.ty.is_file_vec() {
            if member.ty.optional {
                w.line(format!(
                    "let {n}_value = Some(form.files({key})).filter(|v| !v.is_empty());"
                ));
            } else {
                w.line(format!("let {n}_value = form.files({key});"));
            }
        } else if member.ty.optional {
            w.line(format!("let {n}_value = form.file({key}).cloned();"));
        } else {
            w.scope_with(
                format!("let Some({n}_value) = form.file({key}).cloned() else"),
                ScopeBrackets::BRACE_STMT,
                |w| w.line("return Response::bad_request();"),
            );
        }
        return;
    }

    if member.ty.is_string_vec() {
        if member.fetch == FetchSource::Query {
            if member.ty.optional {
                w.line(format!(
                    "let {n}_value = Some(parts.query_values({key})).filter(|v| !v.is_empty());"
                ));
            } else {
                w.line(format!("let {n}_value = parts.query_values({key});"));
                w.scope(format!("if {n}_value.is_empty()"), |w| {
                    w.line("return Response::bad_request();");
                });
            }
        } else {
            // Single-valued sources still fill a list member, with at most
            // one element.
            let fetch = fetch_expr(member.fetch, &key);
            if member.ty.optional {
                w.line(format!(
                    "let {n}_value = {fetch}.map(|raw| vec![raw]);"
                ));
            } else {
                w.line(format!(
                    "let {n}_value: Vec<String> = {fetch}.into_iter().collect();"
                ));
                w.scope(format!("if {n}_value.is_empty()"), |w| {
                    w.line("return Response::bad_request();");
                });
            }
        }
        return;
    }

    let fetch = fetch_expr(member.fetch, &key);
    if member.ty.is_string() {
        if member.ty.optional {
            w.line(format!("let {n}_value = {fetch};"));
        } else {
            w.line(format!("let {n}_raw = {fetch};"));
            w.scope_with(
                format!("let Some({n}_value) = {n}_raw.filter(|raw| !raw.is_empty()) else"),
                ScopeBrackets::BRACE_STMT,
                |w| w.line("return Response::bad_request();"),
            );
        }
        return;
    }

    let ty = &member.ty.display;
    w.line(format!("let {n}_raw = {fetch};"));
    if member.ty.optional {
        w.line(format!(
            "let {n}_value = {n}_raw.filter(|raw| !raw.is_empty()).and_then(|raw| raw.parse::<{ty}>().ok());"
        ));
    } else {
        w.scope_with(
            format!("let Some({n}_text) = {n}_raw.filter(|raw| !raw.is_empty()) else"),
            ScopeBrackets::BRACE_STMT,
            |w| w.line("return Response::bad_request();"),
        );
        w.scope_with(
            format!("let Ok({n}_value) = {n}_text.parse::<{ty}>() else"),
            ScopeBrackets::BRACE_STMT,
            |w| w.line("return Response::bad_request();"),
        );
    }
}

fn fetch_expr(fetch: FetchSource, key: &str) -> String {
    match fetch {
        FetchSource::Route => format!("parts.route_value({key}).map(str::to_string)"),
        FetchSource::Query => format!("parts.query_value({key}).map(str::to_string)"),
        FetchSource::Header => format!("parts.header_value({key}).map(str::to_string)"),
        FetchSource::Form => format!("form.value({key}).map(str::to_string)"),
        FetchSource::None => String::new(),
    }
}

/// Builds the request value: deserialized from the JSON body with fetched
/// members assigned over it, or a struct literal for body-less and form
/// routes. Prepare and the authenticated-user assignment follow in that
/// order.
fn construction(w: &mut CodeWriter, route: &ResolvedRoute, bound: &[&PropertyBinding]) {
    let ty = &route.route.crate_path;
    match route.body {
        BodyKind::Json => {
            let needs_mut =
                !bound.is_empty() || (route.auth_active() && !route.has_prepare);
            let pat = if needs_mut { "mut request" } else { "request" };
            w.scope_with(
                format!("let Some({pat}) = parts.json_body::<{ty}>() else"),
                ScopeBrackets::BRACE_STMT,
                |w| w.line("return Response::bad_request();"),
            );
            for member in bound {
                w.line(format!(
                    "request.{} = {}_value;",
                    member.declared_name, member.declared_name
                ));
            }
        }
        BodyKind::None | BodyKind::Form => {
            let needs_mut = route.auth_active() && !route.has_prepare;
            let kw = if needs_mut {
                "let mut request"
            } else {
                "let request"
            };
            let needs_default = route.auth_active()
                || route.members.iter().any(|m| m.fetch == FetchSource::None);
            if bound.is_empty() {
                if needs_default {
                    w.line(format!("{kw} = {ty} {{ ..Default::default() }};"));
                } else {
                    w.line(format!("{kw} = {ty} {{}};"));
                }
            } else {
                w.scope_with(format!("{kw} = {ty}"), ScopeBrackets::BRACE_STMT, |w| {
                    for member in bound {
                        w.line(format!(
                            "{}: {}_value,",
                            member.declared_name, member.declared_name
                        ));
                    }
                    if needs_default {
                        w.line("..Default::default()");
                    }
                });
            }
        }
    }
    if route.has_prepare {
        let kw = if route.auth_active() {
            "let mut request"
        } else {
            "let request"
        };
        w.line(format!("{kw} = request.prepare(parts);"));
    }
    if route.auth_active() {
        w.line("request.authenticated_user_id = parts.current_user_id();");
    }
}

fn validation(w: &mut CodeWriter, validator: &TypeRef) {
    w.line(format!("let validator = {}::default();", validator.crate_path));
    w.line("let errors = validator.validate(&request);");
    w.scope("if !errors.is_empty()", |w| {
        w.line("return Response::validation_problem(errors);");
    });
}

/// One `<route>_auth.rs` per authenticated route, exposing the
/// authenticated-user member through the runtime trait.
fn auth_files(plans: &[RoutePlan<'_>]) -> Vec<GeneratedFile> {
    plans
        .iter()
        .filter(|p| p.route.auth_active())
        .map(|plan| {
            let mut w = CodeWriter::new();
            w.line(GENERATED_HEADER);
            w.blank();
            w.line("use preroute::runtime::AuthenticatedRoute;");
            w.blank();
            w.scope(
                format!(
                    "impl AuthenticatedRoute for {}",
                    plan.route.route.crate_path
                ),
                |w| {
                    w.scope("fn set_authenticated_user_id(&mut self, value: String)", |w| {
                        w.line("self.authenticated_user_id = value;");
                    });
                    w.blank();
                    w.scope("fn authenticated_user_id(&self) -> &str", |w| {
                        w.line("&self.authenticated_user_id");
                    });
                },
            );
            GeneratedFile {
                name: format!("{}_auth.rs", plan.stem),
                contents: w.finish(),
            }
        })
        .collect()
}

/// `strings.rs`: the interned literal dump, in intern order.
fn strings_file(cache: &StringCache) -> GeneratedFile {
    let mut w = CodeWriter::new();
    w.line(GENERATED_HEADER);
    w.blank();
    w.line("#![allow(non_upper_case_globals)]");
    w.blank();
    for entry in cache.entries() {
        w.line(format!(
            "pub const {}: &str = {};",
            entry.key,
            quote_str(&entry.value)
        ));
    }
    GeneratedFile {
        name: "strings.rs".to_string(),
        contents: w.finish(),
    }
}

/// `mod.rs` declaring every emitted module.
fn module_root(plans: &[RoutePlan<'_>]) -> GeneratedFile {
    let mut w = CodeWriter::new();
    w.line(GENERATED_HEADER);
    w.blank();
    w.line("pub mod route_config;");
    w.line("pub mod routes;");
    w.line("pub mod strings;");
    let auth: Vec<&RoutePlan<'_>> = plans.iter().filter(|p| p.route.auth_active()).collect();
    if !auth.is_empty() {
        w.blank();
        for plan in auth {
            w.line(format!("pub mod {}_auth;", plan.stem));
        }
    }
    GeneratedFile {
        name: "mod.rs".to_string(),
        contents: w.finish(),
    }
}

/// Rust string literal with the characters that matter escaped.
fn quote_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
