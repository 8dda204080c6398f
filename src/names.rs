//! Deterministic name rendering for resolution and emission.
//!
//! Every generated identifier flows through here: identifier-safe forms of
//! full type paths, lowerCamel wire names for bound members, const-case route
//! constants, and the per-route dispatch function names. All helpers are pure
//! and total; odd input degrades to a best-effort identifier rather than a
//! panic.

/// Display form of a module path plus type name (`pets::CreatePet`).
#[must_use]
pub fn full_name(namespace: &[String], name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", namespace.join("::"), name)
    }
}

/// Emission-side path for a type in the analyzed crate (`crate::pets::CreatePet`).
#[must_use]
pub fn crate_path(namespace: &[String], name: &str) -> String {
    format!("crate::{}", full_name(namespace, name))
}

/// Identifier-safe rendering of an arbitrary name: every character that is
/// not alphanumeric becomes `_`. Case is preserved so distinct source names
/// stay visually distinct.
#[must_use]
pub fn safe_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Default wire name for a declared member: lowerCamel.
///
/// Snake-case segments are joined with interior capitalization
/// (`user_name` → `userName`); input without underscores just gets its first
/// character lowered, so already-camel names pass through.
#[must_use]
pub fn wire_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut first_segment = true;
    for segment in name.split('_').filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            if first_segment {
                out.extend(first.to_lowercase());
                first_segment = false;
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

/// SCREAMING_SNAKE rendering of an UpperCamel or snake name.
#[must_use]
pub fn const_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' {
            out.push('_');
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_uppercase());
            prev_lower = false;
        } else {
            out.extend(c.to_uppercase());
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// snake_case rendering of an UpperCamel, path-safe, or mixed name.
#[must_use]
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in safe_name(name).chars() {
        if c == '_' {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = true;
        }
    }
    out.trim_matches('_').to_string()
}

/// Route constant name: the declared type name with a trailing `Query` or
/// `Command` suffix removed, rendered const-case.
#[must_use]
pub fn route_const_name(type_name: &str) -> String {
    let trimmed = type_name
        .strip_suffix("Query")
        .or_else(|| type_name.strip_suffix("Command"))
        .filter(|t| !t.is_empty())
        .unwrap_or(type_name);
    const_case(trimmed)
}

/// Generated dispatch function name for a route type's full display name.
///
/// `crate::pets::CreatePet` → `crate_pets_create_pet_dispatch`. Snake-casing
/// the safe form keeps names from routes in different modules distinct.
#[must_use]
pub fn dispatch_fn_name(crate_path: &str) -> String {
    format!("{}_dispatch", snake_case(crate_path))
}

/// File stem for a per-route generated artifact (`crate_pets_create_pet`).
#[must_use]
pub fn artifact_stem(crate_path: &str) -> String {
    snake_case(crate_path)
}
