//! Route discovery: scan the declaration model for the three candidate sets
//! the resolver works from.
//!
//! Discovery is purely syntactic and deliberately cheap: it looks for the
//! route attribute and for `Handler` / `RequestValidator` impls by name,
//! without judging whether any of them fit together. All matching happens in
//! resolution, and the sets travel as explicit values rather than through any
//! shared registry.

use tracing::debug;

use crate::model::{Program, TraitImpl, TypeDecl};

/// Attribute marking a route declaration.
pub const ROUTE_ATTR: &str = "api_route";
/// Trait whose impls make a type a handler candidate.
pub const HANDLER_TRAIT: &str = "Handler";
/// Trait whose impls make a type a validator candidate.
pub const VALIDATOR_TRAIT: &str = "RequestValidator";
/// Trait granting a route declaration the prepare capability.
pub const PREPARE_TRAIT: &str = "PrepareRequest";
/// The dispatch method every handler impl provides.
pub const DISPATCH_METHOD: &str = "invoke";

/// One `Handler` impl on a candidate type. A type implementing the trait for
/// several request types yields one candidate per impl.
#[derive(Debug, Clone, Copy)]
pub struct HandlerCandidate<'a> {
    pub decl: &'a TypeDecl,
    pub imp: &'a TraitImpl,
}

/// One `RequestValidator` impl on a candidate type.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorCandidate<'a> {
    pub decl: &'a TypeDecl,
    pub imp: &'a TraitImpl,
}

/// The three candidate sets, in declaration-model order.
#[derive(Debug, Default)]
pub struct Candidates<'a> {
    pub routes: Vec<&'a TypeDecl>,
    pub handlers: Vec<HandlerCandidate<'a>>,
    pub validators: Vec<ValidatorCandidate<'a>>,
}

/// Collect candidates from a parsed program.
#[must_use]
pub fn discover(program: &Program) -> Candidates<'_> {
    let mut candidates = Candidates::default();
    for ty in &program.types {
        if ty.has_attr(ROUTE_ATTR) {
            candidates.routes.push(ty);
        }
        for imp in &ty.impls {
            if imp.trait_name == HANDLER_TRAIT && !imp.type_args.is_empty() {
                candidates.handlers.push(HandlerCandidate { decl: ty, imp });
            }
            if imp.trait_name == VALIDATOR_TRAIT && !imp.type_args.is_empty() {
                candidates
                    .validators
                    .push(ValidatorCandidate { decl: ty, imp });
            }
        }
    }
    debug!(
        routes = candidates.routes.len(),
        handlers = candidates.handlers.len(),
        validators = candidates.validators.len(),
        "discovery complete"
    );
    candidates
}
