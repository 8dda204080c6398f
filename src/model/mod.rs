//! Declaration model: parse analyzed source into plain value records and
//! answer the questions the rest of the pipeline asks of them.
//!
//! The model deliberately owns everything it returns. Later stages compare,
//! cache, and clone these records freely; none of them keeps a handle back
//! into the parsed syntax, and a [`SymbolIndex`] built for one pass is thrown
//! away with it.

mod lower;
mod parse;
mod types;

#[cfg(test)]
mod tests;

pub use parse::{load_program, parse_program};
pub use types::{
    walk_body, AttrData, AttrValue, CallableRef, Expr, FnDecl, FreeFn, MemberDecl, Program,
    SymbolIndex, TraitImpl, TypeDecl, TypeName,
};
