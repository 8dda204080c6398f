//! # Preroute
//!
//! **Preroute** is an ahead-of-time code generator for attribute-declared HTTP
//! routes: it scans an annotated Rust source tree and emits the routing table,
//! request binding, and dispatch glue that would otherwise be written by hand.
//!
//! ## Overview
//!
//! Service code declares a route as a plain request struct carrying a `route`
//! attribute, a handler implementing [`runtime::Handler`] for it, and optionally
//! a validator and an auth policy. Preroute reads those declarations, resolves
//! every member of the request struct to a wire source (path, query, header,
//! form, or JSON body), infers the set of response status codes each handler
//! can produce, and writes a deterministic `generated` module the service
//! mounts at startup.
//!
//! ## Architecture
//!
//! The pipeline is organized into several key modules:
//!
//! - **[`model`]** - Source tree loading and the declaration model built on `syn`
//! - **[`discover`]** - Candidate scan for route structs, handler impls, and validators
//! - **[`resolve`]** - Binding resolution: wire names, fetch sources, handler pairing
//! - **[`infer`]** - Response status inference over handler bodies
//! - **[`analyzer`]** - Extra checks over candidates (panicking handlers, unsourced form members)
//! - **[`emit`]** - Deterministic rendering of the generated artifacts
//! - **[`generate`]** - End-to-end pipeline driver and artifact writing
//! - **[`config`]** - Defaults, `preroute.toml` overlay, and flag precedence
//! - **[`diagnostics`]** - Diagnostic records and console reporting
//! - **[`runtime`]** - Traits and types the generated code links against
//! - **[`names`]** - Identifier derivation shared by resolution and emission
//! - **[`cli`]** - The `generate` and `check` commands
//!
//! ### Generation Flow
//!
//! A `generate` run moves declaration data through the stages in order:
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(preroute)
//!     participant Model as model::load_program
//!     participant Discover as discover
//!     participant Resolve as resolve
//!     participant Infer as infer
//!     participant Analyzer as analyzer
//!     participant Emit as emit
//!     participant FS as File System
//!
//!     User->>CLI: preroute generate --source app/src
//!     CLI->>Model: load_program("app/src")
//!     Model->>Model: Walk tree, parse .rs files
//!     Model-->>CLI: Program (declarations + index)
//!
//!     CLI->>Discover: discover(&program)
//!     Discover->>Discover: Find route structs,<br/>handler impls, validators
//!     Discover-->>CLI: Candidates
//!
//!     CLI->>Resolve: resolve_routes(&program, &candidates)
//!     Resolve->>Resolve: Pair handlers and validators
//!     Resolve->>Resolve: Bind members to wire sources
//!     Resolve-->>CLI: Vec<ResolvedRoute> + diagnostics
//!
//!     CLI->>Infer: attach_responses(&program, &mut routes)
//!     Infer->>Infer: Walk handler bodies,<br/>follow calls to a depth bound
//!     Infer-->>CLI: Status sets per route
//!
//!     CLI->>Analyzer: analyze(&candidates)
//!     Analyzer-->>CLI: Extra diagnostics
//!
//!     CLI->>Emit: emit_artifacts(&routes)
//!     Emit->>Emit: Render routes.rs, route_config.rs,<br/>auth impls, strings.rs, mod.rs
//!     Emit-->>CLI: Vec<GeneratedFile>
//!
//!     CLI->>FS: Write files under output/module_name
//!     CLI-->>User: Diagnostics + summary, exit status
//! ```
//!
//! ### Key Architectural Patterns
//!
//! 1. **Declarations Are the Source of Truth**: Everything emitted is derived
//!    from attributes and impls in the analyzed tree; there is no registry to
//!    keep in sync by hand
//! 2. **Diagnostics as Data**: A route that fails to resolve becomes a
//!    diagnostic, not a panic; routes that resolved cleanly are still emitted
//!    and the diagnostics decide the exit status
//! 3. **Deterministic Output**: Two runs over the same tree produce
//!    byte-identical artifacts, so generated code can be committed and diffed
//! 4. **Thin Generated Code**: The emitted dispatch functions only bind, build,
//!    validate, and invoke; all behavior lives behind the [`runtime`] traits
//!
//! ## Quick Start
//!
//! ```no_run
//! use preroute::{generate_to_disk, GeneratorConfig};
//!
//! let mut config = GeneratorConfig::default();
//! config.source = "app/src".into();
//! config.output = "app/src".into();
//!
//! let outcome = generate_to_disk(&config).expect("generation failed");
//! println!("{} file(s) written", outcome.files.len());
//! ```
//!
//! Or from the command line:
//!
//! ```bash
//! preroute generate --source app/src --output app/src --module generated
//! ```
//!
//! ## Generated Module Structure
//!
//! For a tree with an authenticated `CreatePetCommand` route, the output is:
//!
//! ```text
//! app/src/generated/
//! ├── mod.rs                              # Module root, submodule wiring
//! ├── routes.rs                           # Route template constants
//! ├── route_config.rs                     # route_table(), mount_routes(), dispatch fns
//! ├── crate_create_pet_command_auth.rs    # AuthenticatedRoute impl
//! └── strings.rs                          # Interned string literals
//! ```
//!
//! ### Dispatch Example
//!
//! Here is what a generated dispatch function looks like for a query route
//! with one optional query parameter:
//!
//! ```rust,ignore
//! /// Dispatch for `crate::ListPetsQuery`.
//! pub fn crate_list_pets_query_dispatch(parts: &RequestParts) -> Response {
//!     let page_raw = parts.query_value(strings::crate__ListPetsQuery_page).map(str::to_string);
//!     let page_value = page_raw.filter(|raw| !raw.is_empty()).and_then(|raw| raw.parse::<u32>().ok());
//!
//!     let request = crate::ListPetsQuery {
//!         page: page_value,
//!     };
//!
//!     let handler = crate::ListPetsHandler::default();
//!     match handler.invoke(request) {
//!         Outcome::Success(response) => response,
//!         Outcome::Error(error) => Response::problem(error.status, &error.message),
//!     }
//! }
//! ```
//!
//! **Important**: Do not edit generated files directly! They are overwritten on
//! every run. Change the route declarations instead and regenerate.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod discover;
pub mod emit;
pub mod generate;
pub mod infer;
pub mod model;
pub mod names;
pub mod resolve;
pub mod runtime;

pub use config::{ConfigFile, GeneratorConfig};
pub use diagnostics::{print_diagnostics, Diagnostic, Severity};
pub use generate::{generate_to_disk, run_generation, write_artifacts, GenerationOutput};
