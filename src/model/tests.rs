#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

fn single_unit(source: &str) -> Program {
    parse_program(&[("", source)]).expect("fixture should parse")
}

#[test]
fn test_struct_members_and_attrs() {
    let program = single_unit(
        r#"
        /// A pet to create.
        ///
        /// Extra remarks here.
        #[api_route("/pets/{id}", POST, require_auth, auth_policy = "admin")]
        pub struct CreatePet {
            /// Route-sourced id.
            #[from_route]
            pub id: String,
            #[from_query(name = "q")]
            pub query: Option<i64>,
            #[hidden]
            pub internal: String,
            pub payload: String,
        }
        "#,
    );
    assert_eq!(program.types.len(), 1);
    let ty = &program.types[0];
    assert_eq!(ty.name, "CreatePet");
    assert!(ty.namespace.is_empty());
    assert!(ty.doc.starts_with("A pet to create."));

    let attr = ty.attr("api_route").expect("route attribute");
    assert_eq!(attr.positional[0].as_str(), Some("/pets/{id}"));
    assert_eq!(attr.positional[1].as_ident(), Some("POST"));
    assert!(attr.flag("require_auth"));
    assert_eq!(attr.named_str("auth_policy"), Some("admin"));

    assert_eq!(ty.members.len(), 4);
    let id = &ty.members[0];
    assert!(id.has_attr("from_route"));
    assert!(!id.ty.optional);
    assert!(id.ty.is_string());
    assert_eq!(id.doc, "Route-sourced id.");

    let query = &ty.members[1];
    assert_eq!(query.attr("from_query").unwrap().named_str("name"), Some("q"));
    assert!(query.ty.optional);
    assert_eq!(query.ty.display, "i64");

    assert!(ty.members[2].has_attr("hidden"));
    assert!(ty.members[3].attrs.is_empty());
}

#[test]
fn test_option_peeling_and_vec_display() {
    let program = single_unit(
        r#"
        pub struct Mixed {
            pub a: Option<String>,
            pub b: Vec<String>,
            pub c: Option<Vec<UploadedFile>>,
            pub d: std::option::Option<bool>,
        }
        "#,
    );
    let ty = &program.types[0];
    assert_eq!(ty.members[0].ty, TypeName::new("String", true));
    assert_eq!(ty.members[1].ty, TypeName::new("Vec<String>", false));
    assert!(ty.members[1].ty.is_string_vec());
    assert_eq!(ty.members[2].ty, TypeName::new("Vec<UploadedFile>", true));
    assert!(ty.members[2].ty.is_file_vec());
    assert_eq!(ty.members[3].ty, TypeName::new("bool", true));
}

#[test]
fn test_impl_attachment_across_units() {
    let program = parse_program(&[
        (
            "pets",
            r#"
            pub struct CreatePet {
                pub id: String,
            }
            "#,
        ),
        (
            "handlers",
            r#"
            pub struct CreatePetHandler;

            impl Handler<CreatePet, PetCreated> for CreatePetHandler {
                fn invoke(&self, request: CreatePet) -> Outcome {
                    self.ok(PetCreated {})
                }
            }

            impl CreatePetHandler {
                fn helper(&self) {}
            }
            "#,
        ),
    ])
    .unwrap();

    let handler = program
        .types
        .iter()
        .find(|t| t.name == "CreatePetHandler")
        .unwrap();
    let imp = handler.trait_impl("Handler").expect("trait impl attached");
    assert_eq!(imp.type_args, vec!["CreatePet", "PetCreated"]);
    assert!(imp.method("invoke").is_some());
    assert!(handler.method("helper").is_some());
}

#[test]
fn test_inline_modules_extend_namespace() {
    let program = parse_program(&[(
        "api",
        r#"
        pub mod pets {
            pub struct ListPets {
                pub limit: Option<i64>,
            }
        }
        "#,
    )])
    .unwrap();
    let ty = &program.types[0];
    assert_eq!(ty.namespace, vec!["api".to_string(), "pets".to_string()]);
    assert_eq!(ty.full_name(), "api::pets::ListPets");
    assert_eq!(ty.crate_path(), "crate::api::pets::ListPets");
}

#[test]
fn test_lowering_preserves_nested_calls() {
    let program = single_unit(
        r#"
        fn outer() {
            let x = match compute() {
                Ok(v) => v.finish(),
                Err(_) => fallback::build(default_value()),
            };
            if x > 0 {
                helper(NotFoundError::new());
            }
        }
        "#,
    );
    let body = &program.functions[0].func.body;
    let mut calls = Vec::new();
    walk_body(body, &mut |expr| {
        if let Expr::Call { path, .. } = expr {
            calls.push(path.join("::"));
        }
    });
    assert!(calls.contains(&"compute".to_string()));
    assert!(calls.contains(&"fallback::build".to_string()));
    assert!(calls.contains(&"default_value".to_string()));
    assert!(calls.contains(&"helper".to_string()));
    assert!(calls.contains(&"NotFoundError::new".to_string()));
}

#[test]
fn test_lowering_captures_macros_and_method_calls() {
    let program = single_unit(
        r#"
        fn body() {
            let v = input.trim().parse::<i64>().unwrap();
            panic!("boom");
        }
        "#,
    );
    let body = &program.functions[0].func.body;
    let mut methods = Vec::new();
    let mut macros = Vec::new();
    walk_body(body, &mut |expr| match expr {
        Expr::MethodCall { method, .. } => methods.push(method.clone()),
        Expr::MacroCall { name } => macros.push(name.clone()),
        _ => {}
    });
    assert!(methods.contains(&"trim".to_string()));
    assert!(methods.contains(&"parse".to_string()));
    assert!(methods.contains(&"unwrap".to_string()));
    assert_eq!(macros, vec!["panic".to_string()]);
}

#[test]
fn test_struct_literal_lowering() {
    let program = single_unit(
        r#"
        fn build() -> RequestError {
            RequestError { status: 404, message: describe() }
        }
        "#,
    );
    let body = &program.functions[0].func.body;
    let mut found = false;
    walk_body(body, &mut |expr| {
        if let Expr::StructLit { path, fields } = expr {
            if path.last().map(String::as_str) == Some("RequestError") {
                found = true;
                assert_eq!(fields[0].0, "status");
                assert_eq!(fields[0].1, Expr::Int(404));
            }
        }
    });
    assert!(found, "struct literal should survive lowering");
}

#[test]
fn test_symbol_index_resolves_callables() {
    let program = parse_program(&[
        (
            "errors",
            r#"
            pub struct PetMissing;

            impl PetMissing {
                pub fn new() -> RequestError {
                    RequestError::new(404, "missing")
                }
            }

            pub fn helper() -> RequestError {
                PetMissing::new()
            }
            "#,
        ),
        (
            "other",
            r#"
            pub fn unrelated() {}
            "#,
        ),
    ])
    .unwrap();
    let index = SymbolIndex::build(&program);

    let method = index
        .resolve_callable(&["PetMissing".to_string(), "new".to_string()])
        .expect("inherent method resolves");
    assert_eq!(method.key, "errors::PetMissing::new");

    let free = index
        .resolve_callable(&["helper".to_string()])
        .expect("free fn resolves");
    assert_eq!(free.key, "errors::helper");

    assert!(index
        .resolve_callable(&["missing_fn".to_string()])
        .is_none());

    let ty = index.resolve_type("PetMissing").expect("type resolves");
    assert_eq!(ty.full_name(), "errors::PetMissing");
    assert_eq!(
        index.resolve_type_name("errors::PetMissing").as_deref(),
        Some("errors::PetMissing")
    );
}

#[test]
fn test_bare_ambiguous_names_do_not_resolve() {
    let program = parse_program(&[
        ("a", "pub struct Thing;"),
        ("b", "pub struct Thing;"),
    ])
    .unwrap();
    let index = SymbolIndex::build(&program);
    assert!(index.resolve_type("Thing").is_none());
    assert!(index.resolve_type("a::Thing").is_some());
}
