#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::diagnostics::Severity;
use crate::discover::discover;
use crate::model::parse_program;

fn resolve_fixture(source: &str) -> (Vec<ResolvedRoute>, Vec<Diagnostic>) {
    let program = parse_program(&[("", source)]).expect("fixture should parse");
    let candidates = discover(&program);
    let (routes, issues) = resolve_routes(&program, &candidates);
    (routes, issues)
}

const COMPLETE_ROUTE: &str = r#"
    /// Creates a pet.
    ///
    /// Requires an authenticated caller.
    #[api_route("/pets/{id}", POST, require_auth, auth_policy = "admin")]
    pub struct CreatePet {
        /// The pet id.
        #[from_route]
        pub id: String,
        #[from_query(name = "q")]
        pub search: Option<String>,
        #[from_header(name = "x-request-id")]
        pub request_id: Option<String>,
        #[hidden]
        pub internal_tag: Option<String>,
        pub display_name: String,
        pub authenticated_user_id: String,
    }

    impl PrepareRequest for CreatePet {
        fn prepare(self, parts: &RequestParts) -> Self {
            self
        }
    }

    pub struct PetCreated;

    pub struct CreatePetHandler;

    impl Handler<CreatePet, PetCreated> for CreatePetHandler {
        fn invoke(&self, request: CreatePet) -> Outcome {
            self.ok(PetCreated)
        }
    }

    pub struct CreatePetValidator;

    impl RequestValidator<CreatePet> for CreatePetValidator {
        fn validate(&self, value: &CreatePet) -> Vec<FieldError> {
            Vec::new()
        }
    }
"#;

#[test]
fn test_complete_route_resolves() {
    let (routes, issues) = resolve_fixture(COMPLETE_ROUTE);
    assert_eq!(routes.len(), 1, "issues: {issues:?}");
    let route = &routes[0];

    assert_eq!(route.template, "/pets/{id}");
    assert_eq!(route.method, Method::Post);
    assert_eq!(route.docs.summary, "Creates a pet.");
    assert_eq!(route.docs.remarks, "Requires an authenticated caller.");
    assert!(route.requires_auth);
    assert_eq!(route.auth_policy, "admin");
    assert!(route.auth_active());
    assert!(route.has_prepare);
    assert_eq!(route.body, BodyKind::Json);
    assert_eq!(route.handler.type_ref.simple_name, "CreatePetHandler");
    assert_eq!(route.handler.response_type, "PetCreated");
    assert_eq!(
        route.validator.as_ref().unwrap().simple_name,
        "CreatePetValidator"
    );
}

#[test]
fn test_member_binding_details() {
    let (routes, _) = resolve_fixture(COMPLETE_ROUTE);
    let members = &routes[0].members;

    // The reserved auth member is machinery, not a binding.
    assert!(members.iter().all(|m| m.declared_name != AUTH_MEMBER));
    assert_eq!(members.len(), 5);

    let id = &members[0];
    assert_eq!(id.fetch, FetchSource::Route);
    assert_eq!(id.wire_name, "id");
    assert!(id.required());
    assert_eq!(id.summary, "The pet id.");

    let search = &members[1];
    assert_eq!(search.fetch, FetchSource::Query);
    assert_eq!(search.wire_name, "q", "explicit name wins");
    assert!(!search.required());

    let request_id = &members[2];
    assert_eq!(request_id.fetch, FetchSource::Header);
    assert_eq!(request_id.wire_name, "x-request-id");

    assert!(members[3].hidden);

    let display = &members[4];
    assert_eq!(display.fetch, FetchSource::None);
    assert_eq!(display.wire_name, "displayName", "camel default");
}

#[test]
fn test_missing_handler_is_isolated() {
    let (routes, issues) = resolve_fixture(
        r#"
        #[api_route("/a", GET)]
        pub struct RouteA {
            pub limit: Option<i64>,
        }

        #[api_route("/b", GET)]
        pub struct RouteB {
            pub limit: Option<i64>,
        }

        pub struct RouteBHandler;

        impl Handler<RouteB> for RouteBHandler {
            fn invoke(&self, request: RouteB) -> Outcome {
                self.no_content()
            }
        }
        "#,
    );
    assert_eq!(routes.len(), 1, "the resolvable route survives");
    assert_eq!(routes[0].route.simple_name, "RouteB");
    let missing: Vec<_> = issues.iter().filter(|i| i.kind == "missing_handler").collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].severity, Severity::Error);
    assert!(missing[0].message.contains("RouteA"));
}

#[test]
fn test_ambiguous_handler_is_an_error() {
    let (routes, issues) = resolve_fixture(
        r#"
        #[api_route("/a", GET)]
        pub struct RouteA {
            pub limit: Option<i64>,
        }

        pub struct FirstHandler;

        impl Handler<RouteA> for FirstHandler {
            fn invoke(&self, request: RouteA) -> Outcome {
                self.no_content()
            }
        }

        pub struct SecondHandler;

        impl Handler<RouteA> for SecondHandler {
            fn invoke(&self, request: RouteA) -> Outcome {
                self.no_content()
            }
        }
        "#,
    );
    assert!(routes.is_empty());
    assert!(issues.iter().any(|i| i.kind == "ambiguous_handler"
        && i.message.contains("FirstHandler")
        && i.message.contains("SecondHandler")));
}

#[test]
fn test_duplicate_template_and_method() {
    let (routes, issues) = resolve_fixture(
        r#"
        #[api_route("/same", GET)]
        pub struct First {
            pub limit: Option<i64>,
        }

        #[api_route("/same", GET)]
        pub struct Second {
            pub limit: Option<i64>,
        }

        pub struct FirstHandler;

        impl Handler<First> for FirstHandler {
            fn invoke(&self, request: First) -> Outcome {
                self.no_content()
            }
        }

        pub struct SecondHandler;

        impl Handler<Second> for SecondHandler {
            fn invoke(&self, request: Second) -> Outcome {
                self.no_content()
            }
        }
        "#,
    );
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].route.simple_name, "First");
    assert!(issues
        .iter()
        .any(|i| i.kind == "duplicate_route" && i.severity == Severity::Error));
}

#[test]
fn test_same_template_different_method_is_fine() {
    let (routes, issues) = resolve_fixture(
        r#"
        #[api_route("/same", GET)]
        pub struct GetIt {
            pub limit: Option<i64>,
        }

        #[api_route("/same", DELETE)]
        pub struct DropIt {
            pub limit: Option<i64>,
        }

        pub struct GetItHandler;

        impl Handler<GetIt> for GetItHandler {
            fn invoke(&self, request: GetIt) -> Outcome {
                self.no_content()
            }
        }

        pub struct DropItHandler;

        impl Handler<DropIt> for DropItHandler {
            fn invoke(&self, request: DropIt) -> Outcome {
                self.no_content()
            }
        }
        "#,
    );
    assert_eq!(routes.len(), 2);
    assert!(!issues.iter().any(|i| i.kind == "duplicate_route"));
}

#[test]
fn test_auth_route_without_auth_member() {
    let (routes, issues) = resolve_fixture(
        r#"
        #[api_route("/locked", GET, require_auth)]
        pub struct Locked {
            pub limit: Option<i64>,
        }

        pub struct LockedHandler;

        impl Handler<Locked> for LockedHandler {
            fn invoke(&self, request: Locked) -> Outcome {
                self.no_content()
            }
        }
        "#,
    );
    assert!(routes.is_empty());
    assert!(issues.iter().any(|i| i.kind == "missing_auth_member"));
}

#[test]
fn test_body_kind_rules() {
    let (routes, _) = resolve_fixture(
        r#"
        #[api_route("/upload", POST)]
        pub struct Upload {
            #[from_form]
            pub title: String,
        }

        #[api_route("/create", POST)]
        pub struct Create {
            pub name: String,
        }

        #[api_route("/list", GET)]
        pub struct List {
            #[from_query]
            pub page: Option<i64>,
        }

        pub struct UploadHandler;

        impl Handler<Upload> for UploadHandler {
            fn invoke(&self, request: Upload) -> Outcome {
                self.no_content()
            }
        }

        pub struct CreateHandler;

        impl Handler<Create> for CreateHandler {
            fn invoke(&self, request: Create) -> Outcome {
                self.no_content()
            }
        }

        pub struct ListHandler;

        impl Handler<List> for ListHandler {
            fn invoke(&self, request: List) -> Outcome {
                self.no_content()
            }
        }
        "#,
    );
    let body_of = |name: &str| {
        routes
            .iter()
            .find(|r| r.route.simple_name == name)
            .map(|r| r.body)
            .unwrap()
    };
    assert_eq!(body_of("Upload"), BodyKind::Form);
    assert_eq!(body_of("Create"), BodyKind::Json);
    assert_eq!(body_of("List"), BodyKind::None);
}

#[test]
fn test_route_member_missing_from_template_warns() {
    let (routes, issues) = resolve_fixture(
        r#"
        #[api_route("/pets", GET)]
        pub struct GetPet {
            #[from_route]
            pub id: String,
        }

        pub struct GetPetHandler;

        impl Handler<GetPet> for GetPetHandler {
            fn invoke(&self, request: GetPet) -> Outcome {
                self.no_content()
            }
        }
        "#,
    );
    assert_eq!(routes.len(), 1, "warning does not block resolution");
    assert!(issues
        .iter()
        .any(|i| i.kind == "route_param_not_in_template" && i.severity == Severity::Warning));
}

#[test]
fn test_template_placeholder_with_constraint_matches() {
    let (_, issues) = resolve_fixture(
        r#"
        #[api_route("/pets/{id:int}", GET)]
        pub struct GetPet {
            #[from_route]
            pub id: String,
        }

        pub struct GetPetHandler;

        impl Handler<GetPet> for GetPetHandler {
            fn invoke(&self, request: GetPet) -> Outcome {
                self.no_content()
            }
        }
        "#,
    );
    assert!(!issues
        .iter()
        .any(|i| i.kind == "route_param_not_in_template"));
}

#[test]
fn test_invalid_attribute_arguments() {
    let (routes, issues) = resolve_fixture(
        r#"
        #[api_route("/pets", FLY)]
        pub struct BadMethod {
            pub limit: Option<i64>,
        }
        "#,
    );
    assert!(routes.is_empty());
    assert!(issues.iter().any(|i| i.kind == "invalid_route_attribute"));
}
