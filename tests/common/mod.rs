//! Shared fixtures for the integration tests: annotated source trees written
//! to disk and a config pointing at them.
#![allow(dead_code)]

use std::path::Path;

use preroute::GeneratorConfig;

/// Writes `(relative path, contents)` pairs under `root`, creating parent
/// directories as needed.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture directory");
        }
        std::fs::write(&path, contents).expect("write fixture file");
    }
}

/// Config analyzing `dir/src` with artifacts under `dir/out/generated`.
pub fn tree_config(dir: &Path) -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.source = dir.join("src");
    config.output = dir.join("out");
    config
}

/// Reads one generated artifact back from the module directory.
pub fn read_artifact(config: &GeneratorConfig, name: &str) -> String {
    let path = config.module_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("missing artifact {}: {err}", path.display()))
}

/// A two-route tree: one authenticated command with a validator, one plain
/// query. Written to `src/routes.rs`, so declarations live under
/// `crate::routes`.
pub const PETSTORE_ROUTES: &str = r#"
    /// Creates a pet.
    #[api_route("/pets/{id}", POST, require_auth, auth_policy = "admin")]
    pub struct CreatePetCommand {
        /// The pet id.
        #[from_route]
        pub id: String,
        #[from_query]
        pub notify: Option<bool>,
        pub display_name: String,
        pub authenticated_user_id: String,
    }

    pub struct PetCreated;

    pub struct CreatePetHandler;

    impl Handler<CreatePetCommand, PetCreated> for CreatePetHandler {
        fn invoke(&self, request: CreatePetCommand) -> Outcome {
            if request.display_name.is_empty() {
                return self.error(RequestError::new(status::CONFLICT, "name taken"));
            }
            self.ok(PetCreated)
        }
    }

    pub struct CreatePetValidator;

    impl RequestValidator<CreatePetCommand> for CreatePetValidator {
        fn validate(&self, value: &CreatePetCommand) -> Vec<FieldError> {
            Vec::new()
        }
    }

    /// Lists pets.
    #[api_route("/pets", GET)]
    pub struct ListPetsQuery {
        #[from_query]
        pub page: Option<u32>,
        #[from_query(name = "q")]
        pub search: String,
    }

    pub struct PetPage;

    pub struct ListPetsHandler;

    impl Handler<ListPetsQuery, PetPage> for ListPetsHandler {
        fn invoke(&self, request: ListPetsQuery) -> Outcome {
            self.ok(PetPage)
        }
    }
"#;
