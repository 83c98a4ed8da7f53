//! Generator configuration.
//!
//! Every knob is a CLI flag with an environment-variable fallback and a
//! fixed default, so the tool can run bare in CI (`crudgen`) or be steered
//! per-project without touching code.

use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(name = "crudgen", version, about = "Generate a CRUD backend slice from the table catalog")]
pub struct GeneratorConfig {
    /// Root directory for generated Java sources
    #[arg(long, env = "CRUDGEN_OUT_DIR", default_value = "out/java")]
    pub out_dir: PathBuf,

    /// Package name all generated types live under
    #[arg(long, env = "CRUDGEN_PACKAGE", default_value = "com.example.inventory")]
    pub package: String,

    /// API path prefix for controllers and the call collection
    #[arg(long, env = "CRUDGEN_API_BASE", default_value = "/api")]
    pub api_base: String,

    /// Directory for versioned changelog files
    #[arg(long, env = "CRUDGEN_CHANGELOG_DIR", default_value = "db/changelog/v_1_0_0")]
    pub changelog_dir: PathBuf,

    /// Master changelog manifest path
    #[arg(long, env = "CRUDGEN_MASTER_FILE", default_value = "db/changelog/master.xml")]
    pub master_file: PathBuf,

    /// Author recorded on every changeset
    #[arg(long, env = "CRUDGEN_AUTHOR", default_value = "crudgen")]
    pub author: String,

    /// Output path for the API call collection
    #[arg(
        long,
        env = "CRUDGEN_COLLECTION_OUT",
        default_value = "inventory.postman_collection.json"
    )]
    pub collection_out: PathBuf,

    /// Output path for the collection environment file
    #[arg(
        long,
        env = "CRUDGEN_ENV_OUT",
        default_value = "inventory.postman_environment.json"
    )]
    pub env_out: PathBuf,

    /// Display name of the call collection
    #[arg(long, env = "CRUDGEN_COLLECTION_NAME", default_value = "Inventory API")]
    pub collection_name: String,

    /// Display name of the environment
    #[arg(long, env = "CRUDGEN_ENV_NAME", default_value = "Local Dev")]
    pub environment_name: String,

    /// Base URL the collection targets
    #[arg(long, env = "CRUDGEN_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,
}

impl GeneratorConfig {
    /// Configuration with every output path anchored under `root`.
    /// Used by tests and by embedders that do not go through the CLI.
    pub fn rooted(root: &Path) -> Self {
        Self {
            out_dir: root.join("out/java"),
            package: "com.example.inventory".to_string(),
            api_base: "/api".to_string(),
            changelog_dir: root.join("db/changelog/v_1_0_0"),
            master_file: root.join("db/changelog/master.xml"),
            author: "crudgen".to_string(),
            collection_out: root.join("inventory.postman_collection.json"),
            env_out: root.join("inventory.postman_environment.json"),
            collection_name: "Inventory API".to_string(),
            environment_name: "Local Dev".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }

    /// Directory for one package segment, e.g. `<out>/com/example/inventory/entity`.
    pub fn package_dir(&self, segment: &str) -> PathBuf {
        let mut dir = self.out_dir.clone();
        for part in self.package.split('.') {
            dir.push(part);
        }
        dir.push(segment);
        dir
    }

    /// API base without a trailing slash.
    pub fn api_base_trimmed(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }
}
