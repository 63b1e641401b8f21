use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the image service (env `IMG_PORT`)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Port of the GraphQL query surface (env `PORT`). That surface runs
    /// elsewhere; the value is only reported at startup.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    4001
}
fn default_api_port() -> u16 {
    4000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_port: default_api_port(),
        }
    }
}

/// Value of `database.url` selecting a throwaway in-memory store.
pub const MEMORY_DATABASE_URL: &str = ":memory:";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Directory holding the database file, or `:memory:` (env `DATABASE_URL`)
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Database name, used as the file stem (env `DB_NAME`)
    #[serde(default = "default_database_name")]
    pub name: String,
}

fn default_database_url() -> String {
    "./data".to_string()
}
fn default_database_name() -> String {
    "ProyectoFinal".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            name: default_database_name(),
        }
    }
}

impl DatabaseConfig {
    /// Whether this config selects an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }

    /// Path of the SQLite file: `<url>/<name>.sqlite`. `None` for `:memory:`.
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.is_memory() {
            return None;
        }
        let dir = self.url.strip_prefix("sqlite://").unwrap_or(&self.url);
        let dir = shellexpand::tilde(dir);
        Some(PathBuf::from(dir.as_ref()).join(format!("{}.sqlite", self.name)))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory uploaded images are written to (env `UPLOAD_DIR`)
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
        }
    }
}
