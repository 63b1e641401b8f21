mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file, then apply environment overrides
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./vitae.toml",
        "~/.config/vitae/config.toml",
        "/etc/vitae/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;
    Ok(config)
}

/// Override config values from environment variables.
///
/// `lookup` returns the value of a variable, if set. Unset and empty
/// variables leave the config untouched.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get("IMG_HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("IMG_PORT") {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("Invalid IMG_PORT value: {:?}", port))?;
    }
    if let Some(port) = get("PORT") {
        config.server.api_port = port
            .trim()
            .parse()
            .with_context(|| format!("Invalid PORT value: {:?}", port))?;
    }
    if let Some(url) = get("DATABASE_URL") {
        config.database.url = url;
    }
    if let Some(name) = get("DB_NAME") {
        config.database.name = name;
    }
    if let Some(dir) = get("UPLOAD_DIR") {
        config.storage.upload_dir = PathBuf::from(dir);
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }
    if config.server.api_port == 0 {
        anyhow::bail!("API port cannot be 0");
    }

    let name = &config.database.name;
    if name.is_empty() {
        anyhow::bail!("Database name cannot be empty");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        anyhow::bail!("Database name {:?} must be a plain file stem", name);
    }

    if config.storage.upload_dir.as_os_str().is_empty() {
        anyhow::bail!("Upload directory cannot be empty");
    }

    if config.server.port == config.server.api_port {
        tracing::warn!(
            "Image service port {} equals the query API port",
            config.server.port
        );
    }

    Ok(())
}
