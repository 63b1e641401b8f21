mod cli;

use vitae::{
    config::{self, Config, DatabaseConfig},
    images::{ImageService, UploadStorage},
    server::{self, AppContext},
};
use vitae_common::{paths::upload_extension, ImageMime, TituloId};
use vitae_db::pool::{get_conn, init_memory_pool, init_pool, DbPool};
use vitae_db::queries::titulos;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

async fn start_server(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    // CLI flags win over file and environment
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Vitae image service");
    tracing::info!(
        "Image server will listen on {}:{} (query API port {})",
        config.server.host,
        config.server.port,
        config.server.api_port
    );

    let pool = open_database(&config.database)?;
    let storage = UploadStorage::init(&config.storage.upload_dir)?;
    tracing::info!("Upload directory: {}", storage.dir().display());

    let ctx = AppContext::new(config, ImageService::new(storage, pool));
    server::start_server(ctx).await
}

fn open_database(db: &DatabaseConfig) -> Result<DbPool> {
    let Some(path) = db.file_path() else {
        tracing::warn!("Using in-memory database; records are lost on exit");
        return Ok(init_memory_pool()?);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
    }

    tracing::info!("Opening database at {}", path.display());
    Ok(init_pool(&path.to_string_lossy())?)
}

fn main() -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vitae=trace,vitae_db=debug,vitae_common=debug,tower_http=debug".to_string()
        } else {
            "vitae=debug,vitae_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Start { host, port } => {
            let config = config::load_config_or_default(config_path)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(config, host, port))
        }
        Commands::CreateTitulo {
            nombre,
            institucion,
        } => create_titulo(config_path, &nombre, institucion.as_deref()),
        Commands::ShowTitulo { id } => show_titulo(config_path, &id),
        Commands::ListTitulos => list_titulos(config_path),
        Commands::SetInlineImage { id, file, mime } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(set_inline_image(config_path, &id, &file, mime.as_deref()))
        }
        Commands::Validate { config } => validate_config(config.as_deref()),
        Commands::Version => {
            println!("vitae {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn parse_id(raw: &str) -> Result<TituloId> {
    raw.parse()
        .with_context(|| format!("Invalid credential ID: {:?}", raw))
}

fn create_titulo(config_path: Option<&Path>, nombre: &str, institucion: Option<&str>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let pool = open_database(&config.database)?;
    let conn = get_conn(&pool)?;

    let titulo = titulos::create_titulo(&conn, nombre, institucion)?;
    tracing::debug!(titulo = %titulo.id, "Created credential record");
    println!("{}", titulo.id);
    Ok(())
}

fn show_titulo(config_path: Option<&Path>, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let config = config::load_config_or_default(config_path)?;
    let pool = open_database(&config.database)?;
    let conn = get_conn(&pool)?;

    let titulo = titulos::get_titulo(&conn, id)?
        .with_context(|| format!("Credential not found: {}", id))?;
    println!("{}", serde_json::to_string_pretty(&titulo)?);
    Ok(())
}

fn list_titulos(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let pool = open_database(&config.database)?;
    let conn = get_conn(&pool)?;

    let all = titulos::list_titulos(&conn)?;
    println!("{}", serde_json::to_string_pretty(&all)?);
    Ok(())
}

async fn set_inline_image(
    config_path: Option<&Path>,
    id: &str,
    file: &Path,
    mime: Option<&str>,
) -> Result<()> {
    let id = parse_id(id)?;

    let mime = match mime {
        Some(declared) => ImageMime::parse(declared)
            .with_context(|| format!("Image type not allowed: {:?}", declared))?,
        None => file
            .file_name()
            .and_then(|name| upload_extension(&name.to_string_lossy()))
            .and_then(|ext| ImageMime::from_extension(&ext))
            .with_context(|| format!("Cannot infer image type of {:?}; pass --mime", file))?,
    };

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read image: {:?}", file))?;

    let config = config::load_config_or_default(config_path)?;
    let pool = open_database(&config.database)?;
    let storage = UploadStorage::init(&config.storage.upload_dir)?;
    let service = ImageService::new(storage, pool);

    let cleared = service.store_inline(id, mime, &bytes).await?;

    println!("Stored {} bytes ({}) inline on {}", bytes.len(), mime, id);
    if let Some(path) = cleared {
        println!("Cleared file reference {}", path);
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults and environment");
            config::load_config_or_default(None)?
        }
    };

    println!("✓ Configuration is valid");
    println!("  Image server: {}:{}", config.server.host, config.server.port);
    println!("  Query API port: {}", config.server.api_port);
    match config.database.file_path() {
        Some(db) => println!("  Database: {}", db.display()),
        None => println!("  Database: in-memory"),
    }
    println!("  Upload directory: {}", config.storage.upload_dir.display());

    Ok(())
}
