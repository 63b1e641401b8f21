use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vitae")]
#[command(author, version, about = "Credential image upload and delivery service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the image server
    Start {
        /// Host to bind to (overrides config and IMG_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and IMG_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create a credential record and print its ID
    CreateTitulo {
        /// Display name of the credential
        #[arg(long)]
        nombre: String,

        /// Issuing institution
        #[arg(long)]
        institucion: Option<String>,
    },

    /// Print a credential record as JSON
    ShowTitulo {
        /// Credential ID
        id: String,
    },

    /// Print all credential records as JSON
    ListTitulos,

    /// Store a local image on a credential as an inline data URL
    SetInlineImage {
        /// Credential ID
        id: String,

        /// Image file to embed
        file: PathBuf,

        /// MIME type (guessed from the file extension if omitted)
        #[arg(long)]
        mime: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
