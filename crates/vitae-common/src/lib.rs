//! Vitae-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across vitae:
//!
//! - **Typed IDs**: document identifiers for credential records
//! - **Core Types**: the accepted image MIME types
//! - **Path Utilities**: upload file naming helpers
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use vitae_common::{Error, ImageMime, Result, TituloId};
//! use vitae_common::paths::upload_extension;
//!
//! // Parse a document id
//! let id: TituloId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
//! assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
//!
//! // Accept only allow-listed image types
//! assert_eq!(ImageMime::parse("IMAGE/PNG"), Some(ImageMime::Png));
//!
//! // Keep the lower-cased extension of an uploaded file
//! assert_eq!(upload_extension("Diploma.JPG").as_deref(), Some(".jpg"));
//!
//! // Use common error types
//! fn example() -> Result<()> {
//!     Err(Error::database("locked"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
