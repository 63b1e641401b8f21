//! Credential image handling.
//!
//! Uploaded files are written to a local upload directory and referenced
//! from the credential record by public path. Inline images stored on the
//! record are decoded on demand. The `vitae_db` crate owns the record side.

mod error;
mod inline;
mod service;
mod storage;

pub use error::ImageError;
pub use inline::{decode_inline, encode_data_url, DecodedImage, InlineDecodeError, DEFAULT_INLINE_MIME};
pub use service::{ImageService, ImageUpload, UploadOutcome};
pub use storage::{StoredFile, UploadStorage};

/// Largest accepted upload, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// `Cache-Control` value for served image bytes.
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";
