//! Image service coordinating upload storage and credential records.
//!
//! Owns the upload directory and the database pool so route handlers get
//! both through one explicitly constructed value.

use bytes::Bytes;
use vitae_common::{ImageMime, TituloId};
use vitae_db::pool::{get_conn, DbPool};
use vitae_db::queries::titulos;

use super::error::ImageError;
use super::inline::{decode_inline, encode_data_url, DecodedImage};
use super::storage::UploadStorage;
use super::MAX_UPLOAD_BYTES;

/// An image received from a client, not yet persisted.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name as sent by the client (may be empty).
    pub original_name: String,
    /// Declared content type.
    pub mime: String,
    pub data: Bytes,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Public path now stored on the record.
    pub path: String,
    pub size: u64,
    /// Declared content type, as received.
    pub mime: String,
    /// Public path of the file this upload superseded, if any.
    pub replaced: Option<String>,
}

/// High-level image service that coordinates file storage with credential records.
pub struct ImageService {
    storage: UploadStorage,
    pool: DbPool,
}

impl ImageService {
    /// Create a new `ImageService`.
    ///
    /// # Arguments
    ///
    /// * `storage` - The upload directory
    /// * `pool` - Database connection pool
    pub fn new(storage: UploadStorage, pool: DbPool) -> Self {
        Self { storage, pool }
    }

    pub fn storage(&self) -> &UploadStorage {
        &self.storage
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Check a declared content type against the allow-list.
    pub fn check_mime(content_type: &str) -> Result<ImageMime, ImageError> {
        ImageMime::parse(content_type)
            .ok_or_else(|| ImageError::UnsupportedMediaType(content_type.to_string()))
    }

    /// Check an upload size against [`MAX_UPLOAD_BYTES`].
    pub fn check_size(len: usize) -> Result<(), ImageError> {
        if len > MAX_UPLOAD_BYTES {
            return Err(ImageError::PayloadTooLarge {
                limit: MAX_UPLOAD_BYTES,
            });
        }
        Ok(())
    }

    /// Store an uploaded image and point the record at it.
    ///
    /// The new file is written before the record is updated. The file the
    /// record pointed at before, if any, is deleted in a detached task once
    /// the update has committed; that deletion never affects the result.
    ///
    /// # Errors
    ///
    /// * `UnsupportedMediaType` / `PayloadTooLarge` - nothing is written
    /// * `NotFound` - no record with this id; nothing is kept on disk
    /// * `Internal` - disk or database failure
    pub async fn store_upload(
        &self,
        id: TituloId,
        upload: ImageUpload,
    ) -> Result<UploadOutcome, ImageError> {
        Self::check_mime(&upload.mime)?;
        Self::check_size(upload.data.len())?;

        let previous = {
            let conn = get_conn(&self.pool)?;
            titulos::get_image_ref(&conn, id)?.ok_or(ImageError::NotFound)?
        };

        let stored = self
            .storage
            .write(&upload.original_name, &upload.data)
            .await
            .map_err(|e| ImageError::internal(format!("Failed to write upload: {}", e)))?;

        let updated = get_conn(&self.pool)
            .and_then(|conn| titulos::set_image_path(&conn, id, &stored.public_path));

        match updated {
            Ok(true) => {}
            Ok(false) => {
                self.storage.remove_detached(stored.public_path);
                return Err(ImageError::NotFound);
            }
            Err(e) => {
                self.storage.remove_detached(stored.public_path);
                return Err(e.into());
            }
        }

        let replaced = previous
            .file_path()
            .filter(|old| *old != stored.public_path)
            .map(str::to_string);
        if let Some(old) = &replaced {
            self.storage.remove_detached(old.clone());
        }

        tracing::info!(
            titulo = %id,
            path = %stored.public_path,
            size = stored.size,
            mime = %upload.mime,
            "Stored titulo image"
        );

        Ok(UploadOutcome {
            path: stored.public_path,
            size: stored.size,
            mime: upload.mime,
            replaced,
        })
    }

    /// Decode the inline image of a record.
    ///
    /// Only the inline representation is read; a record whose image is a
    /// file, or that has no image, decodes as an empty JPEG.
    pub fn fetch_inline(&self, id: TituloId) -> Result<DecodedImage, ImageError> {
        let conn = get_conn(&self.pool)?;
        let image = titulos::get_image_ref(&conn, id)?.ok_or(ImageError::NotFound)?;

        decode_inline(image.inline_value()).map_err(|e| {
            tracing::debug!(titulo = %id, error = %e, "Stored inline image does not decode");
            ImageError::InvalidEncoding
        })
    }

    /// Store image bytes inline on a record as a data URL.
    ///
    /// Clears the record's file path; the file it pointed at is removed
    /// best-effort. Returns the public path that was cleared, if any.
    pub async fn store_inline(
        &self,
        id: TituloId,
        mime: ImageMime,
        bytes: &[u8],
    ) -> Result<Option<String>, ImageError> {
        Self::check_size(bytes.len())?;

        let previous = {
            let conn = get_conn(&self.pool)?;
            let previous = titulos::get_image_ref(&conn, id)?.ok_or(ImageError::NotFound)?;
            if !titulos::set_inline_image(&conn, id, &encode_data_url(mime.as_str(), bytes))? {
                return Err(ImageError::NotFound);
            }
            previous
        };

        let cleared = previous.file_path().map(str::to_string);
        if let Some(old) = &cleared {
            if let Err(e) = self.storage.remove(old).await {
                tracing::warn!(path = %old, error = %e, "Failed to remove cleared image");
            }
        }

        Ok(cleared)
    }
}
