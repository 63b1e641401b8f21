//! Credential image API routes.
//!
//! Provides the multipart upload endpoint and the inline image fetch
//! endpoint for credential records.

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::BytesMut;
use serde::Serialize;
use utoipa::ToSchema;
use vitae_common::TituloId;

use super::AppContext;
use crate::images::{ImageError, ImageService, ImageUpload, IMAGE_CACHE_CONTROL, MAX_UPLOAD_BYTES};

/// Multipart framing allowance on top of the file cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create image-related routes.
pub fn image_routes() -> Router<AppContext> {
    Router::new().route(
        "/titulos/:id/imagen",
        post(upload_image)
            .get(fetch_image)
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD)),
    )
}

// ============================================================================
// Response types
// ============================================================================

/// Result of a successful upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub ok: bool,
    /// Public path of the stored file (`/uploads/<name>`)
    pub path: String,
    /// Stored size in bytes
    pub size: u64,
    /// Content type declared by the client
    pub mime: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Upload an image file for a credential.
#[utoipa::path(
    post,
    path = "/api/titulos/{id}/imagen",
    tag = "titulos",
    params(
        ("id" = String, Path, description = "Credential ID (24 hex characters)")
    ),
    request_body(
        content_type = "multipart/form-data",
        description = "Single file field named `file` (png, jpeg or webp, at most 5 MiB)"
    ),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Invalid ID, missing file or malformed body", body = super::error::ErrorBody),
        (status = 404, description = "Credential not found", body = super::error::ErrorBody),
        (status = 413, description = "Image too large", body = super::error::ErrorBody),
        (status = 415, description = "Image type not allowed", body = super::error::ErrorBody),
        (status = 500, description = "Storage failure", body = super::error::ErrorBody)
    )
)]
pub async fn upload_image(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ImageError> {
    let id = parse_id(&id)?;
    let mut multipart = multipart.map_err(|_| ImageError::MissingFile)?;

    let upload = read_file_field(&mut multipart)
        .await?
        .ok_or(ImageError::MissingFile)?;

    let outcome = ctx.images.store_upload(id, upload).await?;

    Ok(Json(UploadResponse {
        ok: true,
        path: outcome.path,
        size: outcome.size,
        mime: outcome.mime,
    }))
}

/// Fetch the inline image of a credential as raw bytes.
#[utoipa::path(
    get,
    path = "/api/titulos/{id}/imagen",
    tag = "titulos",
    params(
        ("id" = String, Path, description = "Credential ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Decoded image bytes, typed by the stored MIME"),
        (status = 400, description = "Invalid ID or undecodable image", body = super::error::ErrorBody),
        (status = 404, description = "Credential not found", body = super::error::ErrorBody)
    )
)]
pub async fn fetch_image(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Response, ImageError> {
    let id = parse_id(&id)?;
    let decoded = ctx.images.fetch_inline(id)?;

    let content_type =
        HeaderValue::from_str(&decoded.mime).map_err(|_| ImageError::InvalidEncoding)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static(IMAGE_CACHE_CONTROL),
            ),
        ],
        decoded.bytes,
    )
        .into_response())
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_id(raw: &str) -> Result<TituloId, ImageError> {
    raw.parse().map_err(|_| ImageError::InvalidIdentifier)
}

/// Read the first file field named `file`.
///
/// Fields with other names, and `file` fields with a missing or empty file
/// name (a form submitted with no file selected), are skipped. The content
/// type is checked before any of the body is read; the body is rejected as
/// soon as it grows past the upload cap.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<ImageUpload>, ImageError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let Some(original_name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };

        let mime = field.content_type().unwrap_or_default().to_string();
        ImageService::check_mime(&mime)?;

        let data = read_capped(field).await?;
        return Ok(Some(ImageUpload {
            original_name,
            mime,
            data,
        }));
    }

    Ok(None)
}

async fn read_capped(mut field: Field<'_>) -> Result<bytes::Bytes, ImageError> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(ImageError::PayloadTooLarge {
                limit: MAX_UPLOAD_BYTES,
            });
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data.freeze())
}

fn multipart_error(e: MultipartError) -> ImageError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ImageError::PayloadTooLarge {
            limit: MAX_UPLOAD_BYTES,
        }
    } else {
        ImageError::MalformedUpload(e.body_text())
    }
}
