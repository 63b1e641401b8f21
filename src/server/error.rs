//! HTTP mapping for [`ImageError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::images::ImageError;

/// JSON error body returned by the image routes.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable error code
    pub code: String,
}

impl ImageError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier
            | Self::MissingFile
            | Self::MalformedUpload(_)
            | Self::InvalidEncoding => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "invalid_identifier",
            Self::MissingFile => "missing_file",
            Self::UnsupportedMediaType(_) => "unsupported_media_type",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::MalformedUpload(_) => "malformed_upload",
            Self::NotFound => "not_found",
            Self::InvalidEncoding => "invalid_encoding",
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for ImageError {
    fn into_response(self) -> Response {
        if let Self::Internal { cause } = &self {
            tracing::error!(cause = %cause, "Image request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ImageError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ImageError::InvalidIdentifier, 400),
            (ImageError::MissingFile, 400),
            (ImageError::UnsupportedMediaType("image/gif".into()), 415),
            (ImageError::PayloadTooLarge { limit: 1 }, 413),
            (ImageError::MalformedUpload("eof".into()), 400),
            (ImageError::NotFound, 404),
            (ImageError::InvalidEncoding, 400),
            (ImageError::internal("boom"), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status().as_u16(), status, "{:?}", err);
        }
    }

    #[tokio::test]
    async fn test_client_error_body() {
        let (status, json) = body_json(ImageError::InvalidIdentifier).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid ObjectId");
        assert_eq!(json["code"], "invalid_identifier");
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let (status, json) = body_json(ImageError::internal("EACCES /srv/uploads")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Error saving image");
        assert_eq!(json["code"], "internal_error");
        assert!(!json.to_string().contains("EACCES"));
    }
}
