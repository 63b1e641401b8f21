//! Failure cases of the image endpoint.

use thiserror::Error;

/// Errors returned by image uploads and fetches.
///
/// Every variant except [`ImageError::Internal`] is a client error. The
/// internal variant keeps its cause for server-side logging; its display
/// text is generic and safe to return to callers.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid ObjectId")]
    InvalidIdentifier,

    #[error("File required")]
    MissingFile,

    #[error("Image type not allowed: {0:?}")]
    UnsupportedMediaType(String),

    #[error("Image exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("Not found")]
    NotFound,

    #[error("Invalid base64")]
    InvalidEncoding,

    #[error("Error saving image")]
    Internal { cause: String },
}

impl ImageError {
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        Self::Internal {
            cause: cause.to_string(),
        }
    }
}

impl From<vitae_common::Error> for ImageError {
    fn from(e: vitae_common::Error) -> Self {
        Self::internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_internal_hides_cause() {
        let err = ImageError::internal("disk full at /srv/uploads/x.png");
        assert_eq!(err.to_string(), "Error saving image");
        assert_matches!(err, ImageError::Internal { cause } if cause.contains("disk full"));
    }

    #[test]
    fn test_from_common_error() {
        assert_matches!(
            ImageError::from(vitae_common::Error::database("locked")),
            ImageError::Internal { cause } if cause.contains("locked")
        );
    }
}
