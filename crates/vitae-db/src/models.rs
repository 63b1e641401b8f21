//! Rust models for the stored documents.
//!
//! The `titulos` table keeps two nullable image columns; in Rust a record's
//! image is a single [`ImageRef`] so "both present" cannot be represented.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitae_common::TituloId;

/// Where a credential's image lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ImageRef {
    /// Server-relative path to a file in the upload directory.
    File(String),
    /// Base64 or `data:` URL stored in the document itself.
    Inline(String),
    /// No image.
    #[default]
    None,
}

impl ImageRef {
    /// Build from the two stored columns. Empty strings count as absent.
    pub fn from_columns(path: Option<String>, inline: Option<String>) -> Self {
        match (
            path.filter(|p| !p.is_empty()),
            inline.filter(|b| !b.is_empty()),
        ) {
            (Some(path), _) => Self::File(path),
            (None, Some(encoded)) => Self::Inline(encoded),
            (None, None) => Self::None,
        }
    }

    /// Split into `(imagen_path, imagen_base64)` column values.
    pub fn to_columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            Self::File(path) => (Some(path), None),
            Self::Inline(encoded) => (None, Some(encoded)),
            Self::None => (None, None),
        }
    }

    /// Path of the file-backed image, if any.
    pub fn file_path(&self) -> Option<&str> {
        match self {
            Self::File(path) => Some(path),
            _ => None,
        }
    }

    /// Encoded inline value, or `""` when the image is not inline.
    pub fn inline_value(&self) -> &str {
        match self {
            Self::Inline(encoded) => encoded,
            _ => "",
        }
    }
}

/// Credential record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Titulo {
    pub id: TituloId,
    pub nombre: String,
    pub institucion: Option<String>,
    pub image: ImageRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_columns() {
        assert_eq!(
            ImageRef::from_columns(Some("/uploads/a.png".into()), None),
            ImageRef::File("/uploads/a.png".into())
        );
        assert_eq!(
            ImageRef::from_columns(None, Some("QUJD".into())),
            ImageRef::Inline("QUJD".into())
        );
        assert_eq!(ImageRef::from_columns(None, None), ImageRef::None);
    }

    #[test]
    fn test_from_columns_empty_is_absent() {
        assert_eq!(
            ImageRef::from_columns(Some(String::new()), Some("QUJD".into())),
            ImageRef::Inline("QUJD".into())
        );
        assert_eq!(
            ImageRef::from_columns(Some(String::new()), Some(String::new())),
            ImageRef::None
        );
    }

    #[test]
    fn test_to_columns() {
        let file = ImageRef::File("/uploads/a.png".into());
        assert_eq!(file.to_columns(), (Some("/uploads/a.png"), None));

        let inline = ImageRef::Inline("QUJD".into());
        assert_eq!(inline.to_columns(), (None, Some("QUJD")));

        assert_eq!(ImageRef::None.to_columns(), (None, None));
    }

    #[test]
    fn test_inline_value_defaults_to_empty() {
        assert_eq!(ImageRef::File("/uploads/a.png".into()).inline_value(), "");
        assert_eq!(ImageRef::None.inline_value(), "");
        assert_eq!(ImageRef::Inline("QUJD".into()).inline_value(), "QUJD");
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_value(ImageRef::File("/uploads/a.png".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "file", "value": "/uploads/a.png"}));

        let json = serde_json::to_value(ImageRef::None).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "none"}));
    }
}
