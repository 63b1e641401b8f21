//! Core type definitions shared by the storage and server layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMime {
    /// `image/png`
    Png,
    /// `image/jpeg`, also declared by some clients as `image/jpg`.
    Jpeg,
    /// `image/webp`
    Webp,
}

impl ImageMime {
    /// Match a declared content type against the allow-list.
    ///
    /// Matching is case-insensitive and exact: parameters such as
    /// `; charset=...` are not stripped, so `image/png; x=1` is rejected.
    pub fn parse(content_type: &str) -> Option<Self> {
        match content_type.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Guess the type from a file extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Canonical MIME string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
