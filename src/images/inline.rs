//! Inline image decoding.
//!
//! Inline images are stored either as raw base64 or as a data URL
//! (`data:<mime>;base64,<payload>`). Raw values are assumed to be JPEG.

use std::sync::LazyLock;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use regex::Regex;
use thiserror::Error;

/// MIME type assumed for raw base64 values.
pub const DEFAULT_INLINE_MIME: &str = "image/jpeg";

static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(.+);base64,((?s:.*))$").expect("data URL pattern is valid")
});

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

#[derive(Debug, Error)]
pub enum InlineDecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid mime type {0:?}")]
    Mime(String),
}

/// A decoded inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Decode a stored inline value.
///
/// An empty value decodes to an empty JPEG body.
pub fn decode_inline(value: &str) -> Result<DecodedImage, InlineDecodeError> {
    let (mime, payload) = match DATA_URL.captures(value) {
        Some(caps) => {
            let mime = caps.get(1).map_or("", |m| m.as_str()).trim();
            let payload = caps.get(2).map_or("", |m| m.as_str());
            (mime, payload)
        }
        None => (DEFAULT_INLINE_MIME, value),
    };

    if mime.is_empty() || !mime.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
        return Err(InlineDecodeError::Mime(mime.to_string()));
    }

    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = match STANDARD_LENIENT.decode(&compact) {
        Ok(bytes) => bytes,
        Err(standard_err) => URL_SAFE_LENIENT
            .decode(&compact)
            .map_err(|_| standard_err)?,
    };

    Ok(DecodedImage {
        mime: mime.to_string(),
        bytes,
    })
}

/// Encode bytes as a data URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
