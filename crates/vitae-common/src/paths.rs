//! Path utilities for naming and locating uploaded files.
//!
//! Uploaded files live flat in a single directory and are exposed under the
//! [`UPLOADS_PREFIX`] URL prefix. These helpers convert between the two and
//! refuse anything that would escape the directory.

use std::path::Path;

/// URL prefix under which uploaded files are served.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Longest extension (without the dot) kept from an uploaded file name.
const MAX_EXTENSION_LEN: usize = 10;

/// Extract the extension to keep for an uploaded file.
///
/// Returns the lower-cased extension including the leading dot, or `None`
/// when the name has no usable extension. Extensions that are long or contain
/// anything other than ASCII alphanumerics are dropped.
///
/// # Examples
///
/// ```
/// use vitae_common::paths::upload_extension;
///
/// assert_eq!(upload_extension("scan.PNG").as_deref(), Some(".png"));
/// assert_eq!(upload_extension("C:\\fakepath\\photo.webp").as_deref(), Some(".webp"));
/// assert_eq!(upload_extension("README"), None);
/// assert_eq!(upload_extension(".hidden"), None);
/// ```
pub fn upload_extension(original_name: &str) -> Option<String> {
    // Browsers on some platforms send full client paths.
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    let ext = Path::new(base).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return None;
    }

    Some(format!(".{}", ext.to_ascii_lowercase()))
}

/// Server-relative URL path for a stored file name.
///
/// # Examples
///
/// ```
/// use vitae_common::paths::public_path;
///
/// assert_eq!(public_path("abc.png"), "/uploads/abc.png");
/// ```
pub fn public_path(file_name: &str) -> String {
    format!("{}/{}", UPLOADS_PREFIX, file_name)
}

/// Recover the stored file name from a server-relative URL path.
///
/// Only paths of the form `/uploads/<name>` where `<name>` is a single plain
/// file name are accepted.
///
/// # Examples
///
/// ```
/// use vitae_common::paths::stored_file_name;
///
/// assert_eq!(stored_file_name("/uploads/abc.png"), Some("abc.png"));
/// assert_eq!(stored_file_name("uploads/abc.png"), Some("abc.png"));
/// assert_eq!(stored_file_name("/uploads/../secret"), None);
/// assert_eq!(stored_file_name("/etc/passwd"), None);
/// ```
pub fn stored_file_name(public: &str) -> Option<&str> {
    let prefix = UPLOADS_PREFIX.trim_start_matches('/');
    let rest = public.trim_start_matches('/').strip_prefix(prefix)?;
    let name = rest.strip_prefix('/')?;

    if is_plain_file_name(name) {
        Some(name)
    } else {
        None
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
