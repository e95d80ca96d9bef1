//! Input resolution: image files on disk → [`ImageInput`].
//!
//! The MIME type is taken from the file extension (png, jpg, jpeg, webp and
//! gif). Files with an unknown or missing extension are sniffed from their
//! magic bytes instead.

use crate::error::CorrectionError;
use crate::output::ImageInput;
use std::path::Path;
use tracing::debug;

/// Extensions accepted as exercise images.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// MIME type for a supported extension (case-insensitive).
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// MIME type guessed from the leading bytes of the file.
pub fn mime_from_bytes(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::WebP => Some("image/webp"),
        image::ImageFormat::Gif => Some("image/gif"),
        _ => None,
    }
}

/// Read one image file and resolve its MIME type.
pub async fn load_image(path: &Path) -> Result<ImageInput, CorrectionError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CorrectionError::ImageNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => CorrectionError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => CorrectionError::Internal(format!("reading {}: {e}", path.display())),
    })?;

    let mime = mime_from_extension(path)
        .or_else(|| mime_from_bytes(&bytes))
        .ok_or_else(|| CorrectionError::UnsupportedImage {
            path: path.to_path_buf(),
        })?;

    debug!("Loaded image {} ({}, {} bytes)", path.display(), mime, bytes.len());
    Ok(ImageInput::new(bytes, mime))
}

/// Read several image files, keeping the given order.
pub async fn load_images<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ImageInput>, CorrectionError> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        images.push(load_image(path.as_ref()).await?);
    }
    Ok(images)
}
