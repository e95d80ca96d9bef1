//! Image encoding: raw bytes → base64 data URL.
//!
//! Chat-completions providers accept inline images as
//! `data:<mime>;base64,<payload>` strings inside `image_url` content parts.
//! Images are sent untouched: no re-encoding, no downscaling. An image the
//! provider cannot handle comes back as a [`crate::CorrectionError::Transport`].

use crate::output::ImageInput;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Wrap one image as a data URL tagged with its declared MIME type.
pub fn to_data_url(image: &ImageInput) -> String {
    let b64 = STANDARD.encode(&image.bytes);
    debug!(
        "Encoded {} ({} bytes) → {} bytes base64",
        image.mime_type,
        image.bytes.len(),
        b64.len()
    );
    format!("data:{};base64,{}", image.mime_type, b64)
}

/// Encode every image, preserving input order.
pub fn encode_images(images: &[ImageInput]) -> Vec<String> {
    images.iter().map(to_data_url).collect()
}
