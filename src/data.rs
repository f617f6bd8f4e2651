use std::path::Path;

use crate::error::{Error, Result};

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";
pub const GIF_MIME: &str = "image/gif";
pub const WEBP_MIME: &str = "image/webp";

/// An image read from disk, typed by content sniffing with an extension
/// fallback. Only PNG, JPEG, GIF, and WebP are accepted.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub name: Option<String>,
}

pub fn load_image(path: &Path) -> Result<ImageFile> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mime = detect_mime(&bytes, path)?.to_string();
    let name = path
        .file_name()
        .and_then(|value| value.to_str())
        .map(|value| value.to_string());
    Ok(ImageFile { bytes, mime, name })
}

fn detect_mime(bytes: &[u8], path: &Path) -> Result<&'static str> {
    let sniffed = infer::get(bytes).map(|kind| kind.mime_type());
    if let Some(mime) = sniffed.and_then(supported_mime) {
        return Ok(mime);
    }
    if let Some(mime) = extension_lower(path)
        .as_deref()
        .and_then(mime_from_extension)
    {
        return Ok(mime);
    }
    Err(Error::UnsupportedImage(
        sniffed.unwrap_or("unknown").to_string(),
    ))
}

fn supported_mime(mime: &str) -> Option<&'static str> {
    match mime {
        PNG_MIME => Some(PNG_MIME),
        JPEG_MIME | "image/jpg" => Some(JPEG_MIME),
        GIF_MIME => Some(GIF_MIME),
        WEBP_MIME => Some(WEBP_MIME),
        _ => None,
    }
}

fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_lowercase())
}

fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some(PNG_MIME),
        "jpg" | "jpeg" => Some(JPEG_MIME),
        "gif" => Some(GIF_MIME),
        "webp" => Some(WEBP_MIME),
        _ => None,
    }
}
