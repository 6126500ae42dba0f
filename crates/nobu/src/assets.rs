//! Static asset classification.
//!
//! Assets are served byte-for-byte; classification only decides whether a
//! path is one, and which content type its extension implies.

use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "ico", "webp"];
const MEDIA_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mp3", "wav", "flac", "aac"];
const FONT_EXTENSIONS: &[&str] = &["woff", "woff2", "eot", "ttf", "otf"];

/// Kind of static asset a URL names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Media,
    Font,
}

impl AssetKind {
    /// Classify a URL path by its extension (case-insensitive).
    pub fn classify(path: &str) -> Option<Self> {
        let extension = extension_of(path)?.to_ascii_lowercase();
        let extension = extension.as_str();

        if IMAGE_EXTENSIONS.contains(&extension) {
            Some(AssetKind::Image)
        } else if MEDIA_EXTENSIONS.contains(&extension) {
            Some(AssetKind::Media)
        } else if FONT_EXTENSIONS.contains(&extension) {
            Some(AssetKind::Font)
        } else {
            None
        }
    }
}

/// Determine content type from file extension.
pub fn content_type(path: &str) -> &'static str {
    let extension = extension_of(path).map(str::to_ascii_lowercase);

    match extension.as_deref().unwrap_or("") {
        "js" | "mjs" => "application/javascript",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "eot" => "application/vnd.ms-fontobject",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        _ => "application/octet-stream",
    }
}

fn extension_of(path: &str) -> Option<&str> {
    Path::new(path).extension().and_then(|ext| ext.to_str())
}
