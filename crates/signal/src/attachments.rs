//! Attachment encoding for `/v2/send`.
//!
//! signal-cli takes attachments inline as data URIs:
//! `data:<mime>;filename=<name>;base64,<data>`.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};

const OCTET_STREAM: &str = "application/octet-stream";

pub fn data_uri(content_type: &str, filename: &str, data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    if filename.is_empty() {
        format!("data:{content_type};base64,{encoded}")
    } else {
        format!("data:{content_type};filename={filename};base64,{encoded}")
    }
}

/// Guess a MIME type from a file extension.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "aac" => "audio/aac",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "json" => "application/json",
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        _ => OCTET_STREAM,
    }
}

/// Sniff an image type from magic bytes. Returns MIME type and file extension.
pub fn sniff_image(data: &[u8]) -> (&'static str, &'static str) {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        ("image/png", "png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        ("image/jpeg", "jpg")
    } else if data.starts_with(b"GIF8") {
        ("image/gif", "gif")
    } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        ("image/webp", "webp")
    } else {
        (OCTET_STREAM, "bin")
    }
}

/// Final path component as a string, empty when there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
