use chrono::{DateTime, Utc};

/// Generate a collision-free object key for an uploaded file.
/// The client-supplied name is reduced to its final path component,
/// so a hostile filename cannot address outside the store root.
/// Format: {unix_millis}_{filename}
pub fn media_key(filename: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", now.timestamp_millis(), sanitize_filename(filename))
}

fn sanitize_filename(filename: &str) -> &str {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    if base.is_empty() || base == "." || base.contains("..") {
        "upload.bin"
    } else {
        base
    }
}

/// Reject keys that could escape the store root
pub fn validate_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/')
}

/// Playback URL for stores without a public HTTP face
pub fn play_url(key: &str) -> String {
    format!("/api/play/{}", key)
}

/// Content-Type for playback, by file extension
pub fn content_type(key: &str) -> &'static str {
    match key.rsplit('.').next().map(|ext| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "mp4" => "video/mp4",
        Some(ext) if ext == "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}
