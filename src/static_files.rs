//! Static asset responder for every non-API path.

use crate::attachments::UPLOADS_PREFIX;
use crate::handlers::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Document served for `/`
const INDEX_FILE: &str = "index.html";

/// Content type for a file, by extension
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("mp4") => "video/mp4",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// Turn a request path into a relative path with no way out of the root.
///
/// Returns `None` for paths containing `..` or backslashes.
pub fn normalize(request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Some(PathBuf::from(INDEX_FILE));
    }
    if trimmed.contains('\\') {
        return None;
    }

    let mut out = PathBuf::new();
    for segment in trimmed.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s => out.push(s),
        }
    }

    if out.as_os_str().is_empty() {
        Some(PathBuf::from(INDEX_FILE))
    } else {
        Some(out)
    }
}

/// Map a request path onto the filesystem
fn resolve(state: &AppState, request_path: &str) -> Option<PathBuf> {
    if let Some(rest) = request_path.strip_prefix(UPLOADS_PREFIX) {
        if rest.trim_matches('/').is_empty() {
            return None;
        }
        return normalize(rest).map(|relative| state.config.uploads_dir.join(relative));
    }

    normalize(request_path).map(|relative| state.config.public_dir.join(relative))
}

/// Fallback handler serving files from the public directory
pub async fn serve(State(state): State<AppState>, uri: Uri) -> Response {
    // Decode before normalizing so encoded `..` segments are rejected too
    let Ok(decoded) = percent_decode_str(uri.path()).decode_utf8() else {
        return not_found();
    };
    let Some(path) = resolve(&state, &decoded) else {
        return not_found();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            debug!(path = %path.display(), size = bytes.len(), "Serving static file");
            ([(header::CONTENT_TYPE, content_type(&path))], bytes).into_response()
        }
        Err(_) => not_found(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_maps_to_index() {
        assert_eq!(normalize("/"), Some(PathBuf::from("index.html")));
        assert_eq!(normalize(""), Some(PathBuf::from("index.html")));
        assert_eq!(normalize("//./"), Some(PathBuf::from("index.html")));
    }

    #[test]
    fn strips_leading_slashes_and_dot_segments() {
        assert_eq!(normalize("//css/./site.css"), Some(PathBuf::from("css/site.css")));
        assert_eq!(normalize("/img//logo.png"), Some(PathBuf::from("img/logo.png")));
    }

    #[test]
    fn rejects_traversal() {
        assert_eq!(normalize("/../secret"), None);
        assert_eq!(normalize("/a/../../b"), None);
        assert_eq!(normalize("/a\\..\\b"), None);
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type(Path::new("index.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("app.JS")), "text/javascript; charset=utf-8");
        assert_eq!(content_type(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(content_type(Path::new("archive.zip")), "application/octet-stream");
        assert_eq!(content_type(Path::new("README")), "application/octet-stream");
    }
}
