//! Ticket attachments.
//!
//! Uploads arrive as base64 (optionally wrapped in a data URI), are
//! decoded, and written to the uploads directory under a generated name.
//! Only the public path `/uploads/<name>` is stored on the message.

use base64::Engine;
use chrono::Utc;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// URL prefix attachments are served under
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Fallback name when nothing usable remains after sanitizing
const FALLBACK_NAME: &str = "attachment";

/// Longest sanitized original name kept in the generated filename
const MAX_NAME_LEN: usize = 100;

/// Attachment errors
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("invalid base64 payload")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("failed to write attachment: {0}")]
    Io(#[from] std::io::Error),
}

/// Remove a `data:<mime>;base64,` prefix if present
pub fn strip_data_uri(payload: &str) -> &str {
    let payload = payload.trim();
    if payload.starts_with("data:") {
        if let Some(idx) = payload.find(',') {
            return &payload[idx + 1..];
        }
    }
    payload
}

/// Reduce a client-supplied filename to a safe single path component
pub fn sanitize_file_name(name: &str) -> String {
    // Only the last component of whatever path the client sent
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Unique on-disk name: `<unix millis>-<8 hex>-<sanitized name>`
pub fn generate_file_name(original: Option<&str>) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &tag[..8],
        sanitize_file_name(original.unwrap_or(FALLBACK_NAME))
    )
}

/// Decode `payload` and write it into `uploads_dir`.
///
/// Returns the public path of the stored file.
pub async fn save(
    uploads_dir: &Path,
    payload: &str,
    original_name: Option<&str>,
) -> Result<String, AttachmentError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(strip_data_uri(payload))?;

    tokio::fs::create_dir_all(uploads_dir).await?;

    let file_name = generate_file_name(original_name);
    tokio::fs::write(uploads_dir.join(&file_name), &bytes).await?;

    info!(file_name = %file_name, size = bytes.len(), "Attachment stored");

    Ok(format!("{UPLOADS_PREFIX}{file_name}"))
}

/// Store an optional attachment, logging instead of failing.
///
/// A broken attachment must not lose the message it came with.
pub async fn save_best_effort(
    uploads_dir: &Path,
    payload: Option<&str>,
    original_name: Option<&str>,
) -> Option<String> {
    let payload = payload.filter(|p| !p.trim().is_empty())?;

    match save(uploads_dir, payload, original_name).await {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(error = %e, "Dropping attachment");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_uri_prefix() {
        assert_eq!(strip_data_uri("data:image/png;base64,aGVsbG8="), "aGVsbG8=");
        assert_eq!(strip_data_uri("aGVsbG8="), "aGVsbG8=");
        assert_eq!(strip_data_uri("  aGVsbG8=\n"), "aGVsbG8=");
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("photo 1.png"), "photo_1.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\temp\\x.jpg"), "x.jpg");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "attachment");
        assert_eq!(sanitize_file_name("日本"), "attachment");
    }

    #[test]
    fn generated_names_are_unique_and_keep_the_original() {
        let a = generate_file_name(Some("plan.pdf"));
        let b = generate_file_name(Some("plan.pdf"));

        assert_ne!(a, b);
        assert!(a.ends_with("-plan.pdf"));
        assert!(!a.contains('/'));
    }

    #[tokio::test]
    async fn save_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");

        let path = save(&uploads, "data:text/plain;base64,aGVsbG8=", Some("note.txt"))
            .await
            .unwrap();

        assert!(path.starts_with(UPLOADS_PREFIX));
        let name = path.trim_start_matches(UPLOADS_PREFIX);
        assert_eq!(std::fs::read(uploads.join(name)).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn invalid_payload_is_dropped() {
        let dir = tempfile::tempdir().unwrap();

        let stored = save_best_effort(dir.path(), Some("%%% not base64 %%%"), None).await;

        assert!(stored.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn empty_payload_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_best_effort(dir.path(), Some(""), Some("x.png")).await.is_none());
        assert!(save_best_effort(dir.path(), None, None).await.is_none());
    }
}
