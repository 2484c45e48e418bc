//! Configuration for the trainer backend.
//!
//! All configuration is loaded from environment variables.
//! The admin password is never logged.

use std::path::PathBuf;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default request body limit (10 MiB), large enough for base64 attachments
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,

    /// Server port
    pub port: u16,

    // === Storage ===
    /// Path of the JSON document holding all collections
    pub data_file: PathBuf,

    /// Root directory for static assets
    pub public_dir: PathBuf,

    /// Directory attachments are written to (served under `/uploads/`)
    pub uploads_dir: PathBuf,

    // === Limits ===
    /// Maximum request body size in bytes (default: 10MB)
    pub max_body_size: usize,

    // === Admin credential ===
    /// Username written into a freshly created document
    pub admin_username: String,

    /// Password written into a freshly created document
    pub admin_password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let public_dir: PathBuf = std::env::var("PUBLIC_DIR")
            .unwrap_or_else(|_| "public".to_string())
            .into();

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),

            data_file: std::env::var("DATA_FILE")
                .unwrap_or_else(|_| "data/db.json".to_string())
                .into(),
            uploads_dir: std::env::var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| public_dir.join("uploads")),
            public_dir,

            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),

            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
        }
    }

    /// Configuration rooted at a single directory (data file, public and
    /// uploads directories all live beneath it).
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let public_dir = root.join("public");
        Self {
            data_file: root.join("data").join("db.json"),
            uploads_dir: public_dir.join("uploads"),
            public_dir,
            ..Self::from_env()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
