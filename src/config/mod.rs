use std::env;

/// Runtime configuration for the archive service.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Maximum accepted artifact size in bytes (default: 64 MB)
    pub max_upload_size: usize,

    /// Artifact store backend: "filesystem" or "s3" (default: "filesystem")
    pub storage_backend: String,

    /// Base directory for the filesystem backend (default: "./artifacts")
    pub storage_root: String,

    /// HTTP listen port (default: 8080)
    pub port: u16,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 64 * 1024 * 1024, // 64 MB
            storage_backend: "filesystem".to_string(),
            storage_root: "./artifacts".to_string(),
            port: 8080,
        }
    }
}

impl ArchiveConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            storage_backend: env::var("STORAGE_BACKEND").unwrap_or(default.storage_backend),

            storage_root: env::var("STORAGE_ROOT").unwrap_or(default.storage_root),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),
        }
    }

    /// Config for tests and local development: filesystem storage only.
    pub fn development() -> Self {
        Self {
            max_upload_size: 64 * 1024 * 1024,
            storage_backend: "filesystem".to_string(),
            storage_root: "./artifacts".to_string(),
            port: 8080,
        }
    }
}
