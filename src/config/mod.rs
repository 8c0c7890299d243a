use crate::services::pptx::InflateLimits;
use crate::services::pptx::package::{DEFAULT_MAX_INFLATED_SIZE, DEFAULT_MAX_PART_SIZE};
use std::env;
use std::path::PathBuf;

/// Default address the uploader posts templates to.
pub const DEFAULT_UPLOAD_URL: &str = "http://127.0.0.1:8000/upload";

/// Extension hint shown to whoever picks the file. Never enforced.
pub const DEFAULT_ACCEPT: &str = ".pptx";

/// Server configuration for the template backend
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host (default: "127.0.0.1")
    pub host: String,

    /// Bind port (default: 8000)
    pub port: u16,

    /// Maximum template size in bytes (default: 64 MB)
    pub max_file_size: usize,

    /// Maximum decompressed size of a single package part (default: 64 MB)
    pub max_part_size: u64,

    /// Maximum decompressed size read from one package (default: 256 MB)
    pub max_inflated_size: u64,

    /// Directory where parsed templates and their assets are written (default: "./data/templates")
    pub storage_dir: PathBuf,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_file_size: 64 * 1024 * 1024, // 64 MB
            max_part_size: DEFAULT_MAX_PART_SIZE,
            max_inflated_size: DEFAULT_MAX_INFLATED_SIZE,
            storage_dir: PathBuf::from("./data/templates"),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(default.host),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            max_part_size: env::var("MAX_PART_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_part_size),

            max_inflated_size: env::var("MAX_INFLATED_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_inflated_size),

            storage_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.storage_dir),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (temp storage, any local frontend)
    pub fn development() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_file_size: 64 * 1024 * 1024,
            max_part_size: DEFAULT_MAX_PART_SIZE,
            max_inflated_size: DEFAULT_MAX_INFLATED_SIZE,
            storage_dir: env::temp_dir().join("ppt-mvp-templates"),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }

    /// Decompression limits applied to every uploaded package
    pub fn inflate_limits(&self) -> InflateLimits {
        InflateLimits {
            max_part_size: self.max_part_size,
            max_total_size: self.max_inflated_size,
        }
    }
}

/// Configuration for the template uploader
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint receiving the multipart POST (default: http://127.0.0.1:8000/upload)
    pub upload_url: String,

    /// Advisory extension filter (default: ".pptx")
    pub accept: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            upload_url: env::var("UPLOAD_URL").unwrap_or(default.upload_url),
            accept: env::var("UPLOAD_ACCEPT").unwrap_or(default.accept),
        }
    }

    /// Replace the endpoint, rejecting anything that is not an absolute http(s) URL.
    pub fn with_upload_url(mut self, raw: &str) -> anyhow::Result<Self> {
        let parsed = url::Url::parse(raw)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("Unsupported scheme '{}' in upload URL", parsed.scheme());
        }
        self.upload_url = parsed.to_string();
        Ok(self)
    }
}
