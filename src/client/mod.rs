//! Template uploader.
//!
//! Holds at most one selected file and sends it to the backend as a
//! `multipart/form-data` POST with a single part named `file`. Outcomes are
//! reported through `tracing`; failures are logged and never retried.

pub mod transport;

use crate::config::ClientConfig;
use bytes::Bytes;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

pub use transport::{ReqwestTransport, UploadTransport};

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// The only error kind the uploader knows about. Network failures and
/// non-2xx responses end up here alike.
#[derive(Error, Debug)]
#[error("Upload failed: {reason}")]
pub struct UploadError {
    reason: String,
}

impl UploadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A file picked by the user: its name and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its final path component as the name.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        Ok(Self::new(name, bytes))
    }
}

/// Advisory extension filter, the equivalent of a file picker's `accept`.
#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: Vec<String>,
}

impl FileFilter {
    /// Parse a comma separated list such as `.pptx` or `.pptx,.potx`.
    pub fn parse(accept: &str) -> Self {
        let extensions = accept
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn matches(&self, filename: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

#[derive(Debug)]
pub enum UploadOutcome {
    /// No file was held, no request was made.
    NothingSelected,
    /// The server answered with a 2xx status. Non-JSON bodies are kept as a string.
    Delivered(Value),
    Failed(UploadError),
}

impl UploadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, UploadOutcome::Failed(_))
    }
}

pub struct TemplateUploader<T: UploadTransport = ReqwestTransport> {
    transport: T,
    endpoint: String,
    filter: FileFilter,
    selected: Option<SelectedFile>,
}

impl TemplateUploader<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(ReqwestTransport::new(), config)
    }
}

impl<T: UploadTransport> TemplateUploader<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            endpoint: config.upload_url.clone(),
            filter: FileFilter::parse(&config.accept),
            selected: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Replace the held file. The extension filter only produces a warning.
    pub fn select(&mut self, file: SelectedFile) {
        if !self.filter.matches(&file.name) {
            warn!(
                "Selected file '{}' does not match the expected extension filter",
                file.name
            );
        }
        self.selected = Some(file);
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Send the held file once. Does nothing when no file is held.
    pub async fn upload(&self) -> UploadOutcome {
        let Some(file) = self.selected.as_ref() else {
            return UploadOutcome::NothingSelected;
        };

        info!(
            "Uploading '{}' ({} bytes) to {}",
            file.name,
            file.bytes.len(),
            self.endpoint
        );

        match self.transport.post_file(&self.endpoint, file).await {
            Ok(body) => {
                info!("{}", body);
                UploadOutcome::Delivered(body)
            }
            Err(e) => {
                error!("{}", e);
                UploadOutcome::Failed(e)
            }
        }
    }
}
