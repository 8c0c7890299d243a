use crate::api::error::AppError;
use crate::services::pptx::{InflateLimits, MemorySink, PptxPackage, Presentation, parse_package};
use crate::utils::hash::calculate_hash;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub const PRESENTATION_FILE: &str = "presentation.json";

#[derive(Debug, Clone, Serialize)]
pub struct StoredTemplate {
    pub id: String,
    pub filename: String,
    pub sha256: String,
    pub size: usize,
    pub uploaded_at: DateTime<Utc>,
    pub presentation: Arc<Presentation>,
}

/// Parsed templates, kept in memory and mirrored to `storage_dir/<id>/`.
pub struct TemplateStore {
    templates: DashMap<String, StoredTemplate>,
    storage_dir: PathBuf,
    limits: InflateLimits,
}

impl TemplateStore {
    pub fn new(storage_dir: impl Into<PathBuf>, limits: InflateLimits) -> Self {
        Self {
            templates: DashMap::new(),
            storage_dir: storage_dir.into(),
            limits,
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<StoredTemplate> {
        self.templates.get(id).map(|entry| entry.value().clone())
    }

    /// Parse an uploaded package, persist its JSON and assets, and register it.
    pub async fn ingest(&self, filename: String, bytes: Bytes) -> Result<StoredTemplate, AppError> {
        let size = bytes.len();
        let sha256 = calculate_hash(&bytes);

        let limits = self.limits;
        let (presentation, sink) = tokio::task::spawn_blocking(move || {
            let mut sink = MemorySink::new();
            let package = PptxPackage::with_limits(bytes.to_vec(), limits)?;
            parse_package(package, &mut sink).map(|p| (p, sink))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Parser task failed: {}", e)))??;

        let id = Uuid::new_v4().to_string();
        self.persist(&id, &presentation, &sink).await?;

        let template = StoredTemplate {
            id: id.clone(),
            filename,
            sha256,
            size,
            uploaded_at: Utc::now(),
            presentation: Arc::new(presentation),
        };
        self.templates.insert(id, template.clone());

        tracing::info!(
            "Stored template {} ({}) with {} slides and {} assets",
            template.id,
            template.filename,
            template.presentation.slides.len(),
            sink.assets.len()
        );
        Ok(template)
    }

    async fn persist(
        &self,
        id: &str,
        presentation: &Presentation,
        sink: &MemorySink,
    ) -> Result<(), AppError> {
        let dir = self.storage_dir.join(id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create {}: {}", dir.display(), e)))?;

        for (name, data) in &sink.assets {
            tokio::fs::write(dir.join(name), data)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to write asset {}: {}", name, e)))?;
        }

        let json = serde_json::to_vec_pretty(presentation)
            .map_err(|e| AppError::Internal(format!("Failed to encode presentation: {}", e)))?;
        tokio::fs::write(dir.join(PRESENTATION_FILE), json)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write presentation: {}", e)))?;
        Ok(())
    }
}
