use super::{FILE_FIELD, SelectedFile, UploadError};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Issue exactly one POST carrying `file` and return the response body.
    async fn post_file(&self, endpoint: &str, file: &SelectedFile) -> Result<Value, UploadError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

#[async_trait]
impl UploadTransport for ReqwestTransport {
    async fn post_file(&self, endpoint: &str, file: &SelectedFile) -> Result<Value, UploadError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(mime::APPLICATION_OCTET_STREAM.as_ref())?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self.http.post(endpoint).multipart(form).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(UploadError::new(format!(
                "server responded with {}: {}",
                status, text
            )));
        }

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
