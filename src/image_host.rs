//! Upload adapter for an external image host.
//!
//! The host is an opaque capability: image bytes go out, a public URL comes
//! back for the post's image list. There are no retries; when the host
//! misbehaves the caller simply publishes without an image.

use crate::config::ImageHostConfig;
use std::error::Error;
use std::path::Path;
use std::time::Duration;

pub struct ImageHost {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ImageHost {
    /// Build an upload client for the configured host.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(cfg: &ImageHostConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
            client,
        })
    }

    /// Upload the image at `path` and return its public URL.
    ///
    /// A refused or failed transfer yields `Ok(None)` after a warning; only
    /// a local read failure is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn upload(&self, path: &Path) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let mut form = reqwest::multipart::Form::new().part("image", part);
        if let Some(key) = &self.api_key {
            form = form.text("key", key.clone());
        }

        let response = match self.client.post(&self.endpoint).multipart(form).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "image upload failed");
                return Ok(None);
            }
        };
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "image host rejected upload");
            return Ok(None);
        }

        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "image host returned unreadable response");
                return Ok(None);
            }
        };
        // imgbb-style hosts nest the URL under data; plainer ones put it at
        // the top level.
        let url = body
            .pointer("/data/url")
            .or_else(|| body.get("url"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        if url.is_none() {
            tracing::warn!("image host response carried no url");
        }
        Ok(url)
    }
}
