//! Object storage for uploaded photos and PDFs.
//!
//! The service only depends on the [`UploadGateway`] contract: hand over a
//! file, get back a permanent URL or an error. Nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;

use crate::settings::Config;

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[async_trait]
pub trait UploadGateway: Send + Sync {
    /// Stores the file and returns its permanent URL.
    async fn upload(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        content: Vec<u8>,
    ) -> anyhow::Result<String>;
}

/// Unsigned uploads to Cloudinary through an upload preset.
pub struct CloudinaryGateway {
    cloud_name: String,
    upload_preset: String,
    folder: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

impl CloudinaryGateway {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &Config, client: Client) -> Self {
        Self {
            cloud_name: config.cloudinary_cloud_name.clone(),
            upload_preset: config.cloudinary_upload_preset.clone(),
            folder: config.cloudinary_folder.clone(),
            client,
        }
    }

    /// PDFs must go through the `raw` resource type or Cloudinary rasterizes
    /// them; everything else is auto-detected.
    fn upload_url(&self, content_type: Option<&str>) -> String {
        let resource_type = match content_type {
            Some("application/pdf") => "raw",
            _ => "auto",
        };
        format!(
            "{}/{}/{}/upload",
            CLOUDINARY_API_BASE, self.cloud_name, resource_type
        )
    }
}

#[async_trait]
impl UploadGateway for CloudinaryGateway {
    async fn upload(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        content: Vec<u8>,
    ) -> anyhow::Result<String> {
        let mut part = multipart::Part::bytes(content).file_name(file_name.to_string());
        if let Some(content_type) = content_type {
            part = part.mime_str(content_type)?;
        }
        let form = multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", self.folder.clone());

        let response = self
            .client
            .post(self.upload_url(content_type))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            anyhow::bail!("cloudinary upload failed ({}): {}", status, body);
        }
        let body: CloudinaryUploadResponse = response.json().await?;
        Ok(body.secure_url)
    }
}
