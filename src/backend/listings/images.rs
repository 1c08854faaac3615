/**
 * Listing Image Uploads
 *
 * Listing images are not stored locally. The uploaded file is checked here
 * and forwarded as a multipart POST to the configured image service, which
 * stores a copy scaled to fit 500x500 and answers with its public URL.
 *
 * # Accepted Files
 *
 * - content type `image/<subtype>`
 * - extension `jpg`, `jpeg`, `png` or `webp`
 * - at most [`MAX_IMAGE_BYTES`]
 *
 * # Upstream Contract
 *
 * Request parts: `file`, `folder`, `transformation`. A configured API key is
 * sent as a bearer token. The JSON answer must contain `secure_url` or
 * `url`.
 */
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::backend::error::BackendError;
use crate::shared::{ImageServiceConfig, SharedError};

/// Largest accepted image
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Resize instruction understood by the image service
pub const TRANSFORMATION: &str = "c_limit,w_500,h_500";

/// An image file received from a client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), SharedError> {
        if !self.content_type.starts_with("image/") {
            return Err(SharedError::validation("image", "Only image files are allowed"));
        }

        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(SharedError::validation(
                "image",
                "Image must be a jpg, jpeg, png or webp file",
            ));
        }

        if self.bytes.is_empty() {
            return Err(SharedError::validation("image", "Image file is empty"));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(SharedError::validation("image", "Image must be 5MB or smaller"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Client for the external image service
#[derive(Clone)]
pub struct ImageUploader {
    config: ImageServiceConfig,
    client: Client,
}

impl ImageUploader {
    pub fn new(config: ImageServiceConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Validate and forward an image. Returns the hosted URL.
    ///
    /// Invalid files are a 400; any upstream failure is a 500.
    pub async fn upload(&self, image: ImageUpload) -> Result<String, BackendError> {
        image.validate()?;
        tracing::debug!(
            "[Images] Uploading {} ({} bytes) to {}",
            image.file_name,
            image.bytes.len(),
            self.config.url
        );

        let part = Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| BackendError::internal(format!("invalid image content type: {}", e)))?;
        let form = Form::new()
            .part("file", part)
            .text("folder", self.config.folder.clone())
            .text("transformation", TRANSFORMATION);

        let mut request = self.client.post(&self.config.url).multipart(form);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::internal(format!("image service unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(BackendError::internal(format!(
                "image service returned {}: {}",
                status, error_text
            )));
        }

        let body = response
            .json::<UploadResponse>()
            .await
            .map_err(|e| BackendError::internal(format!("invalid image service response: {}", e)))?;

        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| BackendError::internal("image service response has no url"))?;
        tracing::info!("[Images] Stored {} at {}", image.file_name, url);
        Ok(url)
    }
}
