//! HTTP conversion service adapter

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::application::ports::{ConversionService, ServiceReply, UploadError};
use crate::domain::conversion::UploadRequest;

const UPLOAD_PATH: &str = "/upload_audio";
const DEBUG_PATH: &str = "/debug";

/// Talks to the conversion server over plain HTTP
pub struct HttpConversionService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpConversionService {
    /// Create a service client rooted at `base_url` (e.g. `http://127.0.0.1:5000`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_form(request: &UploadRequest) -> Form {
        let bytes = Part::bytes(request.payload().to_vec()).file_name(request.filename());
        let audio = match bytes.mime_str(request.declared_mime_type()) {
            Ok(part) => part,
            // An unparseable declared type still uploads, just without a content type
            Err(_) => Part::bytes(request.payload().to_vec()).file_name(request.filename()),
        };

        Form::new()
            .part("audio", audio)
            .text("format", request.target_format().as_str())
            .text("quality", request.target_quality().as_str())
    }

    fn network_error(&self, e: reqwest::Error) -> UploadError {
        let message = if e.is_connect() {
            format!(
                "Failed to connect to the conversion server at {}. Is it running?",
                self.base_url
            )
        } else if e.is_timeout() {
            "Request to the conversion server timed out.".to_string()
        } else {
            e.to_string()
        };
        UploadError::Network(message)
    }
}

#[async_trait]
impl ConversionService for HttpConversionService {
    async fn upload_audio(&self, request: &UploadRequest) -> Result<ServiceReply, UploadError> {
        let url = format!("{}{}", self.base_url, UPLOAD_PATH);
        debug!(
            %url,
            filename = %request.filename(),
            format = request.target_format().as_str(),
            quality = request.target_quality().as_str(),
            "POST multipart upload"
        );

        let response = self
            .client
            .post(&url)
            .multipart(Self::build_form(request))
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        Ok(ServiceReply { status, body })
    }

    async fn debug_info(&self) -> Result<serde_json::Value, UploadError> {
        let url = format!("{}{}", self.base_url, DEBUG_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Transport {
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }

    async fn fetch_artifact(&self, download_url: &str) -> Result<Vec<u8>, UploadError> {
        let url = self.resolve_url(download_url);
        debug!(%url, "GET converted file");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Transport {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.network_error(e))?;
        Ok(bytes.to_vec())
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
