//! Conversion service port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversion::UploadRequest;

/// Upload and conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Nothing to upload: the recording is empty")]
    EmptyPayload,

    #[error("Server responded with HTTP {status}")]
    Transport { status: u16 },

    #[error("{message}")]
    Service { message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse server response: {0}")]
    InvalidResponse(String),

    #[error("Failed to save converted file: {0}")]
    SaveFailed(String),
}

/// Raw reply from the upload endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReply {
    pub status: u16,
    pub body: String,
}

impl ServiceReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Port for the remote conversion service
#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Send one recording. Only network failures are errors here;
    /// status and body interpretation belong to the caller.
    async fn upload_audio(&self, request: &UploadRequest) -> Result<ServiceReply, UploadError>;

    /// Diagnostic information from the service
    async fn debug_info(&self) -> Result<serde_json::Value, UploadError>;

    /// Fetch a converted file by its (possibly relative) download URL
    async fn fetch_artifact(&self, download_url: &str) -> Result<Vec<u8>, UploadError>;

    /// Turn a service-relative path into an absolute URL
    fn resolve_url(&self, path: &str) -> String;
}
