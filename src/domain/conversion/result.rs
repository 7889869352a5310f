//! Upload request and conversion result

use serde::{Deserialize, Serialize};

use crate::domain::capture::AudioContainer;
use crate::domain::session::AudioPayload;

use super::options::{TargetFormat, TargetQuality};

/// Message used when the service reports failure without saying why
pub const GENERIC_FAILURE_MESSAGE: &str = "Conversion failed";

/// Everything sent to the conversion service for one recording
#[derive(Debug, Clone)]
pub struct UploadRequest {
    payload: Vec<u8>,
    declared_mime_type: String,
    target_format: TargetFormat,
    target_quality: TargetQuality,
}

impl UploadRequest {
    pub fn new(payload: AudioPayload, format: TargetFormat, quality: TargetQuality) -> Self {
        let declared_mime_type = payload.mime_type().to_string();
        Self {
            payload: payload.into_data(),
            declared_mime_type,
            target_format: format,
            target_quality: quality,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn declared_mime_type(&self) -> &str {
        &self.declared_mime_type
    }

    pub fn target_format(&self) -> TargetFormat {
        self.target_format
    }

    pub fn target_quality(&self) -> TargetQuality {
        self.target_quality
    }

    pub fn container(&self) -> AudioContainer {
        AudioContainer::from_mime(&self.declared_mime_type)
    }

    /// Name of the multipart file part, `recording.<ext>`
    pub fn filename(&self) -> String {
        self.container().upload_filename()
    }
}

/// Artifact descriptor returned by the conversion service.
///
/// Field contents are display strings and are not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, rename = "file_size")]
    pub file_size_label: Option<String>,
    #[serde(default, rename = "format")]
    pub resolved_format: Option<String>,
    #[serde(default, rename = "quality")]
    pub resolved_quality: Option<String>,
    #[serde(default, rename = "error")]
    pub error_message: Option<String>,
}

impl ConversionResult {
    /// Service-supplied error, or a generic message
    pub fn failure_message(&self) -> String {
        self.error_message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
    }
}
