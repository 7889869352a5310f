//! Upload coordinator: hands a finished recording to the conversion service

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::conversion::{ConversionResult, TargetFormat, TargetQuality, UploadRequest};
use crate::domain::session::AudioPayload;

use super::ports::{BusyGuard, BusyIndicator, ConversionService, ServiceReply, UploadError};

/// Message shown on the busy indicator during an upload
pub const UPLOADING_MESSAGE: &str = "Converting audio...";

/// Sends recordings to the conversion service and interprets its replies
pub struct UploadCoordinator<S, B>
where
    S: ConversionService,
    B: BusyIndicator,
{
    service: S,
    indicator: B,
}

impl<S, B> UploadCoordinator<S, B>
where
    S: ConversionService,
    B: BusyIndicator,
{
    pub fn new(service: S, indicator: B) -> Self {
        Self { service, indicator }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Upload one recording and return the converted artifact's descriptor.
    ///
    /// The busy indicator is visible for the whole exchange and cleared on
    /// every exit path.
    pub async fn submit(
        &self,
        payload: AudioPayload,
        format: TargetFormat,
        quality: TargetQuality,
    ) -> Result<ConversionResult, UploadError> {
        self.submit_request(UploadRequest::new(payload, format, quality))
            .await
    }

    /// Upload a prepared request
    pub async fn submit_request(
        &self,
        request: UploadRequest,
    ) -> Result<ConversionResult, UploadError> {
        if request.payload().is_empty() {
            return Err(UploadError::EmptyPayload);
        }

        let _busy = BusyGuard::show(&self.indicator, UPLOADING_MESSAGE);

        info!(
            filename = %request.filename(),
            mime_type = request.declared_mime_type(),
            bytes = request.payload().len(),
            format = %request.target_format(),
            quality = %request.target_quality(),
            "Uploading recording"
        );

        let reply = self.service.upload_audio(&request).await?;
        let result = Self::interpret_reply(reply);

        match &result {
            Ok(r) => info!(download_url = ?r.download_url, "Conversion succeeded"),
            Err(e) => warn!(error = %e, "Conversion failed"),
        }

        result
    }

    /// Apply the response contract: non-2xx is a transport error, and a
    /// 2xx body must say `success: true`.
    pub fn interpret_reply(reply: ServiceReply) -> Result<ConversionResult, UploadError> {
        if !reply.is_success() {
            debug!(status = reply.status, body = %reply.body, "Non-success status");
            return Err(UploadError::Transport {
                status: reply.status,
            });
        }

        let result: ConversionResult = serde_json::from_str(&reply.body)
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        if !result.success {
            return Err(UploadError::Service {
                message: result.failure_message(),
            });
        }

        Ok(result)
    }

    /// Absolute download URL for a successful result
    pub fn resolve_download_url(&self, result: &ConversionResult) -> Option<String> {
        result
            .download_url
            .as_deref()
            .map(|url| self.service.resolve_url(url))
    }

    /// Fetch the converted file and write it into `dir`.
    ///
    /// The file is named after the service-provided filename, falling back
    /// to the last segment of the download URL.
    pub async fn download(
        &self,
        result: &ConversionResult,
        dir: &Path,
    ) -> Result<PathBuf, UploadError> {
        let url = result
            .download_url
            .as_deref()
            .ok_or_else(|| UploadError::InvalidResponse("missing download_url".to_string()))?;

        let name = artifact_file_name(result)
            .ok_or_else(|| UploadError::InvalidResponse("missing filename".to_string()))?;

        let _busy = BusyGuard::show(&self.indicator, "Downloading...");
        let bytes = self.service.fetch_artifact(url).await?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| UploadError::SaveFailed(e.to_string()))?;

        let path = dir.join(name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| UploadError::SaveFailed(e.to_string()))?;

        info!(path = %path.display(), bytes = bytes.len(), "Saved converted file");
        Ok(path)
    }

    /// Diagnostic JSON from the service, passed through unchanged
    pub async fn debug_info(&self) -> Result<serde_json::Value, UploadError> {
        self.service.debug_info().await
    }
}

/// Safe local file name for a converted artifact
fn artifact_file_name(result: &ConversionResult) -> Option<String> {
    let candidate = result
        .filename
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .or_else(|| {
            result
                .download_url
                .as_deref()
                .and_then(|url| url.split(['?', '#']).next())
                .and_then(|path| path.rsplit('/').next())
        })?;

    // Strip any directory components the service may have sent
    Path::new(candidate)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
}
