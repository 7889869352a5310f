//! Capture subsystem port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::capture::CaptureConstraints;
use crate::domain::recording::Duration;

/// Capture errors, classified by cause
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Microphone access was denied")]
    PermissionDenied,

    #[error("No microphone was found")]
    DeviceNotFound,

    #[error("Audio capture is not supported: {0}")]
    Unsupported(String),

    #[error("Audio capture failed: {0}")]
    Other(String),
}

/// Events pushed by a running recorder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// One chunk of encoded audio
    Fragment(Vec<u8>),
    /// No more fragments will follow. Carries the type the recorder actually produced.
    Finalized { mime_type: Option<String> },
    /// The recorder failed while running
    Error(String),
}

/// Sending half of a session's event queue
pub type CaptureEventSender = mpsc::UnboundedSender<CaptureEvent>;

/// Options used when opening a recorder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderOptions {
    /// `None` lets the recorder choose its own default
    pub mime_type: Option<String>,
    pub audio_bits_per_second: Option<u32>,
}

/// Live microphone stream. Holding one means the device is open.
pub trait MediaStream: Send {
    /// Stop every track. Must be safe to call more than once.
    fn stop_tracks(&mut self);

    fn is_active(&self) -> bool;
}

/// Recorder attached to a stream
pub trait MediaRecorder: Send {
    /// Begin emitting a fragment every `timeslice`
    fn start(&mut self, timeslice: Duration) -> Result<(), CaptureError>;

    /// Flush buffered audio and emit `Finalized`. Later calls are ignored.
    fn stop(&mut self);
}

/// Port for microphone capture
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    type Stream: MediaStream;
    type Recorder: MediaRecorder;

    /// Ask for microphone access
    async fn request_stream(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Self::Stream, CaptureError>;

    /// Open a recorder that pushes its events into `events`
    fn open_recorder(
        &self,
        stream: &Self::Stream,
        options: &RecorderOptions,
        events: CaptureEventSender,
    ) -> Result<Self::Recorder, CaptureError>;

    /// Capability query for an encoding option
    fn is_type_supported(&self, mime_type: &str) -> bool;
}
