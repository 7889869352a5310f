//! Capture session controller
//!
//! Owns the microphone stream and recorder for one recording attempt, applies
//! capture events through a single transition function, and hands the
//! assembled payload to the upload coordinator.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::capture::{
    accepts_bitrate, negotiate_mime_type, CaptureConstraints, FALLBACK_MIME_TYPE,
};
use crate::domain::config::DEFAULT_BITRATE;
use crate::domain::conversion::{ConversionResult, TargetFormat, TargetQuality};
use crate::domain::recording::{Duration, ElapsedTime};
use crate::domain::session::{
    AssemblyError, AudioPayload, FragmentBuffer, InvalidStateTransition, SessionLifecycle,
    SessionState,
};

use super::ports::{
    BusyIndicator, CaptureDevice, CaptureError, CaptureEvent, CaptureEventSender,
    ConversionService, MediaRecorder, MediaStream, RecorderOptions, UploadError,
};
use super::timer::{RecordingTimer, TickCallback};
use super::upload::UploadCoordinator;

/// Session failures. Every variant leaves the session in `Failed` with the
/// microphone released; none is fatal to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Microphone access was denied. Allow access to the microphone and try again.")]
    PermissionDenied,

    #[error("No microphone was found. Connect a microphone and try again.")]
    DeviceNotFound,

    #[error("Audio recording is not supported here: {0}")]
    UnsupportedEnvironment(String),

    #[error("No audio was recorded. Please try again.")]
    EmptyRecording,

    #[error("The recorded audio is empty. Please try again.")]
    EmptyPayload,

    #[error("Upload failed: server responded with HTTP {status}")]
    TransportError { status: u16 },

    #[error("Conversion failed: {message}")]
    ServiceError { message: String },

    #[error("{message}")]
    Other { message: String },

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
}

impl SessionError {
    /// Whether the user can simply record again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyRecording | Self::EmptyPayload)
    }
}

impl From<CaptureError> for SessionError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied => Self::PermissionDenied,
            CaptureError::DeviceNotFound => Self::DeviceNotFound,
            CaptureError::Unsupported(detail) => Self::UnsupportedEnvironment(detail),
            CaptureError::Other(message) => Self::Other { message },
        }
    }
}

impl From<AssemblyError> for SessionError {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::EmptyRecording => Self::EmptyRecording,
            AssemblyError::EmptyPayload => Self::EmptyPayload,
        }
    }
}

impl From<UploadError> for SessionError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::EmptyPayload => Self::EmptyPayload,
            UploadError::Transport { status } => Self::TransportError { status },
            UploadError::Service { message } => Self::ServiceError { message },
            other => Self::Other {
                message: other.to_string(),
            },
        }
    }
}

/// Capture settings for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub constraints: CaptureConstraints,
    /// Fragment emission interval
    pub timeslice: Duration,
    /// Bitrate requested when the negotiated type is WebM or Ogg
    pub bitrate: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            constraints: CaptureConstraints::default(),
            timeslice: Duration::default_timeslice(),
            bitrate: DEFAULT_BITRATE,
        }
    }
}

/// Outcome of applying one capture event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    FragmentStored { index: usize, size: usize },
    FragmentDiscarded,
    /// Finalize fired and a payload of this many bytes is ready
    Finalized { payload_bytes: usize },
    Failed(SessionError),
    /// The event did not apply to the current state
    Ignored,
}

/// One recording attempt.
///
/// State machine:
///   IDLE -> REQUESTING -> RECORDING (start)
///   RECORDING -> STOPPING (stop, or host hidden)
///   STOPPING -> PROCESSING (finalize event)
///   PROCESSING -> UPLOADED | FAILED (upload)
///   any -> FAILED (capture or upload error)
///   any -> IDLE (reset)
pub struct CaptureSession<D: CaptureDevice> {
    device: Arc<D>,
    settings: SessionSettings,
    lifecycle: SessionLifecycle,
    fragments: FragmentBuffer,
    negotiated_mime: Option<String>,
    stream: Option<D::Stream>,
    recorder: Option<D::Recorder>,
    events_tx: CaptureEventSender,
    events_rx: mpsc::UnboundedReceiver<CaptureEvent>,
    timer: RecordingTimer,
    on_tick: Option<TickCallback>,
    recorded_for: ElapsedTime,
    payload: Option<AudioPayload>,
    result: Option<ConversionResult>,
    failure: Option<SessionError>,
}

impl<D: CaptureDevice> CaptureSession<D> {
    pub fn new(device: Arc<D>, settings: SessionSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            device,
            settings,
            lifecycle: SessionLifecycle::new(),
            fragments: FragmentBuffer::new(),
            negotiated_mime: None,
            stream: None,
            recorder: None,
            events_tx,
            events_rx,
            timer: RecordingTimer::new(),
            on_tick: None,
            recorded_for: ElapsedTime::default(),
            payload: None,
            result: None,
            failure: None,
        }
    }

    /// Receive a tick every second while recording
    pub fn with_tick_callback(mut self, on_tick: TickCallback) -> Self {
        self.on_tick = Some(on_tick);
        self
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn negotiated_mime(&self) -> Option<&str> {
        self.negotiated_mime.as_deref()
    }

    pub fn holds_microphone(&self) -> bool {
        self.stream.is_some()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.timer.started_at()
    }

    /// Last classified failure, if the session is in `Failed`
    pub fn failure(&self) -> Option<&SessionError> {
        self.failure.as_ref()
    }

    /// Assembled payload, available while `Processing`
    pub fn payload(&self) -> Option<&AudioPayload> {
        self.payload.as_ref()
    }

    /// Conversion result, available once `Uploaded`
    pub fn result(&self) -> Option<&ConversionResult> {
        self.result.as_ref()
    }

    /// Live elapsed time while recording, frozen once stopped
    pub fn elapsed(&self) -> ElapsedTime {
        if self.lifecycle.is_recording() {
            self.timer.elapsed()
        } else {
            self.recorded_for
        }
    }

    /// Request the microphone and begin recording. Valid only from `Idle`.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        self.lifecycle.request_access()?;
        info!(constraints = ?self.settings.constraints, "Requesting microphone access");

        let stream = match self.device.request_stream(&self.settings.constraints).await {
            Ok(stream) => stream,
            Err(e) => return Err(self.fail(e.into())),
        };

        let negotiated = negotiate_mime_type(|mime| self.device.is_type_supported(mime));
        let options = RecorderOptions {
            mime_type: negotiated.map(str::to_string),
            audio_bits_per_second: negotiated
                .filter(|mime| accepts_bitrate(mime))
                .map(|_| self.settings.bitrate),
        };
        debug!(?options, "Negotiated recorder options");

        let recorder = self
            .device
            .open_recorder(&stream, &options, self.events_tx.clone());
        self.stream = Some(stream);

        let mut recorder = match recorder {
            Ok(recorder) => recorder,
            Err(e) => return Err(self.fail(e.into())),
        };
        let started = recorder.start(self.settings.timeslice);
        self.recorder = Some(recorder);
        if let Err(e) = started {
            return Err(self.fail(e.into()));
        }

        self.negotiated_mime = options.mime_type;
        self.lifecycle.access_granted()?;
        self.timer.start(Instant::now(), self.on_tick.clone());

        info!(
            mime_type = self.negotiated_mime.as_deref().unwrap_or("(recorder default)"),
            timeslice_ms = self.settings.timeslice.as_millis(),
            "Recording started"
        );
        Ok(())
    }

    /// Stop recording. Returns `false` without side effects unless `Recording`.
    ///
    /// The microphone is released right away; the payload becomes available
    /// once the recorder's finalize event has been applied.
    pub fn stop(&mut self) -> bool {
        if let Err(e) = self.lifecycle.begin_stop() {
            debug!(error = %e, "Ignoring stop");
            return false;
        }

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.stop();
        }
        self.release_microphone();
        self.recorded_for = self.timer.elapsed();
        self.timer.stop();

        info!(
            elapsed = %self.recorded_for,
            fragments = self.fragments.len(),
            bytes = self.fragments.total_bytes(),
            "Recording stopped"
        );
        true
    }

    /// Host reports the page/terminal is no longer visible.
    /// Returns whether this triggered a stop.
    pub fn on_visibility_hidden(&mut self) -> bool {
        if !self.lifecycle.is_recording() {
            return false;
        }
        warn!("Host hidden while recording, stopping");
        self.stop()
    }

    /// Wait for the next capture event and apply it.
    ///
    /// Returns `None` when no recorder is attached.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.recorder.as_ref()?;
        let event = self.events_rx.recv().await?;
        Some(self.handle_event(event))
    }

    /// Apply one capture event to the session
    pub fn handle_event(&mut self, event: CaptureEvent) -> SessionEvent {
        let outcome = match event {
            CaptureEvent::Fragment(data) => self.on_fragment(data),
            CaptureEvent::Finalized { mime_type } => self.on_finalized(mime_type),
            CaptureEvent::Error(message) => self.on_capture_error(message),
        };
        debug_assert!(
            self.lifecycle.state().may_hold_fragments() || self.fragments.is_empty(),
            "fragments buffered in {}",
            self.lifecycle.state()
        );
        outcome
    }

    /// After `stop`, wait for finalize and return the assembled payload
    pub async fn finish(&mut self) -> Result<&AudioPayload, SessionError> {
        while self.lifecycle.state() == SessionState::Stopping {
            let Some(event) = self.events_rx.recv().await else {
                break;
            };
            self.handle_event(event);
        }

        match self.lifecycle.state() {
            SessionState::Processing => self.payload.as_ref().ok_or(SessionError::EmptyRecording),
            SessionState::Failed => Err(self.failure.clone().unwrap_or(SessionError::Other {
                message: "Recording failed".to_string(),
            })),
            current_state => Err(InvalidStateTransition {
                current_state,
                action: "finish recording".to_string(),
            }
            .into()),
        }
    }

    /// Send the assembled payload for conversion. Valid only from `Processing`.
    pub async fn upload<S, B>(
        &mut self,
        coordinator: &UploadCoordinator<S, B>,
        format: TargetFormat,
        quality: TargetQuality,
    ) -> Result<&ConversionResult, SessionError>
    where
        S: ConversionService,
        B: BusyIndicator,
    {
        if self.lifecycle.state() != SessionState::Processing {
            return Err(InvalidStateTransition {
                current_state: self.lifecycle.state(),
                action: "upload recording".to_string(),
            }
            .into());
        }

        let Some(payload) = self.payload.take() else {
            return Err(self.fail(SessionError::EmptyRecording));
        };

        match coordinator.submit(payload, format, quality).await {
            Ok(result) => {
                self.lifecycle.uploaded()?;
                Ok(&*self.result.insert(result))
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Return to `Idle` from any state, releasing everything.
    ///
    /// Events still queued by the previous recorder are discarded.
    pub fn reset(&mut self) {
        if !self.lifecycle.is_idle() {
            info!(from = %self.lifecycle.state(), "Resetting session");
        }
        self.release_resources();
        self.negotiated_mime = None;
        self.recorded_for = ElapsedTime::default();
        self.payload = None;
        self.result = None;
        self.failure = None;
        self.timer.clear();

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.events_tx = events_tx;
        self.events_rx = events_rx;

        self.lifecycle.reset();
    }

    fn on_fragment(&mut self, data: Vec<u8>) -> SessionEvent {
        if !matches!(
            self.lifecycle.state(),
            SessionState::Recording | SessionState::Stopping
        ) {
            debug!(state = %self.lifecycle.state(), "Fragment outside recording");
            return SessionEvent::Ignored;
        }

        let size = data.len();
        if self.fragments.push(data) {
            SessionEvent::FragmentStored {
                index: self.fragments.len() - 1,
                size,
            }
        } else {
            SessionEvent::FragmentDiscarded
        }
    }

    fn on_finalized(&mut self, reported_mime: Option<String>) -> SessionEvent {
        if let Err(e) = self.lifecycle.finalized() {
            debug!(error = %e, "Ignoring finalize");
            return SessionEvent::Ignored;
        }
        self.recorder = None;

        let mime_type = reported_mime
            .filter(|m| !m.trim().is_empty())
            .or_else(|| self.negotiated_mime.clone())
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

        match self.fragments.assemble(mime_type) {
            Ok(payload) => {
                let payload_bytes = payload.size_bytes();
                info!(
                    bytes = payload_bytes,
                    mime_type = payload.mime_type(),
                    "Recording finalized"
                );
                self.payload = Some(payload);
                SessionEvent::Finalized { payload_bytes }
            }
            Err(e) => SessionEvent::Failed(self.fail(e.into())),
        }
    }

    fn on_capture_error(&mut self, message: String) -> SessionEvent {
        if !matches!(
            self.lifecycle.state(),
            SessionState::Recording | SessionState::Stopping
        ) {
            return SessionEvent::Ignored;
        }
        SessionEvent::Failed(self.fail(SessionError::Other { message }))
    }

    /// Move to `Failed`, release everything, and remember the cause
    fn fail(&mut self, err: SessionError) -> SessionError {
        warn!(error = %err, from = %self.lifecycle.state(), "Session failed");
        self.release_resources();
        self.lifecycle.fail();
        self.failure = Some(err.clone());
        err
    }

    fn release_resources(&mut self) {
        if self.lifecycle.is_recording() {
            self.recorded_for = self.timer.elapsed();
        }
        self.timer.stop();
        if let Some(mut recorder) = self.recorder.take() {
            recorder.stop();
        }
        self.release_microphone();
        self.fragments.clear();
        self.payload = None;
    }

    fn release_microphone(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            debug!("Microphone released");
        }
    }
}

impl<D: CaptureDevice> Drop for CaptureSession<D> {
    fn drop(&mut self) {
        self.timer.stop();
        self.release_microphone();
    }
}
