//! Microphone capture using cpal
//!
//! `cpal::Stream` is not `Send`, so each stream lives on its own OS thread.
//! The handle returned to the session only carries the shared sample buffer,
//! a stop flag and the thread handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::thread::{self, JoinHandle as ThreadHandle};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::wav::{encode_samples, f32_to_i16, pcm_spec, WAV_MIME_TYPE};
use crate::application::ports::{
    CaptureDevice, CaptureError, CaptureEvent, CaptureEventSender, MediaRecorder, MediaStream,
    RecorderOptions,
};
use crate::domain::capture::CaptureConstraints;
use crate::domain::recording::Duration;

/// Interleaved 16-bit samples shared between the audio callback and the recorder
type SampleBuffer = Arc<StdMutex<Vec<i16>>>;

/// Where stream errors go once a recorder is attached
type ErrorSink = Arc<StdMutex<Option<CaptureEventSender>>>;

/// How often the stream thread wakes to check its stop flag
const STOP_POLL: StdDuration = StdDuration::from_millis(100);

/// Capture device backed by the default cpal input
#[derive(Debug, Default)]
pub struct CpalCaptureDevice;

impl CpalCaptureDevice {
    pub fn new() -> Self {
        Self
    }

    fn input_device() -> Result<cpal::Device, CaptureError> {
        cpal::default_host()
            .default_input_device()
            .ok_or(CaptureError::DeviceNotFound)
    }

    /// Prefer a config that covers the requested rate and channel count,
    /// then any config covering the rate, then the device default.
    fn input_config(
        device: &cpal::Device,
        constraints: &CaptureConstraints,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let wanted_rate = constraints.sample_rate;
        let ranges: Vec<_> = device
            .supported_input_configs()
            .map_err(|e| match e {
                cpal::SupportedStreamConfigsError::DeviceNotAvailable => {
                    CaptureError::DeviceNotFound
                }
                other => classify_message(other.to_string()),
            })?
            .filter(|range| {
                matches!(range.sample_format(), SampleFormat::I16 | SampleFormat::F32)
            })
            .filter(|range| {
                range.min_sample_rate().0 <= wanted_rate && range.max_sample_rate().0 >= wanted_rate
            })
            .collect();

        let chosen = ranges
            .iter()
            .find(|range| range.channels() == constraints.channel_count)
            .or_else(|| ranges.first())
            .cloned()
            .map(|range| range.with_sample_rate(SampleRate(wanted_rate)));

        let supported = match chosen {
            Some(config) => config,
            None => device
                .default_input_config()
                .map_err(|e| CaptureError::Unsupported(e.to_string()))?,
        };

        let sample_format = supported.sample_format();
        if !matches!(sample_format, SampleFormat::I16 | SampleFormat::F32) {
            return Err(CaptureError::Unsupported(format!(
                "sample format {:?}",
                sample_format
            )));
        }

        Ok((supported.config(), sample_format))
    }

    /// Build and play the input stream, then park until asked to stop.
    /// Runs on the stream's own thread.
    fn run_stream(
        constraints: CaptureConstraints,
        shared: StreamShared,
        ready: oneshot::Sender<Result<StreamConfig, CaptureError>>,
    ) {
        let opened = Self::input_device().and_then(|device| {
            let (config, format) = Self::input_config(&device, &constraints)?;
            let stream = build_stream(&device, &config, format, &shared)?;
            stream
                .play()
                .map_err(|e| classify_message(e.to_string()))?;
            Ok((stream, config))
        });

        let stream = match opened {
            Ok((stream, config)) => {
                let _ = ready.send(Ok(config));
                stream
            }
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        while !shared.stop.load(Ordering::SeqCst) {
            thread::park_timeout(STOP_POLL);
        }
        drop(stream);
        debug!("Input stream closed");
    }
}

/// State shared between the stream thread, its handle, and the recorder
#[derive(Clone)]
struct StreamShared {
    samples: SampleBuffer,
    capturing: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    errors: ErrorSink,
}

impl StreamShared {
    fn new() -> Self {
        Self {
            samples: Arc::new(StdMutex::new(Vec::new())),
            capturing: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            errors: Arc::new(StdMutex::new(None)),
        }
    }

    fn push(&self, data: &[i16]) {
        if self.capturing.load(Ordering::SeqCst) {
            lock(&self.samples).extend_from_slice(data);
        }
    }

    fn report(&self, err: cpal::StreamError) {
        warn!(error = %err, "Audio stream error");
        if let Some(events) = lock(&self.errors).as_ref() {
            let _ = events.send(CaptureEvent::Error(err.to_string()));
        }
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    format: SampleFormat,
    shared: &StreamShared,
) -> Result<cpal::Stream, CaptureError> {
    let data_shared = shared.clone();
    let error_shared = shared.clone();

    let built = match format {
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| data_shared.push(data),
            move |err| error_shared.report(err),
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| data_shared.push(&f32_to_i16(data)),
            move |err| error_shared.report(err),
            None,
        ),
        other => {
            return Err(CaptureError::Unsupported(format!(
                "sample format {:?}",
                other
            )))
        }
    };

    built.map_err(|e| match e {
        cpal::BuildStreamError::DeviceNotAvailable => CaptureError::DeviceNotFound,
        cpal::BuildStreamError::StreamConfigNotSupported => {
            CaptureError::Unsupported("stream configuration not supported".to_string())
        }
        other => classify_message(other.to_string()),
    })
}

/// Map a backend error message onto the capture taxonomy
fn classify_message(message: String) -> CaptureError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission") || lower.contains("access") || lower.contains("denied") {
        CaptureError::PermissionDenied
    } else {
        CaptureError::Other(message)
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl CaptureDevice for CpalCaptureDevice {
    type Stream = CpalStream;
    type Recorder = CpalRecorder;

    async fn request_stream(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<CpalStream, CaptureError> {
        if constraints.echo_cancellation
            || constraints.noise_suppression
            || constraints.auto_gain_control
        {
            debug!("Voice processing constraints are left to the OS audio stack");
        }

        let shared = StreamShared::new();
        let (ready_tx, ready_rx) = oneshot::channel();
        let thread_shared = shared.clone();
        let constraints = *constraints;

        let thread = thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || CpalCaptureDevice::run_stream(constraints, thread_shared, ready_tx))
            .map_err(|e| CaptureError::Other(format!("Failed to spawn capture thread: {}", e)))?;

        let config = match ready_rx.await {
            Ok(result) => result,
            Err(_) => Err(CaptureError::Other(
                "Capture thread exited before opening the device".to_string(),
            )),
        };

        match config {
            Ok(config) => {
                info!(
                    sample_rate = config.sample_rate.0,
                    channels = config.channels,
                    "Microphone opened"
                );
                Ok(CpalStream {
                    shared,
                    sample_rate: config.sample_rate.0,
                    channels: config.channels,
                    thread: Some(thread),
                })
            }
            Err(e) => {
                let _ = thread.join();
                Err(e)
            }
        }
    }

    fn open_recorder(
        &self,
        stream: &CpalStream,
        options: &RecorderOptions,
        events: CaptureEventSender,
    ) -> Result<CpalRecorder, CaptureError> {
        if let Some(mime_type) = options.mime_type.as_deref() {
            if !self.is_type_supported(mime_type) {
                return Err(CaptureError::Unsupported(format!(
                    "recording as {}",
                    mime_type
                )));
            }
        }
        if !stream.is_active() {
            return Err(CaptureError::Other("Microphone stream is closed".to_string()));
        }

        *lock(&stream.shared.errors) = Some(events.clone());

        Ok(CpalRecorder {
            shared: stream.shared.clone(),
            pump: Arc::new(StdMutex::new(FragmentPump {
                samples: stream.shared.samples.clone(),
                sample_rate: stream.sample_rate,
                channels: stream.channels,
                header_sent: false,
                finished: false,
                events,
            })),
            ticker: None,
        })
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        mime_type.eq_ignore_ascii_case(WAV_MIME_TYPE)
    }
}

/// Open microphone. Dropping or stopping it closes the device.
pub struct CpalStream {
    shared: StreamShared,
    sample_rate: u32,
    channels: u16,
    thread: Option<ThreadHandle<()>>,
}

impl MediaStream for CpalStream {
    /// Signals the stream thread and returns without waiting for it, so it
    /// is safe to call from a runtime worker.
    fn stop_tracks(&mut self) {
        self.shared.capturing.store(false, Ordering::SeqCst);
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = &self.thread {
            thread.thread().unpark();
        }
    }

    fn is_active(&self) -> bool {
        self.thread.is_some() && !self.shared.stop.load(Ordering::SeqCst)
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.stop_tracks();
        // Detached: the unparked thread closes the device on its own
        self.thread.take();
    }
}

/// Turns buffered samples into fragments. Sends happen under the pump's
/// lock so the final flush cannot interleave with a periodic one.
struct FragmentPump {
    samples: SampleBuffer,
    sample_rate: u32,
    channels: u16,
    header_sent: bool,
    finished: bool,
    events: CaptureEventSender,
}

impl FragmentPump {
    fn flush(&mut self) {
        let drained = std::mem::take(&mut *lock(&self.samples));
        if drained.is_empty() {
            return;
        }

        let mut fragment = if self.header_sent {
            Vec::with_capacity(drained.len() * 2)
        } else {
            self.header_sent = true;
            pcm_spec(self.sample_rate, self.channels).into_header_for_infinite_file()
        };
        fragment.extend(encode_samples(&drained));

        let _ = self.events.send(CaptureEvent::Fragment(fragment));
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.flush();
        self.finished = true;
        let _ = self.events.send(CaptureEvent::Finalized {
            mime_type: Some(WAV_MIME_TYPE.to_string()),
        });
    }
}

/// Emits a WAV fragment every timeslice while started
pub struct CpalRecorder {
    shared: StreamShared,
    pump: Arc<StdMutex<FragmentPump>>,
    ticker: Option<JoinHandle<()>>,
}

impl MediaRecorder for CpalRecorder {
    fn start(&mut self, timeslice: Duration) -> Result<(), CaptureError> {
        if self.ticker.is_some() {
            return Ok(());
        }
        lock(&self.shared.samples).clear();
        self.shared.capturing.store(true, Ordering::SeqCst);

        let period = timeslice.as_std();
        let pump = Arc::clone(&self.pump);
        self.ticker = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let mut guard = lock(&pump);
                if guard.finished {
                    break;
                }
                guard.flush();
            }
        }));
        Ok(())
    }

    fn stop(&mut self) {
        self.shared.capturing.store(false, Ordering::SeqCst);
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        lock(&self.pump).finish();
        lock(&self.shared.errors).take();
    }
}

impl Drop for CpalRecorder {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
