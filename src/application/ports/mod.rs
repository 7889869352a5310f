//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod busy;
pub mod capture;
pub mod config;
pub mod converter;

// Re-export common types
pub use busy::{BusyGuard, BusyIndicator};
pub use capture::{
    CaptureDevice, CaptureError, CaptureEvent, CaptureEventSender, MediaRecorder, MediaStream,
    RecorderOptions,
};
pub use config::ConfigStore;
pub use converter::{ConversionService, ServiceReply, UploadError};
