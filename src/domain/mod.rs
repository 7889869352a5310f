//! Domain layer - Core business logic
//!
//! Contains value objects, the session state machine, and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod config;
pub mod conversion;
pub mod error;
pub mod recording;
pub mod session;

// Re-export common types
pub use capture::{AudioContainer, CaptureConstraints};
pub use config::AppConfig;
pub use conversion::{ConversionResult, TargetFormat, TargetQuality, UploadRequest};
pub use error::*;
pub use recording::{Duration, ElapsedTime};
pub use session::{AudioPayload, SessionState};
