//! Application layer - Use cases and port interfaces
//!
//! Contains the capture session controller, the upload coordinator, and
//! the trait definitions for external system interactions.

pub mod ports;
pub mod session;
pub mod timer;
pub mod upload;

// Re-export use cases
pub use session::{CaptureSession, SessionError, SessionEvent, SessionSettings};
pub use timer::{RecordingTimer, TickCallback};
pub use upload::UploadCoordinator;
