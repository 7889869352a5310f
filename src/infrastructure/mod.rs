//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces:
//! cpal microphone capture, the HTTP conversion service, and XDG config.

pub mod capture;
pub mod config;
pub mod conversion;

// Re-export adapters
pub use capture::CpalCaptureDevice;
pub use config::XdgConfigStore;
pub use conversion::HttpConversionService;
