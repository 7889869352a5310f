//! Microphone capture adapters

mod cpal_device;
mod wav;

pub use cpal_device::{CpalCaptureDevice, CpalRecorder, CpalStream};
pub use wav::WAV_MIME_TYPE;
