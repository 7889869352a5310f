//! Capture domain module

mod constraints;
mod mime;

pub use constraints::{CaptureConstraints, TARGET_CHANNELS, TARGET_SAMPLE_RATE};
pub use mime::{
    accepts_bitrate, negotiate_mime_type, AudioContainer, FALLBACK_MIME_TYPE,
    PREFERRED_MIME_TYPES,
};
