//! Conversion domain module

mod options;
mod result;

pub use options::{TargetFormat, TargetQuality};
pub use result::{ConversionResult, UploadRequest, GENERIC_FAILURE_MESSAGE};
