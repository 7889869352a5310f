//! Recording format negotiation and container detection

use std::fmt;

/// Encoding options tried in order when a recording starts.
///
/// Opus in WebM gives the best size/quality ratio where supported; the MP4
/// variants cover engines without WebM support. WAV is the last resort.
pub const PREFERRED_MIME_TYPES: [&str; 7] = [
    "audio/webm;codecs=opus",
    "audio/webm",
    "audio/mp4;codecs=mp4a.40.2",
    "audio/mp4",
    "audio/ogg;codecs=opus",
    "audio/ogg",
    "audio/wav",
];

/// Type assumed when neither the recorder nor negotiation produced one
pub const FALLBACK_MIME_TYPE: &str = "audio/webm";

/// Pick the first preferred type the capture subsystem supports.
///
/// Returns `None` when nothing in the list is supported, in which case the
/// recorder is opened without an explicit type and chooses its own default.
pub fn negotiate_mime_type<F>(is_supported: F) -> Option<&'static str>
where
    F: Fn(&str) -> bool,
{
    PREFERRED_MIME_TYPES
        .iter()
        .copied()
        .find(|candidate| is_supported(candidate))
}

/// Whether an explicit bitrate should be requested for this type
pub fn accepts_bitrate(mime_type: &str) -> bool {
    let lower = mime_type.to_ascii_lowercase();
    lower.contains("webm") || lower.contains("ogg")
}

/// Audio container, derived from a MIME type string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioContainer {
    #[default]
    Webm,
    Mp4,
    Ogg,
    Wav,
}

impl AudioContainer {
    /// Classify a MIME type by substring. Anything unrecognized is WebM.
    pub fn from_mime(mime_type: &str) -> Self {
        let lower = mime_type.to_ascii_lowercase();
        if lower.contains("mp4") {
            Self::Mp4
        } else if lower.contains("ogg") {
            Self::Ogg
        } else if lower.contains("wav") {
            Self::Wav
        } else {
            Self::Webm
        }
    }

    /// File extension used when uploading
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "m4a",
            Self::Ogg => "ogg",
            Self::Wav => "wav",
        }
    }

    /// Upload filename, `recording.<ext>`
    pub fn upload_filename(&self) -> String {
        format!("recording.{}", self.extension())
    }
}

impl fmt::Display for AudioContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}
