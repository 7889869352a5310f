//! Microphone access constraints

/// Target sample rate requested from the device
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Target channel count requested from the device
pub const TARGET_CHANNELS: u16 = 2;

/// Constraints passed along with a microphone access request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
    pub sample_rate: u32,
    pub channel_count: u16,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
            sample_rate: TARGET_SAMPLE_RATE,
            channel_count: TARGET_CHANNELS,
        }
    }
}
