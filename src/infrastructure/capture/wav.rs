//! Streaming WAV encoding for captured PCM

/// MIME type of everything this encoder produces
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// 16-bit integer PCM layout for the captured stream.
///
/// `into_header_for_infinite_file` on the result gives the header for a
/// stream whose length is not known yet, so it can go out with the first
/// fragment.
pub fn pcm_spec(sample_rate: u32, channels: u16) -> hound::WavSpec {
    hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Interleaved samples as little-endian bytes
pub fn encode_samples(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Convert float samples in [-1.0, 1.0] to 16-bit PCM
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
        .collect()
}
