//! Fragment buffering and payload assembly

use thiserror::Error;

use crate::domain::capture::AudioContainer;

/// Reasons a recording cannot be turned into a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("No audio was recorded. Please try again.")]
    EmptyRecording,

    #[error("The recorded audio is empty. Please try again.")]
    EmptyPayload,
}

/// Ordered sequence of captured fragments
#[derive(Debug, Default)]
pub struct FragmentBuffer {
    fragments: Vec<Vec<u8>>,
}

impl FragmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Zero-size fragments are dropped and `false` is returned.
    pub fn push(&mut self, fragment: Vec<u8>) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.fragments.push(fragment);
        true
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.fragments.iter().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    /// Concatenate and drain all fragments into one payload.
    ///
    /// The buffer is empty afterwards whether or not assembly succeeds.
    pub fn assemble(&mut self, mime_type: impl Into<String>) -> Result<AudioPayload, AssemblyError> {
        let fragments = std::mem::take(&mut self.fragments);
        if fragments.is_empty() {
            return Err(AssemblyError::EmptyRecording);
        }

        let data = fragments.concat();
        if data.is_empty() {
            return Err(AssemblyError::EmptyPayload);
        }

        Ok(AudioPayload::new(data, mime_type))
    }
}

/// A finished recording ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    data: Vec<u8>,
    mime_type: String,
}

impl AudioPayload {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn container(&self) -> AudioContainer {
        AudioContainer::from_mime(&self.mime_type)
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_fragments_are_discarded() {
        let mut buffer = FragmentBuffer::new();
        assert!(buffer.push(vec![1; 100]));
        assert!(!buffer.push(Vec::new()));
        assert!(buffer.push(vec![2; 250]));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.total_bytes(), 350);
    }

    #[test]
    fn assembled_length_is_sum_of_fragments() {
        let sizes = [[1usize, 2, 3], [1000, 1, 7], [4096, 4096, 4096]];
        for set in sizes {
            let mut buffer = FragmentBuffer::new();
            for (i, size) in set.iter().enumerate() {
                buffer.push(vec![i as u8; *size]);
            }
            let payload = buffer.assemble("audio/webm").unwrap();
            assert_eq!(payload.size_bytes(), set.iter().sum::<usize>());
        }
    }

    #[test]
    fn assembly_preserves_emission_order() {
        let mut buffer = FragmentBuffer::new();
        buffer.push(vec![1, 2]);
        buffer.push(vec![3]);
        buffer.push(vec![4, 5, 6]);
        let payload = buffer.assemble("audio/ogg").unwrap();
        assert_eq!(payload.data(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(payload.mime_type(), "audio/ogg");
    }

    #[test]
    fn assembly_drains_buffer() {
        let mut buffer = FragmentBuffer::new();
        buffer.push(vec![9; 10]);
        buffer.assemble("audio/webm").unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn empty_buffer_is_empty_recording() {
        let mut buffer = FragmentBuffer::new();
        buffer.push(Vec::new());
        assert_eq!(
            buffer.assemble("audio/webm").unwrap_err(),
            AssemblyError::EmptyRecording
        );
    }

    #[test]
    fn payload_container() {
        let payload = AudioPayload::new(vec![0; 4], "audio/mp4;codecs=mp4a.40.2");
        assert_eq!(payload.container(), AudioContainer::Mp4);
    }

    #[test]
    fn human_readable_size() {
        assert_eq!(AudioPayload::new(vec![0; 500], "audio/wav").human_readable_size(), "500 B");
        assert_eq!(AudioPayload::new(vec![0; 2048], "audio/wav").human_readable_size(), "2.0 KB");
        assert_eq!(
            AudioPayload::new(vec![0; 2 * 1024 * 1024], "audio/wav").human_readable_size(),
            "2.0 MB"
        );
    }
}
