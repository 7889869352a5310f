//! Target format and quality accepted by the conversion service

use std::fmt;
use std::str::FromStr;

use crate::domain::error::{InvalidFormatError, InvalidQualityError};

/// Output format requested from the conversion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetFormat {
    #[default]
    Mp3,
    Wav,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 2] = [TargetFormat::Mp3, TargetFormat::Wav];

    /// Wire value sent in the `format` form field
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetFormat {
    type Err = InvalidFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            _ => Err(InvalidFormatError {
                input: s.to_string(),
            }),
        }
    }
}

/// MP3 bitrate requested from the conversion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum TargetQuality {
    Low,
    #[default]
    Standard,
    High,
    Best,
}

impl TargetQuality {
    pub const ALL: [TargetQuality; 4] = [
        TargetQuality::Low,
        TargetQuality::Standard,
        TargetQuality::High,
        TargetQuality::Best,
    ];

    pub const fn kbps(&self) -> u32 {
        match self {
            Self::Low => 128,
            Self::Standard => 192,
            Self::High => 256,
            Self::Best => 320,
        }
    }

    /// Wire value sent in the `quality` form field
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "128",
            Self::Standard => "192",
            Self::High => "256",
            Self::Best => "320",
        }
    }
}

impl fmt::Display for TargetQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetQuality {
    type Err = InvalidQualityError;

    /// Accepts "192", "192k" or "192kbps"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let digits = lower
            .strip_suffix("kbps")
            .or_else(|| lower.strip_suffix('k'))
            .unwrap_or(&lower);

        Self::ALL
            .into_iter()
            .find(|q| q.as_str() == digits)
            .ok_or_else(|| InvalidQualityError {
                input: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parse() {
        assert_eq!("mp3".parse::<TargetFormat>().unwrap(), TargetFormat::Mp3);
        assert_eq!(" WAV ".parse::<TargetFormat>().unwrap(), TargetFormat::Wav);
        assert!("flac".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn format_defaults_to_mp3() {
        assert_eq!(TargetFormat::default(), TargetFormat::Mp3);
    }

    #[test]
    fn quality_parse_with_suffixes() {
        assert_eq!("128".parse::<TargetQuality>().unwrap(), TargetQuality::Low);
        assert_eq!("256k".parse::<TargetQuality>().unwrap(), TargetQuality::High);
        assert_eq!("320kbps".parse::<TargetQuality>().unwrap(), TargetQuality::Best);
        assert!("64".parse::<TargetQuality>().is_err());
        assert!("high".parse::<TargetQuality>().is_err());
    }

    #[test]
    fn quality_defaults_to_192() {
        assert_eq!(TargetQuality::default().kbps(), 192);
        assert_eq!(TargetQuality::default().to_string(), "192");
    }
}
