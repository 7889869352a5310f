//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::conversion::{TargetFormat, TargetQuality};

/// Voice Recorder - record from the microphone and convert on a server
#[derive(Parser, Debug)]
#[command(name = "voice-recorder")]
#[command(version)]
#[command(about = "Record audio from the microphone and convert it to MP3 or WAV")]
#[command(long_about = None)]
pub struct Cli {
    /// Target format
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<FormatArg>,

    /// Target bitrate in kbps (128, 192, 256, 320)
    #[arg(short = 'q', long, value_name = "KBPS", value_parser = parse_quality)]
    pub quality: Option<TargetQuality>,

    /// Conversion server URL
    #[arg(short = 's', long, value_name = "URL", env = "VOICE_RECORDER_SERVER")]
    pub server: Option<String>,

    /// Stop automatically after this long (e.g., 30s, 5m, 1m30s)
    #[arg(short = 'm', long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Download the converted file into this directory
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<String>,

    /// Log debug output to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show diagnostic information from the conversion server
    Debug,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Target format argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Mp3,
    Wav,
}

impl From<FormatArg> for TargetFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Mp3 => TargetFormat::Mp3,
            FormatArg::Wav => TargetFormat::Wav,
        }
    }
}

fn parse_quality(value: &str) -> Result<TargetQuality, String> {
    value.parse().map_err(|e: crate::domain::error::InvalidQualityError| e.to_string())
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "server_url",
    "format",
    "quality",
    "max_duration",
    "timeslice_ms",
    "bitrate",
    "output_dir",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["voice-recorder"]);
        assert!(cli.format.is_none());
        assert!(cli.quality.is_none());
        assert!(cli.max_duration.is_none());
        assert!(cli.output.is_none());
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_format_and_quality() {
        let cli = Cli::parse_from(["voice-recorder", "-f", "wav", "-q", "320kbps"]);
        assert_eq!(cli.format, Some(FormatArg::Wav));
        assert_eq!(cli.quality, Some(TargetQuality::Best));
    }

    #[test]
    fn cli_rejects_unknown_quality() {
        assert!(Cli::try_parse_from(["voice-recorder", "-q", "100"]).is_err());
    }

    #[test]
    fn cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["voice-recorder", "-f", "flac"]).is_err());
    }

    #[test]
    fn cli_parses_server_and_output() {
        let cli = Cli::parse_from([
            "voice-recorder",
            "--server",
            "http://converter:5000",
            "--output",
            "/tmp/out",
            "--max-duration",
            "2m",
        ]);
        assert_eq!(cli.server.as_deref(), Some("http://converter:5000"));
        assert_eq!(cli.output.as_deref(), Some("/tmp/out"));
        assert_eq!(cli.max_duration.as_deref(), Some("2m"));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["voice-recorder", "config", "set", "format", "wav"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "format");
            assert_eq!(value, "wav");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn cli_parses_debug() {
        let cli = Cli::parse_from(["voice-recorder", "debug"]);
        assert!(matches!(cli.command, Some(Commands::Debug)));
    }

    #[test]
    fn format_arg_converts() {
        assert_eq!(TargetFormat::from(FormatArg::Mp3), TargetFormat::Mp3);
        assert_eq!(TargetFormat::from(FormatArg::Wav), TargetFormat::Wav);
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("server_url"));
        assert!(is_valid_config_key("timeslice_ms"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
