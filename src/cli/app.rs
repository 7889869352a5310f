//! Record-and-convert runner

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::time::{sleep, timeout, Duration as TokioDuration};
use tracing::{debug, warn};

use crate::application::ports::ConfigStore;
use crate::application::{
    CaptureSession, SessionError, SessionEvent, SessionSettings, TickCallback, UploadCoordinator,
};
use crate::domain::capture::CaptureConstraints;
use crate::domain::config::AppConfig;
use crate::domain::conversion::{TargetFormat, TargetQuality};
use crate::domain::recording::Duration;
use crate::infrastructure::{CpalCaptureDevice, HttpConversionService, XdgConfigStore};

use super::presenter::{Presenter, SpinnerIndicator};
use super::signals::{HostSignal, HostSignalHandler};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Longest wait for the recorder's final flush after stop
const FINALIZE_TIMEOUT: TokioDuration = TokioDuration::from_secs(5);

/// Resolved options for one recording
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub server_url: String,
    pub format: TargetFormat,
    pub quality: TargetQuality,
    pub max_duration: Duration,
    pub timeslice: Duration,
    pub bitrate: u32,
    pub output_dir: Option<PathBuf>,
}

impl RecordOptions {
    /// Build from merged config. Fails with a message on invalid values.
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        let format = match config.format.as_deref() {
            Some(s) => s.parse().map_err(|e| format!("{}", e))?,
            None => TargetFormat::default(),
        };
        let quality = match config.quality.as_deref() {
            Some(s) => s.parse().map_err(|e| format!("{}", e))?,
            None => TargetQuality::default(),
        };
        let max_duration = match config.max_duration.as_deref() {
            Some(s) => s
                .parse::<Duration>()
                .map_err(|e| format!("Invalid max-duration: {}", e))?,
            None => Duration::default_max_duration(),
        };
        if max_duration.as_millis() == 0 {
            return Err("Invalid max-duration: must be greater than zero".to_string());
        }

        Ok(Self {
            server_url: config.server_url_or_default().to_string(),
            format,
            quality,
            max_duration,
            timeslice: config.timeslice_or_default(),
            bitrate: config.bitrate_or_default(),
            output_dir: config.output_dir.as_ref().map(PathBuf::from),
        })
    }
}

/// How the recording phase ended
enum RecordingEnd {
    Stopped,
    Hidden,
    LimitReached,
    Cancelled,
}

/// Record from the microphone, convert on the server, print the result
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let mut signals = match HostSignalHandler::new() {
        Ok(signals) => signals,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.start_spinner("Requesting microphone access...");
    let spinner = presenter.spinner_handle();
    let max_duration = options.max_duration;
    let tick_presenter = Presenter::new();
    let on_tick: TickCallback = Arc::new(move |elapsed| {
        if let Some(spinner) = &spinner {
            spinner.set_message(tick_presenter.format_recording(elapsed, max_duration));
        }
    });

    let settings = SessionSettings {
        constraints: CaptureConstraints::default(),
        timeslice: options.timeslice,
        bitrate: options.bitrate,
    };
    let device = Arc::new(CpalCaptureDevice::new());
    let mut session = CaptureSession::new(device, settings).with_tick_callback(on_tick);

    if let Err(e) = session.start().await {
        presenter.spinner_fail(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }
    presenter.update_spinner(&presenter.format_recording(session.elapsed(), max_duration));

    let deadline = sleep(max_duration.as_std());
    tokio::pin!(deadline);

    let ended = loop {
        tokio::select! {
            event = session.next_event() => match event {
                Some(SessionEvent::Failed(e)) => {
                    presenter.spinner_fail(&e.to_string());
                    return ExitCode::from(EXIT_ERROR);
                }
                Some(event) => debug!(?event, "Capture event"),
                None => {
                    warn!("Recorder went away while recording");
                    session.stop();
                    break RecordingEnd::Stopped;
                }
            },
            signal = signals.recv() => match signal {
                Some(HostSignal::Stop) => {
                    session.stop();
                    break RecordingEnd::Stopped;
                }
                Some(HostSignal::Hidden) => {
                    session.on_visibility_hidden();
                    break RecordingEnd::Hidden;
                }
                Some(HostSignal::Cancel) | Some(HostSignal::Shutdown) | None => {
                    session.reset();
                    break RecordingEnd::Cancelled;
                }
            },
            _ = &mut deadline => {
                session.stop();
                break RecordingEnd::LimitReached;
            }
        }
    };

    signals.end_recording();
    presenter.stop_spinner();
    match ended {
        RecordingEnd::Cancelled => {
            presenter.warn("Recording cancelled");
            return ExitCode::from(EXIT_ERROR);
        }
        RecordingEnd::Hidden => presenter.warn("Terminal went away, recording stopped"),
        RecordingEnd::LimitReached => {
            presenter.info(&format!("Reached max duration ({})", max_duration))
        }
        RecordingEnd::Stopped => {}
    }

    let elapsed = session.elapsed();
    let finished = timeout(FINALIZE_TIMEOUT, session.finish())
        .await
        .map(|finished| {
            finished.map(|payload| {
                format!(
                    "Recorded {} ({}, {})",
                    elapsed,
                    payload.human_readable_size(),
                    payload.mime_type()
                )
            })
        });
    let summary = match finished {
        Ok(Ok(summary)) => summary,
        Ok(Err(e)) => {
            report_session_error(&presenter, &e);
            return ExitCode::from(EXIT_ERROR);
        }
        Err(_) => {
            session.reset();
            presenter.error("Recorder did not finish in time");
            return ExitCode::from(EXIT_ERROR);
        }
    };
    presenter.success(&summary);

    let coordinator = UploadCoordinator::new(
        HttpConversionService::new(options.server_url.clone()),
        SpinnerIndicator::new(),
    );

    let result = match session
        .upload(&coordinator, options.format, options.quality)
        .await
    {
        Ok(result) => result.clone(),
        Err(e) => {
            report_session_error(&presenter, &e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let download_url = coordinator.resolve_download_url(&result);
    presenter.conversion_result(&result, download_url.as_deref());

    if let Some(dir) = options.output_dir.as_deref() {
        match coordinator.download(&result, dir).await {
            Ok(path) => presenter.success(&format!("Saved to {}", path.display())),
            Err(e) => {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

fn report_session_error(presenter: &Presenter, err: &SessionError) {
    presenter.error(&err.to_string());
    if err.is_recoverable() {
        presenter.info("Run voice-recorder again to record a new take");
    }
}

/// Print the server's diagnostic JSON
pub async fn run_debug(server_url: &str) -> ExitCode {
    let presenter = Presenter::new();
    let coordinator = UploadCoordinator::new(
        HttpConversionService::new(server_url),
        SpinnerIndicator::new(),
    );

    match coordinator.debug_info().await {
        Ok(info) => {
            let pretty = serde_json::to_string_pretty(&info).unwrap_or_else(|_| info.to_string());
            presenter.output(&pretty);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Load and merge configuration from file and CLI.
/// The server environment variable arrives through the CLI layer.
pub async fn load_merged_config(cli_config: AppConfig) -> Result<AppConfig, String> {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.map_err(|e| e.to_string())?;

    // Merge: defaults < file < env/cli
    Ok(AppConfig::defaults().merge(file_config).merge(cli_config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_defaults() {
        let options = RecordOptions::from_config(&AppConfig::defaults()).unwrap();

        assert_eq!(options.server_url, "http://127.0.0.1:5000");
        assert_eq!(options.format, TargetFormat::Mp3);
        assert_eq!(options.quality, TargetQuality::Standard);
        assert_eq!(options.max_duration, Duration::from_secs(600));
        assert_eq!(options.timeslice, Duration::from_millis(500));
        assert_eq!(options.bitrate, 128_000);
        assert!(options.output_dir.is_none());
    }

    #[test]
    fn options_reject_bad_values() {
        let config = AppConfig {
            quality: Some("100".to_string()),
            ..AppConfig::defaults()
        };
        assert!(RecordOptions::from_config(&config).is_err());

        let config = AppConfig {
            max_duration: Some("later".to_string()),
            ..AppConfig::defaults()
        };
        let err = RecordOptions::from_config(&config).unwrap_err();
        assert!(err.contains("max-duration"));
    }

    #[test]
    fn options_carry_output_dir() {
        let config = AppConfig {
            output_dir: Some("/tmp/converted".to_string()),
            ..AppConfig::defaults()
        };
        let options = RecordOptions::from_config(&config).unwrap();
        assert_eq!(options.output_dir, Some(PathBuf::from("/tmp/converted")));
    }
}
