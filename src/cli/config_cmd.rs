//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::conversion::{TargetFormat, TargetQuality};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let normalized = normalize_config_value(key, value)?;

    let mut config = store.load().await?;
    match key {
        "server_url" => config.server_url = Some(normalized.clone()),
        "format" => config.format = Some(normalized.clone()),
        "quality" => config.quality = Some(normalized.clone()),
        "max_duration" => config.max_duration = Some(normalized.clone()),
        "timeslice_ms" => config.timeslice_ms = Some(parse_positive(key, &normalized)?),
        "bitrate" => config.bitrate = Some(parse_positive(key, &normalized)?),
        "output_dir" => config.output_dir = Some(normalized.clone()),
        _ => unreachable!(), // Already validated
    }

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, normalized));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    match config_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = config_value(&config, key).unwrap_or_else(|| NOT_SET.to_string());
        presenter.key_value(key, &value);
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn config_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "server_url" => config.server_url.clone(),
        "format" => config.format.clone(),
        "quality" => config.quality.clone(),
        "max_duration" => config.max_duration.clone(),
        "timeslice_ms" => config.timeslice_ms.map(|v| v.to_string()),
        "bitrate" => config.bitrate.map(|v| v.to_string()),
        "output_dir" => config.output_dir.clone(),
        _ => None,
    }
}

/// Validate a value for `key` and return the form that gets stored
fn normalize_config_value(key: &str, value: &str) -> Result<String, ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };
    let value = value.trim();

    match key {
        "server_url" => {
            if value.starts_with("http://") || value.starts_with("https://") {
                Ok(value.trim_end_matches('/').to_string())
            } else {
                Err(invalid("URL must start with http:// or https://".to_string()))
            }
        }
        "format" => value
            .parse::<TargetFormat>()
            .map(|f| f.to_string())
            .map_err(|e| invalid(e.to_string())),
        "quality" => value
            .parse::<TargetQuality>()
            .map(|q| q.to_string())
            .map_err(|e| invalid(e.to_string())),
        "max_duration" => value
            .parse::<Duration>()
            .map(|d| d.to_string())
            .map_err(|e| invalid(e.to_string())),
        "timeslice_ms" | "bitrate" => {
            parse_positive::<u64>(key, value)?;
            Ok(value.to_string())
        }
        "output_dir" => {
            if value.is_empty() {
                Err(invalid("Directory must not be empty".to_string()))
            } else {
                Ok(value.to_string())
            }
        }
        _ => Ok(value.to_string()),
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: "Value must be a positive whole number".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_url_must_be_http() {
        assert_eq!(
            normalize_config_value("server_url", "http://host:5000/").unwrap(),
            "http://host:5000"
        );
        assert!(normalize_config_value("server_url", "host:5000").is_err());
    }

    #[test]
    fn format_is_validated() {
        assert_eq!(normalize_config_value("format", "WAV").unwrap(), "wav");
        assert!(normalize_config_value("format", "flac").is_err());
    }

    #[test]
    fn quality_is_normalized() {
        assert_eq!(normalize_config_value("quality", "256kbps").unwrap(), "256");
        assert!(normalize_config_value("quality", "100").is_err());
    }

    #[test]
    fn max_duration_valid() {
        assert!(normalize_config_value("max_duration", "30s").is_ok());
        assert!(normalize_config_value("max_duration", "2m30s").is_ok());
    }

    #[test]
    fn max_duration_invalid() {
        assert!(normalize_config_value("max_duration", "soon").is_err());
    }

    #[test]
    fn numbers_must_be_positive() {
        assert!(normalize_config_value("timeslice_ms", "250").is_ok());
        assert!(normalize_config_value("timeslice_ms", "0").is_err());
        assert!(normalize_config_value("bitrate", "-5").is_err());
        assert!(normalize_config_value("bitrate", "fast").is_err());
    }

    #[test]
    fn parse_positive_fits_target_type() {
        assert_eq!(parse_positive::<u32>("bitrate", "128000").unwrap(), 128_000);
        assert!(parse_positive::<u32>("bitrate", "99999999999").is_err());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = check_key("api_key").unwrap_err();
        assert!(err.to_string().contains("server_url"));
    }
}
