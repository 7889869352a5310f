//! Voice Recorder CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_recorder::cli::{
    app::{load_merged_config, run_debug, run_record, RecordOptions, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    logging::init_logging,
    presenter::Presenter,
};
use voice_recorder::domain::config::AppConfig;
use voice_recorder::domain::conversion::TargetFormat;
use voice_recorder::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let presenter = Presenter::new();

    // Build CLI config from args
    let cli_config = AppConfig {
        server_url: cli.server.clone(),
        format: cli.format.map(|f| TargetFormat::from(f).to_string()),
        quality: cli.quality.map(|q| q.to_string()),
        max_duration: cli.max_duration.clone(),
        output_dir: cli.output.clone(),
        ..Default::default()
    };

    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Debug) => {
            let config = match load_merged_config(cli_config).await {
                Ok(config) => config,
                Err(e) => {
                    presenter.error(&e);
                    return ExitCode::from(EXIT_ERROR);
                }
            };
            return run_debug(config.server_url_or_default()).await;
        }
        None => {}
    }

    let config = match load_merged_config(cli_config).await {
        Ok(config) => config,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let options = match RecordOptions::from_config(&config) {
        Ok(options) => options,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    run_record(options).await
}
