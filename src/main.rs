//! voice-memo CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voice_memo::cli::{
    app::{load_merged_config, run_session, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    SessionOptions,
};
use voice_memo::domain::config::{AppConfig, WaveformConfig};
use voice_memo::domain::recording::AudioFormat;
use voice_memo::infrastructure::XdgConfigStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("VOICE_MEMO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle subcommands
    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        format: cli.format.map(|f| AudioFormat::from(f).to_string()),
        output_dir: cli.output_dir.clone(),
        max_duration: cli.max_duration.clone(),
        block_size: None,
        waveform: cli.no_waveform.then(|| WaveformConfig {
            enabled: Some(false),
            ..Default::default()
        }),
    };

    let config = load_merged_config(cli_config).await;

    let format = match config.parsed_format() {
        Ok(format) => format,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let max_duration = match config.parsed_max_duration() {
        Ok(d) => d,
        Err(e) => {
            presenter.error(&format!("Invalid max-duration: {}", e));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let options = SessionOptions {
        format,
        output_dir: config.output_dir_or_default(),
        max_duration,
        block_size: config.block_size_or_default(),
        waveform: config.waveform_enabled_or_default(),
        waveform_columns: config.waveform_columns_or_default(),
        frame_interval: config.frame_interval_or_default(),
        start_immediately: cli.start,
    };

    run_session(options).await
}
