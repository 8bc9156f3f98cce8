use proxy_list_sync::config::{LogFormat, SyncConfig};
use proxy_list_sync::engine::Poller;
use proxy_list_sync::ops::telemetry;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // * Keep the file writer guard alive for the whole run
    let _log_guard = match (&config.log_dir, config.log_format) {
        (Some(dir), format) => Some(telemetry::init_tracing_with_file(&config.log_level, format, dir)),
        (None, LogFormat::Json) => {
            telemetry::init_tracing_with_level(&config.log_level);
            None
        }
        (None, LogFormat::Pretty) => {
            telemetry::init_tracing_pretty(&config.log_level);
            None
        }
    };

    let _metrics = match config.metrics_port {
        Some(port) => match telemetry::start_metrics_server(port).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(port, error = %e, "Failed to start metrics server");
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let poller = match Poller::from_config(&config) {
        Ok(poller) => poller,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP clients");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(source = %config.source_url, "Proxy list sync initialized");
    poller.run().await;

    ExitCode::SUCCESS
}
