// * Telemetry - Structured Logging and Prometheus Metrics
// * Tracing setup (JSON, pretty, optional file sink) and the sync loop's metrics

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram, Counter,
    CounterVec, Encoder, Gauge, Histogram, TextEncoder,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::LogFormat;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// * File name used when a log directory is configured
const LOG_FILE_NAME: &str = "proxy-list-sync.log";

lazy_static! {
    // * Poll attempts by outcome (synced, delete_failed, insert_failed, fetch_failed, ...)
    pub static ref CYCLES_TOTAL: CounterVec = register_counter_vec!(
        "proxysync_cycles_total",
        "Poll attempts by outcome",
        &["outcome"]
    ).expect("proxysync_cycles_total registration");

    // * Cooldown waits taken after failed attempts
    pub static ref COOLDOWNS_TOTAL: Counter = register_counter!(
        "proxysync_cooldowns_total",
        "Cooldown waits after failed fetch or locate"
    ).expect("proxysync_cooldowns_total registration");

    // * Records extracted by the most recent successful parse
    pub static ref RECORDS_EXTRACTED: Gauge = register_gauge!(
        "proxysync_records_extracted",
        "Records extracted from the last parsed page"
    ).expect("proxysync_records_extracted registration");

    // * Cells rejected per field
    pub static ref VALIDATION_MISSES_TOTAL: CounterVec = register_counter_vec!(
        "proxysync_validation_misses_total",
        "Table cells rejected by field validators",
        &["field"]
    ).expect("proxysync_validation_misses_total registration");

    // * Store calls by operation and result
    pub static ref STORE_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "proxysync_store_requests_total",
        "Remote store requests by operation and result",
        &["operation", "result"]
    ).expect("proxysync_store_requests_total registration");

    // * Page fetch duration
    pub static ref FETCH_DURATION_SECONDS: Histogram = register_histogram!(
        "proxysync_fetch_duration_seconds",
        "Proxy list page fetch duration in seconds",
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).expect("proxysync_fetch_duration_seconds registration");
}

/// Initializes JSON tracing with a default level; `RUST_LOG` still wins
///
/// # Example
/// ```ignore
/// use proxy_list_sync::ops::telemetry;
///
/// telemetry::init_tracing_with_level("info");
/// tracing::info!(records = 300, "Saving batch of proxies");
/// ```
pub fn init_tracing_with_level(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();
}

/// Initializes tracing with pretty formatting (for development)
pub fn init_tracing_pretty(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().pretty())
        .init();
}

/// Stdout tracing in the given format plus a JSON file under `log_dir`
///
/// The returned guard flushes the file writer; keep it alive for the process lifetime.
pub fn init_tracing_with_file(level: &str, format: LogFormat, log_dir: &Path) -> WorkerGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let (json_stdout, pretty_stdout) = match format {
        LogFormat::Json => (Some(fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(fmt::layer().pretty())),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_stdout)
        .with(pretty_stdout)
        .with(fmt::layer().json().with_ansi(false).with_writer(file_writer))
        .init();

    guard
}

/// Metrics server handle for graceful shutdown
pub struct MetricsServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    running: Arc<AtomicBool>,
    local_addr: SocketAddr,
}

impl MetricsServerHandle {
    /// Signals the metrics server to shut down
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.running.store(false, Ordering::Relaxed);
    }

    /// Returns true if the server is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Address the server is bound to (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// Starts the Prometheus metrics HTTP server on the specified port
///
/// Serves `/metrics` and `/health`. Port 0 binds an ephemeral port.
pub async fn start_metrics_server(port: u16) -> Result<MetricsServerHandle, hyper::Error> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let make_svc = hyper::service::make_service_fn(|_conn| async {
        Ok::<_, std::convert::Infallible>(hyper::service::service_fn(handle_metrics_request))
    });

    let server = hyper::Server::try_bind(&addr)?.serve(make_svc);
    let local_addr = server.local_addr();
    let server = server.with_graceful_shutdown(async {
        let _ = shutdown_rx.await;
    });

    tokio::spawn(async move {
        tracing::info!(addr = %local_addr, "Metrics server started");

        if let Err(e) = server.await {
            tracing::error!(error = %e, "Metrics server error");
        }

        running_clone.store(false, Ordering::Relaxed);
        tracing::info!("Metrics server stopped");
    });

    Ok(MetricsServerHandle {
        shutdown_tx: Some(shutdown_tx),
        running,
        local_addr,
    })
}

/// Handles incoming HTTP requests to the metrics endpoint
async fn handle_metrics_request(
    req: hyper::Request<hyper::Body>,
) -> Result<hyper::Response<hyper::Body>, std::convert::Infallible> {
    let response = match req.uri().path() {
        "/metrics" => hyper::Response::builder()
            .status(200)
            .header("Content-Type", TextEncoder::new().format_type())
            .body(hyper::Body::from(get_metrics_string())),
        "/health" => hyper::Response::builder()
            .status(200)
            .body(hyper::Body::from("OK")),
        _ => hyper::Response::builder()
            .status(404)
            .body(hyper::Body::from("Not Found")),
    };

    Ok(response.unwrap_or_else(|_| hyper::Response::new(hyper::Body::empty())))
}

/// Returns the current metrics as a string
pub fn get_metrics_string() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Records the outcome of one poll attempt
pub fn record_cycle(outcome: &str) {
    CYCLES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_cooldown() {
    COOLDOWNS_TOTAL.inc();
}

pub fn set_records_extracted(count: usize) {
    RECORDS_EXTRACTED.set(count as f64);
}

pub fn record_validation_miss(field: &str) {
    VALIDATION_MISSES_TOTAL.with_label_values(&[field]).inc();
}

pub fn record_store_request(operation: &str, result: &str) {
    STORE_REQUESTS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
}

pub fn record_fetch_duration(seconds: f64) {
    FETCH_DURATION_SECONDS.observe(seconds);
}
