// * Operations: tracing setup, Prometheus metrics and alerting

pub mod alerting;
pub mod telemetry;

// * Re-exports for convenient access
pub use alerting::{Alert, AlertHandler, AlertManager, AlertSeverity, AlertType, LoggingHandler};
pub use telemetry::{
    get_metrics_string, init_tracing_pretty, init_tracing_with_file,
    init_tracing_with_level, start_metrics_server, MetricsServerHandle,
};
