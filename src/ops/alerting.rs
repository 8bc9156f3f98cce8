// * Alerting - Notifications for conditions an operator should look at
// * Alerts are informational only: they never alter the poll loop's control flow.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

// * Same alert type is not re-fired within this window
const DEFAULT_ALERT_COOLDOWN_SECS: u64 = 30 * 60;

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertSeverity {
    /// Store may be empty or stale for a long time
    Sev1,
    /// A sync step failed this cycle
    Sev2,
    /// Source page looks different than expected
    Sev3,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Sev1 => write!(f, "SEV-1"),
            AlertSeverity::Sev2 => write!(f, "SEV-2"),
            AlertSeverity::Sev3 => write!(f, "SEV-3"),
        }
    }
}

/// Alert types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertType {
    /// Proxy table or its body is missing from the page
    PageStructureChanged,
    /// Delete-all rejected; inserts are halted until it succeeds
    StoreDeleteFailed,
    /// Batch insert failed after a successful delete; store is empty
    StoreInsertFailed,
    /// Consecutive failed attempts reached the configured threshold
    RetryStreak,
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertType::PageStructureChanged => write!(f, "PAGE_STRUCTURE_CHANGED"),
            AlertType::StoreDeleteFailed => write!(f, "STORE_DELETE_FAILED"),
            AlertType::StoreInsertFailed => write!(f, "STORE_INSERT_FAILED"),
            AlertType::RetryStreak => write!(f, "RETRY_STREAK"),
        }
    }
}

/// An alert event
#[derive(Debug, Clone)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub alert_type: AlertType,
    pub message: String,
    pub context: HashMap<String, String>,
}

impl Alert {
    pub fn new(severity: AlertSeverity, alert_type: AlertType, message: impl Into<String>) -> Self {
        Self {
            severity,
            alert_type,
            message: message.into(),
            context: HashMap::new(),
        }
    }

    pub fn with_context(mut self, key: &str, value: impl ToString) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Logs the alert at a level matching its severity
    pub fn log(&self) {
        let mut pairs: Vec<String> = self
            .context
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        pairs.sort();
        let context_str = pairs.join(", ");

        match self.severity {
            AlertSeverity::Sev1 | AlertSeverity::Sev2 => {
                tracing::error!(
                    severity = %self.severity,
                    alert_type = %self.alert_type,
                    context = %context_str,
                    "ALERT: {}", self.message
                );
            }
            AlertSeverity::Sev3 => {
                tracing::warn!(
                    severity = %self.severity,
                    alert_type = %self.alert_type,
                    context = %context_str,
                    "ALERT: {}", self.message
                );
            }
        }
    }
}

/// Trait for alert handlers
pub trait AlertHandler: Send + Sync {
    /// Handles an alert
    fn handle(&self, alert: &Alert);
}

/// Default logging handler
#[derive(Debug, Default)]
pub struct LoggingHandler;

impl AlertHandler for LoggingHandler {
    fn handle(&self, alert: &Alert) {
        alert.log();
    }
}

/// Dispatches alerts to handlers, suppressing repeats of the same type
pub struct AlertManager {
    handlers: Vec<Arc<dyn AlertHandler>>,
    last_fired: RwLock<HashMap<AlertType, Instant>>,
    cooldown: Duration,
    fired_count: AtomicU64,
    suppressed_count: AtomicU64,
}

impl std::fmt::Debug for AlertManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertManager")
            .field("handler_count", &self.handlers.len())
            .field("cooldown", &self.cooldown)
            .finish()
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertManager {
    /// Manager with the logging handler and the default cooldown
    pub fn new() -> Self {
        Self::with_cooldown(Duration::from_secs(DEFAULT_ALERT_COOLDOWN_SECS))
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            handlers: vec![Arc::new(LoggingHandler)],
            last_fired: RwLock::new(HashMap::new()),
            cooldown,
            fired_count: AtomicU64::new(0),
            suppressed_count: AtomicU64::new(0),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn AlertHandler>) {
        self.handlers.push(handler);
    }

    /// Sends the alert to every handler unless one of the same type fired within the cooldown.
    /// Returns true when the alert was dispatched.
    pub fn fire(&self, alert: Alert) -> bool {
        let now = Instant::now();
        if let Ok(mut last_fired) = self.last_fired.write() {
            if let Some(previous) = last_fired.get(&alert.alert_type) {
                if now.duration_since(*previous) < self.cooldown {
                    self.suppressed_count.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
            }
            last_fired.insert(alert.alert_type, now);
        }

        for handler in &self.handlers {
            handler.handle(&alert);
        }
        self.fired_count.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Forgets the cooldown for a type, e.g. after the condition cleared
    pub fn resolve(&self, alert_type: AlertType) {
        if let Ok(mut last_fired) = self.last_fired.write() {
            last_fired.remove(&alert_type);
        }
    }

    pub fn fired_count(&self) -> u64 {
        self.fired_count.load(Ordering::Relaxed)
    }

    pub fn suppressed_count(&self) -> u64 {
        self.suppressed_count.load(Ordering::Relaxed)
    }
}
