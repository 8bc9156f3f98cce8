// * Poll Loop
// * Fetching -> (cooldown and retry | extract + sync) -> Sleeping -> Fetching ...
// *
// * One cycle at a time. Fetch, parse and locate failures are retried forever after a
// * fixed cooldown; a consecutive-failure alert fires but never stops the loop.
// * The only concurrent work is the countdown ticker, aborted before the next cycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, info, info_span, warn, Instrument, Span};

use crate::config::SyncConfig;
use crate::engine::sync::{SyncOrchestrator, SyncOutcome};
use crate::network::client::{PageClient, PageSource};
use crate::network::errors::NetworkError;
use crate::ops::alerting::{Alert, AlertManager, AlertSeverity, AlertType};
use crate::ops::telemetry;
use crate::persistence::snapshot::PageSnapshot;
use crate::persistence::store::{ProxyStore, RestProxyStore};
use crate::refinery::{extract_proxies, ExtractError, TableLocator};

/// Errors that end one attempt early and trigger the cooldown
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Failed to get page: {0}")]
    Fetch(#[from] NetworkError),

    #[error("Failed to extract proxy table: {0}")]
    Extract(#[from] ExtractError),
}

impl CycleError {
    // * Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleError::Fetch(_) => "fetch_failed",
            CycleError::Extract(ExtractError::EmptyDocument) => "parse_failed",
            CycleError::Extract(ExtractError::TableNotFound { .. }) => "table_not_found",
        }
    }
}

/// Waits used by the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    pub cooldown: Duration,
    pub cycle_interval: Duration,
    pub progress_tick: Duration,
}

impl From<&SyncConfig> for PollTiming {
    fn from(config: &SyncConfig) -> Self {
        Self {
            cooldown: config.cooldown,
            cycle_interval: config.cycle_interval,
            progress_tick: config.progress_tick,
        }
    }
}

impl Default for PollTiming {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

/// What a cycle that reached the sync step produced
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub records: usize,
    pub body_found: bool,
    pub validation_misses: usize,
    /// `None` when snapshots are disabled
    pub snapshot_saved: Option<bool>,
    pub sync: SyncOutcome,
}

/// Outcome of one attempt, after its wait has elapsed
#[derive(Debug)]
pub enum Attempt {
    /// Sync ran (whatever its outcome), then the inter-cycle interval elapsed
    Synced(CycleReport),
    /// Fetch or extraction failed, then the cooldown elapsed
    Retried(CycleError),
}

impl Attempt {
    pub fn is_synced(&self) -> bool {
        matches!(self, Attempt::Synced(_))
    }
}

#[derive(Debug, Default)]
pub struct PollStats {
    attempts: AtomicU64,
    cooldowns: AtomicU64,
    synced: AtomicU64,
    consecutive_failures: AtomicU64,
    progress_ticks: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollStatsSnapshot {
    pub attempts: u64,
    pub cooldowns: u64,
    pub synced: u64,
    pub consecutive_failures: u64,
    /// Countdown ticks logged during inter-cycle sleeps
    pub progress_ticks: u64,
}

impl PollStats {
    pub fn snapshot(&self) -> PollStatsSnapshot {
        PollStatsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            cooldowns: self.cooldowns.load(Ordering::Relaxed),
            synced: self.synced.load(Ordering::Relaxed),
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
            progress_ticks: self.progress_ticks.load(Ordering::Relaxed),
        }
    }
}

pub struct Poller {
    source: Arc<dyn PageSource>,
    orchestrator: SyncOrchestrator,
    locator: TableLocator,
    snapshot: Option<PageSnapshot>,
    timing: PollTiming,
    alerts: AlertManager,
    alert_after_failures: u32,
    stats: Arc<PollStats>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn PageSource>,
        store: Arc<dyn ProxyStore>,
        locator: TableLocator,
        timing: PollTiming,
    ) -> Self {
        Self {
            source,
            orchestrator: SyncOrchestrator::new(store),
            locator,
            snapshot: None,
            timing,
            alerts: AlertManager::new(),
            alert_after_failures: crate::config::constants::ALERT_AFTER_FAILURES,
            stats: Arc::new(PollStats::default()),
        }
    }

    /// Wires the HTTP page client, the REST store and the snapshot from configuration
    pub fn from_config(config: &SyncConfig) -> Result<Self, NetworkError> {
        let source = PageClient::new(&config.source_url, config.request_timeout)?;
        let store = RestProxyStore::new(&config.delete_url, &config.insert_url, config.request_timeout)?;

        let mut poller = Self::new(
            Arc::new(source),
            Arc::new(store),
            TableLocator::new(config.table_id.clone()),
            PollTiming::from(config),
        )
        .with_alert_threshold(config.alert_after_failures);

        if let Some(path) = &config.snapshot_path {
            poller = poller.with_snapshot(PageSnapshot::new(path.clone()));
        }
        Ok(poller)
    }

    pub fn with_snapshot(mut self, snapshot: PageSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_alerts(mut self, alerts: AlertManager) -> Self {
        self.alerts = alerts;
        self
    }

    // * 0 disables the retry-streak alert
    pub fn with_alert_threshold(mut self, failures: u32) -> Self {
        self.alert_after_failures = failures;
        self
    }

    pub fn stats(&self) -> PollStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.alerts
    }

    /// fetch -> snapshot -> extract -> sync, without any waiting
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let page = self.source.fetch_page().await?;

        let snapshot_saved = match &self.snapshot {
            Some(snapshot) => Some(snapshot.save(&page).await),
            None => None,
        };

        let extraction = extract_proxies(&page, &self.locator)?;
        telemetry::set_records_extracted(extraction.len());

        if !extraction.body_found {
            self.alerts.fire(
                Alert::new(
                    AlertSeverity::Sev3,
                    AlertType::PageStructureChanged,
                    "Proxy table has no body, syncing an empty batch",
                )
                .with_context("table_id", self.locator.table_id()),
            );
        }

        let records = extraction.len();
        let body_found = extraction.body_found;
        let validation_misses = extraction.validation_misses;

        let sync = self.orchestrator.replace_all(extraction.records).await;
        self.report_sync(&sync);

        Ok(CycleReport {
            records,
            body_found,
            validation_misses,
            snapshot_saved,
            sync,
        })
    }

    fn report_sync(&self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Replaced { .. } => {
                self.alerts.resolve(AlertType::StoreDeleteFailed);
                self.alerts.resolve(AlertType::StoreInsertFailed);
            }
            SyncOutcome::DeleteFailed { reason } => {
                self.alerts.fire(
                    Alert::new(
                        AlertSeverity::Sev2,
                        AlertType::StoreDeleteFailed,
                        "Delete-all rejected, inserts halted until it succeeds",
                    )
                    .with_context("reason", reason),
                );
            }
            SyncOutcome::InsertFailed { reason } => {
                self.alerts.fire(
                    Alert::new(
                        AlertSeverity::Sev2,
                        AlertType::StoreInsertFailed,
                        "Insert failed after delete, store is empty until next cycle",
                    )
                    .with_context("reason", reason),
                );
            }
        }
    }

    /// Runs one cycle inside its own span, then takes the matching wait
    pub async fn attempt(&self) -> Attempt {
        let number = self.stats.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let span = info_span!("cycle", attempt = number);

        async {
            match self.run_cycle().await {
                Ok(report) => {
                    self.on_success(&report);
                    info!(
                        secs = self.timing.cycle_interval.as_secs(),
                        "Sleeping until next cycle"
                    );
                    self.sleep_with_progress(self.timing.cycle_interval).await;
                    Attempt::Synced(report)
                }
                Err(e) => {
                    self.on_failure(&e);
                    warn!(
                        error = %e,
                        secs = self.timing.cooldown.as_secs(),
                        "Cycle failed, cooling down before retry"
                    );
                    sleep(self.timing.cooldown).await;
                    Attempt::Retried(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    fn on_success(&self, report: &CycleReport) {
        telemetry::record_cycle(report.sync.as_str());
        self.stats.synced.fetch_add(1, Ordering::Relaxed);
        if self.stats.consecutive_failures.swap(0, Ordering::Relaxed) > 0 {
            self.alerts.resolve(AlertType::RetryStreak);
        }
        if report.body_found {
            self.alerts.resolve(AlertType::PageStructureChanged);
        }
    }

    fn on_failure(&self, error: &CycleError) {
        telemetry::record_cycle(error.as_str());
        telemetry::record_cooldown();
        self.stats.cooldowns.fetch_add(1, Ordering::Relaxed);
        let streak = self.stats.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;

        if let CycleError::Extract(ExtractError::TableNotFound { id }) = error {
            self.alerts.fire(
                Alert::new(
                    AlertSeverity::Sev3,
                    AlertType::PageStructureChanged,
                    "Page structure might have changed, proxy table not found",
                )
                .with_context("table_id", id),
            );
        }

        if self.alert_after_failures > 0 && streak >= u64::from(self.alert_after_failures) {
            self.alerts.fire(
                Alert::new(
                    AlertSeverity::Sev1,
                    AlertType::RetryStreak,
                    "Proxy list has not been refreshed, still retrying",
                )
                .with_context("consecutive_failures", streak)
                .with_context("last_error", error),
            );
        }
    }

    // * Sleeps for `total` while a ticker logs the remaining time.
    // * The ticker is aborted and joined before returning.
    async fn sleep_with_progress(&self, total: Duration) {
        let tick = self.timing.progress_tick;
        if tick.is_zero() || tick >= total {
            sleep(total).await;
            return;
        }

        let started = Instant::now();
        let stats = self.stats.clone();
        let ticker = tokio::spawn(
            async move {
                let mut ticks = interval_at(started + tick, tick);
                loop {
                    ticks.tick().await;
                    stats.progress_ticks.fetch_add(1, Ordering::Relaxed);
                    let remaining = total.saturating_sub(started.elapsed());
                    debug!(remaining_secs = remaining.as_secs(), "Countdown");
                }
            }
            .instrument(Span::current()),
        );

        sleep(total).await;
        ticker.abort();
        let _ = ticker.await;
    }

    /// Runs exactly `attempts` attempts, each followed by its wait
    pub async fn run_attempts(&self, attempts: usize) -> Vec<Attempt> {
        let mut outcomes = Vec::with_capacity(attempts);
        for _ in 0..attempts {
            outcomes.push(self.attempt().await);
        }
        outcomes
    }

    /// Runs forever; termination is the process's business
    pub async fn run(&self) {
        info!(table_id = %self.locator.table_id(), "Starting proxy list sync loop");
        loop {
            self.attempt().await;
        }
    }
}
