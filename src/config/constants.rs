// * Configuration Constants
// * Central location for endpoints, identifiers and timings of the sync loop

// * Public page carrying the proxy table
pub const SOURCE_URL: &str = "https://free-proxy-list.net/";

// * Remote store endpoints (collection delete, batch insert)
pub const STORE_DELETE_URL: &str = "https://rest-free-proxy-list.herokuapp.com/proxies";
pub const STORE_INSERT_URL: &str = "https://rest-free-proxy-list.herokuapp.com/proxies/batch";

// * `id` attribute of the table holding the proxy rows
pub const PROXY_TABLE_ID: &str = "proxylisttable";

// * Local raw page snapshot (diagnostics only)
pub const SNAPSHOT_DIR: &str = "/tmp/free-proxy-list";
pub const SNAPSHOT_FILE: &str = "index.html";

// * Wait before retrying a failed fetch or locate step
pub const COOLDOWN_SECS: u64 = 120;

// * Wait between attempted cycles
pub const CYCLE_INTERVAL_SECS: u64 = 300;

// * Countdown log cadence during the inter-cycle sleep
pub const PROGRESS_TICK_SECS: u64 = 10;

// * Per-request timeout for page fetch and store calls
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// * Consecutive failed attempts before a retry-streak alert fires
pub const ALERT_AFTER_FAILURES: u32 = 5;

// * Default tracing filter when RUST_LOG is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

// * User-Agent sent with every request
pub const USER_AGENT: &str = concat!("proxy-list-sync/", env!("CARGO_PKG_VERSION"));
