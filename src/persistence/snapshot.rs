// * Best-effort local copy of the raw page, kept for diagnosing layout changes

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PageSnapshot {
    path: PathBuf,
}

impl PageSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // * Never fails the cycle: errors are logged and reported as `false`
    pub async fn save(&self, body: &[u8]) -> bool {
        if let Some(dir) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(dir).await {
                warn!(dir = %dir.display(), error = %e, "Failed to create snapshot directory");
                return false;
            }
        }

        match fs::write(&self.path, body).await {
            Ok(()) => {
                debug!(path = %self.path.display(), bytes = body.len(), "Saved page snapshot");
                true
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to save page snapshot");
                false
            }
        }
    }
}
