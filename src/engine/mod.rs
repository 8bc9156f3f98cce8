pub mod poller;
pub mod sync;

pub use poller::{Attempt, CycleError, CycleReport, PollStatsSnapshot, PollTiming, Poller};
pub use sync::{SyncOrchestrator, SyncOutcome};
