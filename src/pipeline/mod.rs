//! Sync pipeline: snapshot refresh, periodic scheduling and change diffs.

pub mod diff;
pub mod scheduler;
pub mod sync;

pub use diff::{SnapshotDiff, calculate_diff};
pub use scheduler::{SchedulerHandle, SyncScheduler, next_boundary};
pub use sync::{PairFailure, PairSummary, Refreshed, SyncReport, Synchronizer};
