//! Matchmaking run orchestration.
//!
//! A run is a single sequential batch pass: fetch the pending pool,
//! partition it into time slots, form groups per slot, commit each group,
//! notify dispatch per commit. At most one run executes at a time
//! process-wide; without that guard two concurrent runs could observe the
//! same pending request and place it into two different groups.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::commit::SharedTripCommitter;
use crate::config::{ConfigError, MatchmakingConfig};
use crate::matching::{form_groups, partition, CompatibilityEvaluator};
use crate::notify::{Notifier, SharedTripCreated};
use crate::store::{RequestStore, SharedTripStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The initial pending-pool fetch failed; nothing was processed and
    /// the next trigger will retry.
    #[error("pending request fetch failed: {0}")]
    Store(#[from] StoreError),
}

/// Counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub groups_formed: usize,
    pub requests_matched: usize,
    pub commit_failures: usize,
}

pub struct Matchmaker {
    config: MatchmakingConfig,
    evaluator: CompatibilityEvaluator,
    committer: SharedTripCommitter,
    requests: Arc<dyn RequestStore>,
    notifier: Arc<dyn Notifier>,
    run_lock: Mutex<()>,
}

impl Matchmaker {
    pub fn new(
        config: MatchmakingConfig,
        requests: Arc<dyn RequestStore>,
        trips: Arc<dyn SharedTripStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let evaluator = CompatibilityEvaluator::new(&config);
        let committer = SharedTripCommitter::new(
            requests.clone(),
            trips,
            config.cost_per_shared_trip,
        );
        Ok(Self {
            config,
            evaluator,
            committer,
            requests,
            notifier,
            run_lock: Mutex::new(()),
        })
    }

    /// Execute one batch pass over the pending pool.
    ///
    /// A commit failure is isolated to its group (those requests stay
    /// Pending); the run continues with the remaining groups and slots.
    pub fn run_once(&self, now: DateTime<Utc>) -> Result<RunReport, RunError> {
        let _guard = match self.run_lock.lock() {
            Ok(guard) => guard,
            // A previous run panicked while holding the lock; the pass
            // itself keeps no state across runs, so continue.
            Err(poisoned) => poisoned.into_inner(),
        };

        let pending = self.requests.find_pending_future(now)?;
        debug!(pending = pending.len(), "matchmaking run started");

        let mut report = RunReport::default();
        let max_group_size = self.config.max_passengers_per_trip as usize;

        for (slot, slot_requests) in partition(pending) {
            let outcome = form_groups(slot_requests, &self.evaluator, max_group_size);
            debug!(
                slot = ?slot,
                groups = outcome.groups.len(),
                ungrouped = outcome.ungrouped.len(),
                "slot formation finished"
            );

            for group in outcome.groups {
                let member_count = group.len();
                match self.committer.commit(group, now) {
                    Ok(committed) => {
                        report.groups_formed += 1;
                        report.requests_matched += member_count;
                        let event =
                            SharedTripCreated::from_commit(&committed.trip, &committed.members);
                        if let Err(err) = self.notifier.notify(&event) {
                            warn!(
                                trip = committed.trip.id.0,
                                error = %err,
                                "realtime notification failed, dispatch will reconcile by polling"
                            );
                        }
                    }
                    Err(err) => {
                        report.commit_failures += 1;
                        warn!(
                            slot = ?slot,
                            error = %err,
                            "group commit failed, members remain pending for a future run"
                        );
                    }
                }
            }
        }

        info!(
            groups = report.groups_formed,
            matched = report.requests_matched,
            failures = report.commit_failures,
            "matchmaking run finished"
        );
        Ok(report)
    }
}
