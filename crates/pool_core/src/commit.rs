//! Turning an accepted group into a persisted shared trip.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::cost::split_fare;
use crate::domain::{
    InvalidTransition, RequestStatus, SharedTrip, SharedTripDraft, SharedTripStatus, TripRequest,
};
use crate::store::{RequestStore, SharedTripStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("group commit failed: {0}")]
    Store(#[from] StoreError),
    #[error("group commit failed: {0}")]
    Transition(#[from] InvalidTransition),
}

/// A successfully committed group: the trip record plus its members in
/// their post-commit state.
#[derive(Debug)]
pub struct CommittedGroup {
    pub trip: SharedTrip,
    pub members: Vec<TripRequest>,
}

/// Persists formed groups.
///
/// A commit either lands completely or not at all as observed through the
/// stores: member snapshots are taken before any member write, and a
/// mid-commit store failure restores every already-written member and
/// cancels the orphaned trip record before the error is returned. The
/// group's requests then remain Pending for retry on a future run.
pub struct SharedTripCommitter {
    requests: Arc<dyn RequestStore>,
    trips: Arc<dyn SharedTripStore>,
    cost_per_shared_trip: Decimal,
}

impl SharedTripCommitter {
    pub fn new(
        requests: Arc<dyn RequestStore>,
        trips: Arc<dyn SharedTripStore>,
        cost_per_shared_trip: Decimal,
    ) -> Self {
        Self {
            requests,
            trips,
            cost_per_shared_trip,
        }
    }

    pub fn commit(
        &self,
        group: Vec<TripRequest>,
        now: DateTime<Utc>,
    ) -> Result<CommittedGroup, CommitError> {
        // Sum of member passenger counts, not the number of requests.
        let passenger_count = group.iter().map(|r| r.passenger_count).sum();
        let draft = SharedTripDraft {
            estimated_cost: self.cost_per_shared_trip,
            passenger_count,
            member_requests: group.iter().map(|r| r.id).collect(),
            created_at: now,
        };
        let trip = self.trips.create(draft)?;

        let shares = split_fare(self.cost_per_shared_trip, group.len());
        let mut originals = Vec::with_capacity(group.len());
        let mut members = Vec::with_capacity(group.len());

        for (mut member, share) in group.into_iter().zip(shares) {
            let original = member.clone();
            member.shared_trip = Some(trip.id);
            if let Err(err) = member.transition_to(RequestStatus::Matched) {
                self.roll_back(&originals, &trip);
                return Err(err.into());
            }
            member.estimated_cost = Some(share);
            if let Err(err) = self.requests.save(&member) {
                self.roll_back(&originals, &trip);
                return Err(err.into());
            }
            originals.push(original);
            members.push(member);
        }

        Ok(CommittedGroup { trip, members })
    }

    /// Compensate for a partial commit: restore written members to their
    /// pre-commit state and cancel the orphaned trip record.
    fn roll_back(&self, written: &[TripRequest], trip: &SharedTrip) {
        for original in written {
            if let Err(err) = self.requests.save(original) {
                warn!(
                    request = original.id.0,
                    error = %err,
                    "rollback write failed, request left inconsistent"
                );
            }
        }
        let mut cancelled = trip.clone();
        cancelled.status = SharedTripStatus::Cancelled;
        if let Err(err) = self.trips.save(&cancelled) {
            warn!(
                trip = trip.id.0,
                error = %err,
                "failed to cancel orphaned shared trip during rollback"
            );
        }
    }
}
