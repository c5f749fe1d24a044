//! Narrow persistence interfaces the engine consumes.
//!
//! Storage technology is a collaborator concern; the engine only needs the
//! operations below. `find_pending_future` returns requests in whatever
//! order the backing store produces, and the engine treats that order as
//! its deterministic scan order for the run.

use chrono::{DateTime, Utc};

use crate::domain::{
    RequestId, RiderId, SharedTrip, SharedTripDraft, TripRequest, TripRequestDraft,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    /// Transient persistence failure; the operation may be retried.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait RequestStore: Send + Sync {
    /// Requests with status Pending and a pickup time after `now`, in the
    /// store's default order.
    fn find_pending_future(&self, now: DateTime<Utc>) -> Result<Vec<TripRequest>, StoreError>;

    fn find_by_id(&self, id: RequestId) -> Result<TripRequest, StoreError>;

    fn find_by_rider(&self, rider: RiderId) -> Result<Vec<TripRequest>, StoreError>;

    /// Persist a draft, assigning a fresh identity.
    fn create(&self, draft: TripRequestDraft) -> Result<TripRequest, StoreError>;

    /// Persist the current state of an existing request.
    fn save(&self, request: &TripRequest) -> Result<(), StoreError>;
}

pub trait SharedTripStore: Send + Sync {
    /// Persist a draft, assigning a fresh identity.
    fn create(&self, draft: SharedTripDraft) -> Result<SharedTrip, StoreError>;

    /// Persist the current state of an existing shared trip.
    fn save(&self, trip: &SharedTrip) -> Result<(), StoreError>;
}
