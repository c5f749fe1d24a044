//! Request intake: the thin collaborator in front of the engine.
//!
//! Validates and persists incoming bookings, then signals a matchmaking
//! pass. HTTP routing and account management live outside this crate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{
    InvalidTransition, Priority, RequestId, RequestStatus, RiderId, TripRequest, TripRequestDraft,
};
use crate::geo::GeoPoint;
use crate::store::{RequestStore, StoreError};
use crate::trigger::MatchmakerHandle;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

/// Booking payload as received from the outer API layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTripRequest {
    pub user_id: u64,
    pub pickup_address: String,
    pub destination_address: String,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub requested_pickup_time: DateTime<Utc>,
    pub priority: String,
    pub passenger_count: u32,
    pub needs_wheelchair_access: bool,
    pub needs_assistance: bool,
    pub special_requirements: Option<String>,
}

pub struct TripIntake {
    requests: Arc<dyn RequestStore>,
    matchmaking: MatchmakerHandle,
    single_rider_estimated_cost: Decimal,
}

impl TripIntake {
    pub fn new(
        requests: Arc<dyn RequestStore>,
        matchmaking: MatchmakerHandle,
        single_rider_estimated_cost: Decimal,
    ) -> Self {
        Self {
            requests,
            matchmaking,
            single_rider_estimated_cost,
        }
    }

    /// Validate and persist a booking, then signal a matchmaking pass.
    ///
    /// The signal is fire-and-forget: booking latency never includes a
    /// matching pass.
    pub fn create_request(
        &self,
        new: NewTripRequest,
        now: DateTime<Utc>,
    ) -> Result<TripRequest, IntakeError> {
        if new.passenger_count < 1 {
            return Err(IntakeError::Validation(
                "passenger count must be at least 1".to_string(),
            ));
        }
        let priority: Priority = new
            .priority
            .parse()
            .map_err(|_| IntakeError::Validation(format!("unknown priority '{}'", new.priority)))?;

        let pickup = GeoPoint::new(new.pickup_latitude, new.pickup_longitude);
        let destination = GeoPoint::new(new.destination_latitude, new.destination_longitude);
        if !pickup.is_in_range() || !destination.is_in_range() {
            return Err(IntakeError::Validation(
                "coordinates out of range".to_string(),
            ));
        }

        let draft = TripRequestDraft {
            rider: RiderId(new.user_id),
            pickup_address: new.pickup_address,
            destination_address: new.destination_address,
            pickup,
            destination,
            requested_pickup_time: new.requested_pickup_time,
            priority,
            passenger_count: new.passenger_count,
            needs_wheelchair_access: new.needs_wheelchair_access,
            needs_assistance: new.needs_assistance,
            special_requirements: new.special_requirements,
            estimated_cost: Some(self.single_rider_estimated_cost),
            created_at: now,
        };
        let request = self.requests.create(draft)?;

        self.matchmaking.request_run();
        Ok(request)
    }

    /// Parse and apply a status change from its wire string.
    pub fn update_status(&self, id: RequestId, status: &str) -> Result<TripRequest, IntakeError> {
        let next: RequestStatus = status
            .parse()
            .map_err(|_| IntakeError::Validation(format!("unknown status '{status}'")))?;
        let mut request = self.requests.find_by_id(id)?;
        request.transition_to(next)?;
        self.requests.save(&request)?;
        Ok(request)
    }

    pub fn user_trips(&self, rider: RiderId) -> Result<Vec<TripRequest>, IntakeError> {
        Ok(self.requests.find_by_rider(rider)?)
    }

    pub fn pending_trips(&self, now: DateTime<Utc>) -> Result<Vec<TripRequest>, IntakeError> {
        Ok(self.requests.find_pending_future(now)?)
    }
}
