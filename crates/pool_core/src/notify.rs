//! Best-effort push of newly formed shared trips to the real-time
//! dispatch service.
//!
//! Delivery is fire-and-forget with at most one attempt per commit: the
//! downstream service reconciles independently when a notification is
//! lost, so a failure here never rolls back or retries the commit.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{SharedTrip, TripRequest};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("realtime service returned status {0}")]
    Status(u16),
}

/// Outbound summary of one committed shared trip.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedTripCreated {
    pub shared_trip_id: u64,
    pub status: &'static str,
    pub passenger_count: u32,
    pub trips: Vec<TripSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub trip_id: u64,
    pub user_id: u64,
    pub pickup_address: String,
    pub destination_address: String,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub requested_pickup_time: DateTime<Utc>,
    pub passenger_count: u32,
    pub needs_wheelchair_access: bool,
    pub needs_assistance: bool,
}

impl SharedTripCreated {
    pub fn from_commit(trip: &SharedTrip, members: &[TripRequest]) -> Self {
        Self {
            shared_trip_id: trip.id.0,
            status: "MATCHED",
            passenger_count: trip.passenger_count,
            trips: members
                .iter()
                .map(|request| TripSummary {
                    trip_id: request.id.0,
                    user_id: request.rider.0,
                    pickup_address: request.pickup_address.clone(),
                    destination_address: request.destination_address.clone(),
                    pickup_latitude: request.pickup.lat,
                    pickup_longitude: request.pickup.lng,
                    destination_latitude: request.destination.lat,
                    destination_longitude: request.destination.lng,
                    requested_pickup_time: request.requested_pickup_time,
                    passenger_count: request.passenger_count,
                    needs_wheelchair_access: request.needs_wheelchair_access,
                    needs_assistance: request.needs_assistance,
                })
                .collect(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: &SharedTripCreated) -> Result<(), NotifyError>;
}

/// Thin HTTP client posting trip summaries to the dispatch service.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpNotifier {
    /// Create a notifier for the given endpoint (e.g. `http://localhost:3001`).
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build notification client");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

impl Notifier for HttpNotifier {
    fn notify(&self, event: &SharedTripCreated) -> Result<(), NotifyError> {
        let url = format!("{}/api/shared-trip-created", self.endpoint);
        let response = self.client.post(&url).json(event).send()?;
        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SharedTripDraft, TripId};
    use crate::test_helpers::{at, fixture_request};
    use rust_decimal::Decimal;

    #[test]
    fn payload_uses_the_documented_wire_fields() {
        let mut member = fixture_request(7, at(9, 0));
        member.needs_assistance = true;
        let trip = SharedTripDraft {
            estimated_cost: Decimal::new(650, 0),
            passenger_count: 3,
            member_requests: vec![member.id],
            created_at: at(8, 0),
        }
        .into_trip(TripId(42));

        let event = SharedTripCreated::from_commit(&trip, &[member]);
        let json = serde_json::to_value(&event).expect("serialize");

        assert_eq!(json["sharedTripId"], 42);
        assert_eq!(json["status"], "MATCHED");
        assert_eq!(json["passengerCount"], 3);
        let trips = json["trips"].as_array().expect("trips array");
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0]["tripId"], 7);
        assert_eq!(trips[0]["userId"], 7);
        assert!(trips[0]["pickupLatitude"].is_number());
        assert!(trips[0]["destinationLongitude"].is_number());
        assert!(trips[0]["requestedPickupTime"].is_string());
        assert_eq!(trips[0]["needsWheelchairAccess"], false);
        assert_eq!(trips[0]["needsAssistance"], true);
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let notifier = HttpNotifier::new("http://localhost:3001/", Duration::from_secs(1));
        assert_eq!(notifier.endpoint, "http://localhost:3001");
    }
}
