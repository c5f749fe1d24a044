//! Domain records for the pooling engine: individual trip requests and the
//! shared trips they are merged into.
//!
//! Both record types are plain data; all mutation beyond the checked status
//! transition happens in the engine modules that own the respective step.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RiderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DriverId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripId(pub u64);

/// Returned when a wire string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised value: {0}")]
pub struct ParseEnumError(pub String);

/// Lifecycle of a single trip request.
///
/// Transitions move only forward along Pending → Matched → Assigned →
/// PickupConfirmed → InTransit → Completed; Cancelled is reachable from any
/// non-terminal state. The engine itself performs only Pending → Matched;
/// later stages belong to dispatch and driver flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Matched,
    Assigned,
    PickupConfirmed,
    InTransit,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    fn stage(self) -> u8 {
        match self {
            RequestStatus::Pending => 0,
            RequestStatus::Matched => 1,
            RequestStatus::Assigned => 2,
            RequestStatus::PickupConfirmed => 3,
            RequestStatus::InTransit => 4,
            RequestStatus::Completed => 5,
            RequestStatus::Cancelled => u8::MAX,
        }
    }

    /// Forward-only transition check. Skipping intermediate stages is
    /// allowed because downstream collaborators report at coarser
    /// granularity; moving backwards never is.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            RequestStatus::Cancelled => true,
            _ => next.stage() > self.stage(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Matched => "MATCHED",
            RequestStatus::Assigned => "ASSIGNED",
            RequestStatus::PickupConfirmed => "PICKUP_CONFIRMED",
            RequestStatus::InTransit => "IN_TRANSIT",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "MATCHED" => Ok(RequestStatus::Matched),
            "ASSIGNED" => Ok(RequestStatus::Assigned),
            "PICKUP_CONFIRMED" => Ok(RequestStatus::PickupConfirmed),
            "IN_TRANSIT" => Ok(RequestStatus::InTransit),
            "COMPLETED" => Ok(RequestStatus::Completed),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Priority::Low),
            "NORMAL" => Ok(Priority::Normal),
            "HIGH" => Ok(Priority::High),
            "URGENT" => Ok(Priority::Urgent),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

/// Rejected status change on a [TripRequest].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid status transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: RequestStatus,
    pub to: RequestStatus,
}

/// One passenger's ride need.
///
/// Coordinates and pickup time are immutable after intake; the pooling
/// engine relies on this when caching pair distances by request id.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub id: RequestId,
    pub rider: RiderId,
    pub pickup_address: String,
    pub destination_address: String,
    pub pickup: GeoPoint,
    pub destination: GeoPoint,
    pub requested_pickup_time: DateTime<Utc>,
    pub status: RequestStatus,
    pub priority: Priority,
    pub passenger_count: u32,
    pub needs_wheelchair_access: bool,
    pub needs_assistance: bool,
    pub special_requirements: Option<String>,
    pub assigned_driver: Option<DriverId>,
    /// Owning shared trip, set exactly once by the committer. A request
    /// with `Some(_)` here has status Matched or later.
    pub shared_trip: Option<TripId>,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl TripRequest {
    /// Apply a checked forward-only status transition.
    pub fn transition_to(&mut self, next: RequestStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Request fields as they exist before the store has assigned an identity.
#[derive(Debug, Clone)]
pub struct TripRequestDraft {
    pub rider: RiderId,
    pub pickup_address: String,
    pub destination_address: String,
    pub pickup: GeoPoint,
    pub destination: GeoPoint,
    pub requested_pickup_time: DateTime<Utc>,
    pub priority: Priority,
    pub passenger_count: u32,
    pub needs_wheelchair_access: bool,
    pub needs_assistance: bool,
    pub special_requirements: Option<String>,
    pub estimated_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl TripRequestDraft {
    pub fn into_request(self, id: RequestId) -> TripRequest {
        TripRequest {
            id,
            rider: self.rider,
            pickup_address: self.pickup_address,
            destination_address: self.destination_address,
            pickup: self.pickup,
            destination: self.destination,
            requested_pickup_time: self.requested_pickup_time,
            status: RequestStatus::Pending,
            priority: self.priority,
            passenger_count: self.passenger_count,
            needs_wheelchair_access: self.needs_wheelchair_access,
            needs_assistance: self.needs_assistance,
            special_requirements: self.special_requirements,
            assigned_driver: None,
            shared_trip: None,
            estimated_cost: self.estimated_cost,
            actual_cost: None,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedTripStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

/// A committed group of requests riding together.
///
/// Created exclusively by the committer, never deleted; later stages only
/// move the status forward. `passenger_count` is the sum of the member
/// requests' passenger counts, not the number of members.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedTrip {
    pub id: TripId,
    pub status: SharedTripStatus,
    pub assigned_driver: Option<DriverId>,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub passenger_count: u32,
    /// Opaque stop orderings produced by downstream route planning.
    pub pickup_sequence: Option<String>,
    pub dropoff_sequence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Member requests in group order; fixed at creation time.
    pub member_requests: Vec<RequestId>,
}

/// Shared-trip fields as built by the committer before the store has
/// assigned an identity.
#[derive(Debug, Clone)]
pub struct SharedTripDraft {
    pub estimated_cost: Decimal,
    pub passenger_count: u32,
    pub member_requests: Vec<RequestId>,
    pub created_at: DateTime<Utc>,
}

impl SharedTripDraft {
    pub fn into_trip(self, id: TripId) -> SharedTrip {
        SharedTrip {
            id,
            status: SharedTripStatus::Pending,
            assigned_driver: None,
            estimated_cost: Some(self.estimated_cost),
            actual_cost: None,
            passenger_count: self.passenger_count,
            pickup_sequence: None,
            dropoff_sequence: None,
            created_at: self.created_at,
            completed_at: None,
            member_requests: self.member_requests,
        }
    }
}
