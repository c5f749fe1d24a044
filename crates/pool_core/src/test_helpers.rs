//! Test helpers: in-memory collaborators and fixture builders shared by
//! the unit and integration suites.

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    Priority, RequestId, RequestStatus, RiderId, SharedTrip, SharedTripDraft, TripId, TripRequest,
    TripRequestDraft,
};
use crate::geo::GeoPoint;
use crate::notify::{Notifier, NotifyError, SharedTripCreated};
use crate::store::{RequestStore, SharedTripStore, StoreError};

/// Gothenburg central station, the default fixture pickup.
pub const CENTRAL_STATION: GeoPoint = GeoPoint::new(57.7089, 11.9746);

/// Liseberg, the default fixture destination (~1.7 km from the station).
pub const LISEBERG: GeoPoint = GeoPoint::new(57.6951, 11.9873);

/// Frolunda Torg, well over 2 km from both fixture points.
pub const FROLUNDA_TORG: GeoPoint = GeoPoint::new(57.6526, 11.9115);

/// Fixture timestamp on a fixed date, so slot keys are stable across tests.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 15, hour, minute, 0)
        .single()
        .expect("valid fixture time")
}

/// Fixture timestamp on tomorrow's date, for tests that drive the worker
/// with the real clock and need pickups that count as future.
pub fn tomorrow_at(hour: u32, minute: u32) -> DateTime<Utc> {
    (Utc::now() + chrono::Duration::days(1))
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .expect("valid fixture time")
        .and_utc()
}

/// Draft for a pending single-passenger request on the default
/// station-to-Liseberg corridor.
pub fn pending_draft(rider: u64, pickup_time: DateTime<Utc>) -> TripRequestDraft {
    TripRequestDraft {
        rider: RiderId(rider),
        pickup_address: "Centralstationen".to_string(),
        destination_address: "Liseberg".to_string(),
        pickup: CENTRAL_STATION,
        destination: LISEBERG,
        requested_pickup_time: pickup_time,
        priority: Priority::Normal,
        passenger_count: 1,
        needs_wheelchair_access: false,
        needs_assistance: false,
        special_requirements: None,
        estimated_cost: Some(Decimal::new(650, 0)),
        created_at: at(7, 0),
    }
}

/// A pending request with an explicit id, for tests that bypass the store.
pub fn fixture_request(id: u64, pickup_time: DateTime<Utc>) -> TripRequest {
    pending_draft(id, pickup_time).into_request(RequestId(id))
}

#[derive(Default)]
struct RequestStoreInner {
    rows: Vec<TripRequest>,
    next_id: u64,
    /// 1-based countdown to an injected save failure.
    pending_save_failure: Option<u32>,
    fail_next_find: bool,
}

/// Insertion-ordered in-memory request store with failure injection.
#[derive(Default)]
pub struct InMemoryRequestStore {
    inner: Mutex<RequestStoreInner>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-built request, keeping `next_id` ahead of it.
    pub fn insert(&self, request: TripRequest) {
        let mut inner = self.inner.lock().expect("request store mutex poisoned");
        inner.next_id = inner.next_id.max(request.id.0);
        inner.rows.push(request);
    }

    /// Make the n-th upcoming `save` call (1-based) fail once.
    pub fn fail_nth_save(&self, n: u32) {
        let mut inner = self.inner.lock().expect("request store mutex poisoned");
        inner.pending_save_failure = Some(n);
    }

    /// Make the next `find_pending_future` call fail once.
    pub fn fail_next_find(&self) {
        let mut inner = self.inner.lock().expect("request store mutex poisoned");
        inner.fail_next_find = true;
    }

    pub fn all(&self) -> Vec<TripRequest> {
        let inner = self.inner.lock().expect("request store mutex poisoned");
        inner.rows.clone()
    }
}

impl RequestStore for InMemoryRequestStore {
    fn find_pending_future(&self, now: DateTime<Utc>) -> Result<Vec<TripRequest>, StoreError> {
        let mut inner = self.inner.lock().expect("request store mutex poisoned");
        if inner.fail_next_find {
            inner.fail_next_find = false;
            return Err(StoreError::Unavailable("injected find failure".to_string()));
        }
        Ok(inner
            .rows
            .iter()
            .filter(|r| r.status == RequestStatus::Pending && r.requested_pickup_time > now)
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: RequestId) -> Result<TripRequest, StoreError> {
        let inner = self.inner.lock().expect("request store mutex poisoned");
        inner
            .rows
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn find_by_rider(&self, rider: RiderId) -> Result<Vec<TripRequest>, StoreError> {
        let inner = self.inner.lock().expect("request store mutex poisoned");
        Ok(inner
            .rows
            .iter()
            .filter(|r| r.rider == rider)
            .cloned()
            .collect())
    }

    fn create(&self, draft: TripRequestDraft) -> Result<TripRequest, StoreError> {
        let mut inner = self.inner.lock().expect("request store mutex poisoned");
        inner.next_id += 1;
        let request = draft.into_request(RequestId(inner.next_id));
        inner.rows.push(request.clone());
        Ok(request)
    }

    fn save(&self, request: &TripRequest) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("request store mutex poisoned");
        if let Some(n) = inner.pending_save_failure {
            if n <= 1 {
                inner.pending_save_failure = None;
                return Err(StoreError::Unavailable("injected save failure".to_string()));
            }
            inner.pending_save_failure = Some(n - 1);
        }
        let row = inner
            .rows
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or(StoreError::NotFound)?;
        *row = request.clone();
        Ok(())
    }
}

#[derive(Default)]
struct SharedTripStoreInner {
    rows: Vec<SharedTrip>,
    next_id: u64,
    fail_next_create: bool,
}

/// In-memory shared-trip store with failure injection.
#[derive(Default)]
pub struct InMemorySharedTripStore {
    inner: Mutex<SharedTripStoreInner>,
}

impl InMemorySharedTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create` call fail once.
    pub fn fail_next_create(&self) {
        let mut inner = self.inner.lock().expect("trip store mutex poisoned");
        inner.fail_next_create = true;
    }

    pub fn all(&self) -> Vec<SharedTrip> {
        let inner = self.inner.lock().expect("trip store mutex poisoned");
        inner.rows.clone()
    }
}

impl SharedTripStore for InMemorySharedTripStore {
    fn create(&self, draft: SharedTripDraft) -> Result<SharedTrip, StoreError> {
        let mut inner = self.inner.lock().expect("trip store mutex poisoned");
        if inner.fail_next_create {
            inner.fail_next_create = false;
            return Err(StoreError::Unavailable(
                "injected create failure".to_string(),
            ));
        }
        inner.next_id += 1;
        let trip = draft.into_trip(TripId(inner.next_id));
        inner.rows.push(trip.clone());
        Ok(trip)
    }

    fn save(&self, trip: &SharedTrip) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("trip store mutex poisoned");
        let row = inner
            .rows
            .iter_mut()
            .find(|r| r.id == trip.id)
            .ok_or(StoreError::NotFound)?;
        *row = trip.clone();
        Ok(())
    }
}

/// Notifier double that records every event and always succeeds.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<SharedTripCreated>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SharedTripCreated> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &SharedTripCreated) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event.clone());
        Ok(())
    }
}

/// Notifier double that always fails with a server error.
#[derive(Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _event: &SharedTripCreated) -> Result<(), NotifyError> {
        Err(NotifyError::Status(502))
    }
}
