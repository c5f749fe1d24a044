//! End-to-end demo: book a handful of requests through intake and let the
//! background worker pool them into shared trips.
//!
//! Run with `cargo run --example matchmaking_run`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;

use pool_core::config::MatchmakingConfig;
use pool_core::engine::Matchmaker;
use pool_core::intake::{NewTripRequest, TripIntake};
use pool_core::test_helpers::{
    tomorrow_at, InMemoryRequestStore, InMemorySharedTripStore, RecordingNotifier,
};
use pool_core::trigger::MatchmakerWorker;

fn booking(user: u64, minute: u32, wheelchair: bool) -> NewTripRequest {
    NewTripRequest {
        user_id: user,
        pickup_address: "Centralstationen".to_string(),
        destination_address: "Liseberg".to_string(),
        pickup_latitude: 57.7089,
        pickup_longitude: 11.9746,
        destination_latitude: 57.6951,
        destination_longitude: 11.9873,
        requested_pickup_time: tomorrow_at(9, minute),
        priority: "NORMAL".to_string(),
        passenger_count: 1,
        needs_wheelchair_access: wheelchair,
        needs_assistance: false,
        special_requirements: None,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pool_core=debug".into()),
        )
        .init();

    let requests = Arc::new(InMemoryRequestStore::new());
    let trips = Arc::new(InMemorySharedTripStore::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let matchmaker = Arc::new(
        Matchmaker::new(
            MatchmakingConfig::default(),
            requests.clone(),
            trips.clone(),
            notifier.clone(),
        )
        .expect("valid config"),
    );
    let worker = MatchmakerWorker::spawn(matchmaker, Duration::from_secs(60));
    let intake = TripIntake::new(requests.clone(), worker.handle(), Decimal::new(650, 0));

    for (user, minute, wheelchair) in [(1, 0, false), (2, 10, false), (3, 20, true), (4, 25, true)]
    {
        let request = intake
            .create_request(booking(user, minute, wheelchair), Utc::now())
            .expect("booking accepted");
        println!(
            "booked request {} for rider {} at {}",
            request.id.0, request.rider.0, request.requested_pickup_time
        );
    }

    // Let the booking-triggered passes finish.
    thread::sleep(Duration::from_millis(500));
    worker.shutdown();

    for trip in trips.all() {
        println!(
            "shared trip {}: {} members, {} passengers, estimated cost {:?}",
            trip.id.0,
            trip.member_requests.len(),
            trip.passenger_count,
            trip.estimated_cost
        );
    }
    for event in notifier.events() {
        println!(
            "dispatch notified: trip {} with {} member summaries",
            event.shared_trip_id,
            event.trips.len()
        );
    }
}
