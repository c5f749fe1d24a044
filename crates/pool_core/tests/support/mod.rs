//! Shared harness for the integration suites: a matchmaker wired to
//! in-memory stores and a recording notifier.

use std::sync::Arc;

use pool_core::config::MatchmakingConfig;
use pool_core::engine::Matchmaker;
use pool_core::test_helpers::{
    InMemoryRequestStore, InMemorySharedTripStore, RecordingNotifier,
};

pub struct Harness {
    pub requests: Arc<InMemoryRequestStore>,
    pub trips: Arc<InMemorySharedTripStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub matchmaker: Arc<Matchmaker>,
}

pub fn harness(config: MatchmakingConfig) -> Harness {
    let requests = Arc::new(InMemoryRequestStore::new());
    let trips = Arc::new(InMemorySharedTripStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let matchmaker = Arc::new(
        Matchmaker::new(
            config,
            requests.clone(),
            trips.clone(),
            notifier.clone(),
        )
        .expect("valid config"),
    );
    Harness {
        requests,
        trips,
        notifier,
        matchmaker,
    }
}
