//! Pairwise compatibility: can two trip requests share a ride?

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::config::MatchmakingConfig;
use crate::domain::{RequestId, TripRequest};
use crate::geo::distance_km;

/// Memoised pickup/destination distances for one request pair.
#[derive(Debug, Clone, Copy)]
struct PairDistances {
    pickup_km: f64,
    destination_km: f64,
}

/// Pure, symmetric predicate over request pairs.
///
/// Two requests are compatible when their pickup times fall within the
/// configured window, both their pickups and their destinations lie within
/// the configured distances of each other, and at most one of them needs a
/// wheelchair-accessible vehicle. Assistance need does not affect
/// compatibility.
///
/// The wheelchair rule is a conservative exclusion: the engine does not
/// model whether a vehicle could carry two wheelchair users.
pub struct CompatibilityEvaluator {
    max_pickup_distance_km: f64,
    max_destination_distance_km: f64,
    max_time_difference: chrono::Duration,
    /// Pair distances keyed by symmetric request-id pair. Valid across runs
    /// because request coordinates are immutable after intake.
    distance_cache: Mutex<LruCache<(RequestId, RequestId), PairDistances>>,
}

/// Ungrouped requests stay in the pool and are re-evaluated every run, so
/// the same pairs recur until they are matched or expire.
const DISTANCE_CACHE_ENTRIES: usize = 10_000;

impl CompatibilityEvaluator {
    pub fn new(config: &MatchmakingConfig) -> Self {
        Self {
            max_pickup_distance_km: config.max_pickup_distance_km,
            max_destination_distance_km: config.max_destination_distance_km,
            max_time_difference: chrono::Duration::minutes(config.max_time_difference_minutes),
            distance_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(DISTANCE_CACHE_ENTRIES).expect("cache size must be non-zero"),
            )),
        }
    }

    pub fn compatible(&self, a: &TripRequest, b: &TripRequest) -> bool {
        self.time_compatible(a, b)
            && Self::accessibility_compatible(a, b)
            && self.location_compatible(a, b)
    }

    /// A candidate joins a group only when pairwise-compatible with every
    /// current member, never by transitive inference.
    pub fn compatible_with_group<'a, I>(&self, group: I, candidate: &TripRequest) -> bool
    where
        I: IntoIterator<Item = &'a TripRequest>,
    {
        group
            .into_iter()
            .all(|member| self.compatible(member, candidate))
    }

    fn time_compatible(&self, a: &TripRequest, b: &TripRequest) -> bool {
        let difference = (a.requested_pickup_time - b.requested_pickup_time).abs();
        difference <= self.max_time_difference
    }

    fn location_compatible(&self, a: &TripRequest, b: &TripRequest) -> bool {
        let distances = self.pair_distances(a, b);
        distances.pickup_km <= self.max_pickup_distance_km
            && distances.destination_km <= self.max_destination_distance_km
    }

    fn accessibility_compatible(a: &TripRequest, b: &TripRequest) -> bool {
        !(a.needs_wheelchair_access && b.needs_wheelchair_access)
    }

    fn pair_distances(&self, a: &TripRequest, b: &TripRequest) -> PairDistances {
        // Symmetric key (smaller id first) to maximise cache hits.
        let key = if a.id <= b.id { (a.id, b.id) } else { (b.id, a.id) };
        let mut cache = match self.distance_cache.lock() {
            Ok(guard) => guard,
            Err(_) => return Self::compute_pair_distances(a, b), // Fallback: compute without cache if mutex poisoned
        };
        *cache.get_or_insert(key, || Self::compute_pair_distances(a, b))
    }

    fn compute_pair_distances(a: &TripRequest, b: &TripRequest) -> PairDistances {
        PairDistances {
            pickup_km: distance_km(a.pickup, b.pickup),
            destination_km: distance_km(a.destination, b.destination),
        }
    }
}
