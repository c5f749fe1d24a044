//! Time-slot partitioning of the pending-request pool.
//!
//! Clustering only ever compares requests inside one slot, which keeps the
//! greedy scan from touching pairs whose pickup times are hours apart.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Timelike, Utc};

use crate::domain::TripRequest;

/// Fixed 2-hour matching window: calendar date plus even-hour bucket
/// (00-02, 02-04, ...).
///
/// Requests on opposite sides of an even-hour boundary land in different
/// slots and are never compared, even when their pickup times are minutes
/// apart (09:59 vs 10:01). This is a known limitation of the bucketing,
/// kept for compatibility; partitioning narrows the comparison set for
/// performance and asserts nothing about cross-slot incompatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub hour_bucket: u32,
}

impl SlotKey {
    pub fn for_time(time: DateTime<Utc>) -> Self {
        Self {
            date: time.date_naive(),
            hour_bucket: (time.hour() / 2) * 2,
        }
    }
}

/// Bucket requests by slot, preserving input order within each slot.
///
/// The `BTreeMap` makes slot iteration order deterministic, so a whole run
/// is reproducible given the store's returned order.
pub fn partition(requests: Vec<TripRequest>) -> BTreeMap<SlotKey, Vec<TripRequest>> {
    let mut slots: BTreeMap<SlotKey, Vec<TripRequest>> = BTreeMap::new();
    for request in requests {
        slots
            .entry(SlotKey::for_time(request.requested_pickup_time))
            .or_default()
            .push(request);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{at, fixture_request};

    #[test]
    fn buckets_align_to_even_hours() {
        assert_eq!(SlotKey::for_time(at(8, 0)).hour_bucket, 8);
        assert_eq!(SlotKey::for_time(at(9, 59)).hour_bucket, 8);
        assert_eq!(SlotKey::for_time(at(10, 1)).hour_bucket, 10);
        assert_eq!(SlotKey::for_time(at(23, 30)).hour_bucket, 22);
        assert_eq!(SlotKey::for_time(at(0, 0)).hour_bucket, 0);
    }

    #[test]
    fn boundary_straddling_requests_fall_in_different_slots() {
        // 09:59 and 10:01 are two minutes apart but never compared.
        let before = SlotKey::for_time(at(9, 59));
        let after = SlotKey::for_time(at(10, 1));
        assert_ne!(before, after);
        assert_eq!(before.date, after.date);
    }

    #[test]
    fn partition_preserves_input_order_within_a_slot() {
        let requests = vec![
            fixture_request(1, at(9, 40)),
            fixture_request(2, at(8, 5)),
            fixture_request(3, at(9, 10)),
            fixture_request(4, at(14, 0)),
        ];

        let slots = partition(requests);
        assert_eq!(slots.len(), 2);

        let morning: Vec<u64> = slots[&SlotKey::for_time(at(9, 0))]
            .iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(morning, vec![1, 2, 3]);

        let afternoon: Vec<u64> = slots[&SlotKey::for_time(at(14, 0))]
            .iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(afternoon, vec![4]);
    }

    #[test]
    fn slots_are_distinct_across_dates() {
        let today = fixture_request(1, at(1, 0));
        let mut tomorrow = fixture_request(2, at(1, 0));
        tomorrow.requested_pickup_time += chrono::Duration::days(1);

        let slots = partition(vec![today, tomorrow]);
        assert_eq!(slots.len(), 2);
    }
}
