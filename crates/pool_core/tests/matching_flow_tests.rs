mod support;

use pool_core::config::MatchmakingConfig;
use pool_core::domain::{RequestStatus, SharedTripStatus};
use pool_core::geo::distance_km;
use pool_core::store::RequestStore;
use pool_core::test_helpers::{at, fixture_request, FROLUNDA_TORG};
use rust_decimal::Decimal;
use support::harness;

#[test]
fn compatible_cluster_forms_one_shared_trip() {
    let h = harness(MatchmakingConfig::default());
    h.requests.insert(fixture_request(1, at(9, 0)));
    h.requests.insert(fixture_request(2, at(9, 15)));
    h.requests.insert(fixture_request(3, at(9, 25)));

    let report = h.matchmaker.run_once(at(7, 30)).expect("run");
    assert_eq!(report.groups_formed, 1);
    assert_eq!(report.requests_matched, 3);
    assert_eq!(report.commit_failures, 0);

    let trips = h.trips.all();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].status, SharedTripStatus::Pending);
    assert_eq!(trips[0].member_requests.len(), 3);

    // 650 / 3 with the remainder assigned to the first member in group order.
    let costs: Vec<Decimal> = (1..=3)
        .map(|id| {
            h.requests
                .find_by_id(pool_core::domain::RequestId(id))
                .expect("member")
                .estimated_cost
                .expect("cost set")
        })
        .collect();
    assert_eq!(
        costs,
        vec![
            Decimal::new(21666, 2),
            Decimal::new(21667, 2),
            Decimal::new(21667, 2),
        ]
    );
    assert_eq!(costs.iter().copied().sum::<Decimal>(), Decimal::new(650, 0));

    for request in h.requests.all() {
        assert_eq!(request.status, RequestStatus::Matched);
        assert_eq!(request.shared_trip, Some(trips[0].id));
    }

    let events = h.notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, "MATCHED");
    assert_eq!(events[0].trips.len(), 3);
}

#[test]
fn forty_minute_gap_excludes_the_late_request() {
    // 09:40 is within the window of 09:15 but not of the 09:00 seed, and
    // group membership requires compatibility with every member.
    let h = harness(MatchmakingConfig::default());
    h.requests.insert(fixture_request(1, at(9, 0)));
    h.requests.insert(fixture_request(2, at(9, 15)));
    h.requests.insert(fixture_request(3, at(9, 40)));

    let report = h.matchmaker.run_once(at(7, 30)).expect("run");
    assert_eq!(report.groups_formed, 1);
    assert_eq!(report.requests_matched, 2);

    let late = h
        .requests
        .find_by_id(pool_core::domain::RequestId(3))
        .expect("late request");
    assert_eq!(late.status, RequestStatus::Pending);
    assert_eq!(late.shared_trip, None);
}

#[test]
fn trip_passenger_count_sums_member_passengers() {
    let h = harness(MatchmakingConfig::default());
    let mut first = fixture_request(1, at(9, 0));
    first.passenger_count = 2;
    h.requests.insert(first);
    h.requests.insert(fixture_request(2, at(9, 10)));

    h.matchmaker.run_once(at(7, 30)).expect("run");

    let trips = h.trips.all();
    assert_eq!(trips.len(), 1);
    // Two member requests carrying three passengers in total.
    assert_eq!(trips[0].member_requests.len(), 2);
    assert_eq!(trips[0].passenger_count, 3);
    assert_eq!(h.notifier.events()[0].passenger_count, 3);
}

#[test]
fn wheelchair_pair_is_never_grouped() {
    let h = harness(MatchmakingConfig::default());
    let mut a = fixture_request(1, at(9, 0));
    let mut b = fixture_request(2, at(9, 5));
    a.needs_wheelchair_access = true;
    b.needs_wheelchair_access = true;
    h.requests.insert(a);
    h.requests.insert(b);

    let report = h.matchmaker.run_once(at(7, 30)).expect("run");
    assert_eq!(report.groups_formed, 0);
    assert!(h.trips.all().is_empty());
    for request in h.requests.all() {
        assert_eq!(request.status, RequestStatus::Pending);
    }
}

#[test]
fn slot_boundary_straddlers_stay_pending() {
    // 09:59 and 10:01 pass the 30-minute check but land in different
    // 2-hour slots and are never compared.
    let h = harness(MatchmakingConfig::default());
    h.requests.insert(fixture_request(1, at(9, 59)));
    h.requests.insert(fixture_request(2, at(10, 1)));

    let report = h.matchmaker.run_once(at(7, 30)).expect("run");
    assert_eq!(report.groups_formed, 0);
    assert!(h.trips.all().is_empty());
    for request in h.requests.all() {
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.shared_trip, None);
    }
}

#[test]
fn lone_request_creates_no_trip() {
    let h = harness(MatchmakingConfig::default());
    h.requests.insert(fixture_request(1, at(9, 0)));

    let report = h.matchmaker.run_once(at(7, 30)).expect("run");
    assert_eq!(report.groups_formed, 0);
    assert!(h.trips.all().is_empty());
    assert_eq!(
        h.requests
            .find_by_id(pool_core::domain::RequestId(1))
            .expect("request")
            .status,
        RequestStatus::Pending
    );
}

#[test]
fn rerun_without_new_requests_forms_nothing() {
    let h = harness(MatchmakingConfig::default());
    h.requests.insert(fixture_request(1, at(9, 0)));
    h.requests.insert(fixture_request(2, at(9, 10)));

    let first = h.matchmaker.run_once(at(7, 30)).expect("first run");
    assert_eq!(first.groups_formed, 1);

    let second = h.matchmaker.run_once(at(7, 30)).expect("second run");
    assert_eq!(second.groups_formed, 0);
    assert_eq!(h.trips.all().len(), 1);
}

#[test]
fn formation_is_reproducible_across_identical_pools() {
    let seed = |h: &support::Harness| {
        for i in 1..=9 {
            let mut request = fixture_request(i, at(9, (i as u32 * 6) % 55));
            request.needs_wheelchair_access = i % 4 == 0;
            if i % 3 == 0 {
                request.pickup = FROLUNDA_TORG;
            }
            h.requests.insert(request);
        }
    };

    let first = harness(MatchmakingConfig::default());
    seed(&first);
    first.matchmaker.run_once(at(7, 30)).expect("run");

    let second = harness(MatchmakingConfig::default());
    seed(&second);
    second.matchmaker.run_once(at(7, 30)).expect("run");

    let members = |h: &support::Harness| {
        h.trips
            .all()
            .into_iter()
            .map(|t| t.member_requests)
            .collect::<Vec<_>>()
    };
    assert_eq!(members(&first), members(&second));
}

#[test]
fn every_emitted_group_satisfies_the_pairwise_limits() {
    let config = MatchmakingConfig::default();
    let h = harness(config.clone());
    for i in 1..=12 {
        let mut request = fixture_request(i, at(8 + (i as u32 % 3), (i as u32 * 11) % 60));
        request.needs_wheelchair_access = i % 5 == 0;
        if i % 4 == 0 {
            request.destination = FROLUNDA_TORG;
        }
        h.requests.insert(request);
    }

    h.matchmaker.run_once(at(6, 0)).expect("run");

    for trip in h.trips.all() {
        let members: Vec<_> = trip
            .member_requests
            .iter()
            .map(|&id| h.requests.find_by_id(id).expect("member"))
            .collect();
        assert!(members.len() >= 2);
        assert!(members.len() <= config.max_passengers_per_trip as usize);

        for x in &members {
            assert_eq!(x.status, RequestStatus::Matched);
            for y in &members {
                if x.id == y.id {
                    continue;
                }
                let gap = (x.requested_pickup_time - y.requested_pickup_time)
                    .abs()
                    .num_minutes();
                assert!(gap <= config.max_time_difference_minutes);
                assert!(distance_km(x.pickup, y.pickup) <= config.max_pickup_distance_km);
                assert!(
                    distance_km(x.destination, y.destination)
                        <= config.max_destination_distance_km
                );
                assert!(!(x.needs_wheelchair_access && y.needs_wheelchair_access));
            }
        }
    }
}
