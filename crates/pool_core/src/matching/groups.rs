//! Greedy group formation within one time slot.

use crate::domain::TripRequest;

use super::compat::CompatibilityEvaluator;

/// Result of one formation pass: disjoint groups of 2..=M requests, plus
/// the requests left ungrouped (they stay pending for a future run).
#[derive(Debug, Default)]
pub struct FormationOutcome {
    pub groups: Vec<Vec<TripRequest>>,
    pub ungrouped: Vec<TripRequest>,
}

/// Single-pass greedy clustering over the slot's requests in input order.
///
/// Each unused request seeds a candidate group; later unused requests join
/// while the group is below `max_group_size` and the candidate is
/// compatible with every current member. Candidate groups that end with a
/// single member are discarded.
///
/// The scan is deterministic given input order and O(n²) in the slot size.
/// It never revisits a request once rejected from a group and never tries
/// alternative seed orders, trading grouping optimality for low latency.
pub fn form_groups(
    requests: Vec<TripRequest>,
    evaluator: &CompatibilityEvaluator,
    max_group_size: usize,
) -> FormationOutcome {
    let mut used = vec![false; requests.len()];
    // Destination group per request index; None means ungrouped.
    let mut destination: Vec<Option<usize>> = vec![None; requests.len()];
    let mut group_count = 0;

    for i in 0..requests.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut members = vec![i];

        for j in (i + 1)..requests.len() {
            if used[j] || members.len() >= max_group_size {
                continue;
            }
            let group = members.iter().map(|&m| &requests[m]);
            if evaluator.compatible_with_group(group, &requests[j]) {
                members.push(j);
                used[j] = true;
            }
        }

        if members.len() >= 2 {
            for member in members {
                destination[member] = Some(group_count);
            }
            group_count += 1;
        }
    }

    let mut outcome = FormationOutcome {
        groups: (0..group_count).map(|_| Vec::new()).collect(),
        ungrouped: Vec::new(),
    };
    for (index, request) in requests.into_iter().enumerate() {
        match destination[index] {
            Some(group) => outcome.groups[group].push(request),
            None => outcome.ungrouped.push(request),
        }
    }
    outcome
}
