//! Fare splitting across shared-trip members.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency precision: two decimal places.
pub const CURRENCY_SCALE: u32 = 2;

/// Split a total fare evenly over `members` shares.
///
/// Each share is `total / members` rounded half-up to [CURRENCY_SCALE];
/// the first share absorbs the rounding remainder, so the shares always
/// sum to `total` exactly at currency precision. Fixed-point division
/// never fails for non-terminating ratios.
pub fn split_fare(total: Decimal, members: usize) -> Vec<Decimal> {
    if members == 0 {
        return Vec::new();
    }
    let count = Decimal::from(members as u64);
    let share = (total / count)
        .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    let mut shares = vec![share; members];
    // Remainder may be negative when the even share rounded up.
    shares[0] += total - share * count;
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(shares: &[Decimal]) -> Decimal {
        shares.iter().copied().sum()
    }

    #[test]
    fn exact_division_gives_equal_shares() {
        let shares = split_fare(Decimal::new(100, 0), 4);
        assert_eq!(shares, vec![Decimal::new(25, 0); 4]);
    }

    #[test]
    fn non_terminating_ratio_rounds_and_keeps_the_total() {
        // 650 / 3 = 216.666..., rounded share 216.67, first member absorbs -0.01.
        let shares = split_fare(Decimal::new(650, 0), 3);
        assert_eq!(
            shares,
            vec![
                Decimal::new(21666, 2),
                Decimal::new(21667, 2),
                Decimal::new(21667, 2),
            ]
        );
        assert_eq!(total(&shares), Decimal::new(650, 0));
    }

    #[test]
    fn positive_remainder_goes_to_the_first_member() {
        // 10 / 3 = 3.333..., rounded share 3.33, first member absorbs +0.01.
        let shares = split_fare(Decimal::new(10, 0), 3);
        assert_eq!(
            shares,
            vec![
                Decimal::new(334, 2),
                Decimal::new(333, 2),
                Decimal::new(333, 2),
            ]
        );
        assert_eq!(total(&shares), Decimal::new(10, 0));
    }

    #[test]
    fn shares_always_sum_to_the_total() {
        for members in 1..=8 {
            for cents in [1_u64, 99, 650_00, 1234_56, 999_99] {
                let fare = Decimal::new(cents as i64, 2);
                let shares = split_fare(fare, members);
                assert_eq!(shares.len(), members);
                assert_eq!(total(&shares), fare, "{fare} over {members} members");
            }
        }
    }

    #[test]
    fn zero_members_yields_no_shares() {
        assert!(split_fare(Decimal::new(650, 0), 0).is_empty());
    }
}
