use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Linear interpolation between the two nearest order statistics of an ascending-sorted
/// slice. `p` is clamped to `[0, 1]`.
pub fn percentile(sorted_ascending: &[Decimal], p: Decimal) -> Decimal {
    let n = sorted_ascending.len();
    if n == 0 {
        return Decimal::ZERO;
    }
    if n == 1 {
        return sorted_ascending[0];
    }

    let p = p.max(Decimal::ZERO).min(Decimal::ONE);
    let rank = p * Decimal::from(n - 1);
    let lower_idx = rank.floor().to_usize().unwrap_or(0).min(n - 1);
    let upper_idx = (lower_idx + 1).min(n - 1);
    let frac = rank - rank.floor();

    sorted_ascending[lower_idx] + frac * (sorted_ascending[upper_idx] - sorted_ascending[lower_idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let values = vec![dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)];
        assert_eq!(percentile(&values, dec!(0.5)), dec!(3));
        assert_eq!(percentile(&values, dec!(0.0)), dec!(1));
        assert_eq!(percentile(&values, dec!(1.0)), dec!(5));
        assert_eq!(percentile(&values, dec!(0.25)), dec!(2));
    }

    #[test]
    fn single_value_returns_itself_regardless_of_percentile() {
        let values = vec![dec!(42)];
        assert_eq!(percentile(&values, dec!(0.1)), dec!(42));
        assert_eq!(percentile(&values, dec!(0.9)), dec!(42));
    }
}
