use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// `equity * risk_pct / (price * stop_pct)`, clamped to `equity * max_position_size /
/// price`. The textbook fixed-fractional position size: risk a fixed slice of equity
/// against the distance to the stop.
pub fn fixed_fractional(
    equity: Decimal,
    risk_pct: Decimal,
    price: Decimal,
    stop_pct: Decimal,
    max_position_size: Decimal,
) -> Decimal {
    if price.is_zero() || stop_pct.is_zero() {
        return Decimal::ZERO;
    }
    let raw = (equity * risk_pct) / (price * stop_pct);
    let cap = (equity * max_position_size) / price;
    raw.min(cap).max(Decimal::ZERO)
}

/// Kelly fraction `f = (b*p - q) / b`, scaled by `fraction_of_kelly` (a "quarter Kelly"
/// style multiplier) and clamped to `[0, 0.25]` of equity before converting to units.
pub fn kelly(
    equity: Decimal,
    price: Decimal,
    win_probability: Decimal,
    win_loss_ratio: Decimal,
    fraction_of_kelly: Decimal,
) -> Decimal {
    if price.is_zero() || win_loss_ratio.is_zero() {
        return Decimal::ZERO;
    }
    let q = Decimal::ONE - win_probability;
    let f = (win_loss_ratio * win_probability - q) / win_loss_ratio;
    let scaled = (f * fraction_of_kelly).max(Decimal::ZERO).min(dec_025());
    (equity * scaled) / price
}

fn dec_025() -> Decimal {
    Decimal::new(25, 2)
}

/// `(equity * risk_pct) / (k * atr)`, clamped to `max_position_size` of equity. Sizes
/// inversely to recent volatility so a fixed risk budget buys fewer units of a choppier
/// instrument.
pub fn volatility_targeted(
    equity: Decimal,
    risk_pct: Decimal,
    atr: Decimal,
    k: Decimal,
    price: Decimal,
    max_position_size: Decimal,
) -> Decimal {
    if atr.is_zero() || k.is_zero() || price.is_zero() {
        return Decimal::ZERO;
    }
    let raw = (equity * risk_pct) / (k * atr);
    let cap = (equity * max_position_size) / price;
    raw.min(cap).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fixed_fractional_respects_cap() {
        let size = fixed_fractional(dec!(10_000), dec!(0.5), dec!(100), dec!(0.01), dec!(0.1));
        // Uncapped would be 10_000*0.5/(100*0.01) = 5000; capped at 10_000*0.1/100 = 10.
        assert_eq!(size, dec!(10));
    }

    #[test]
    fn fixed_fractional_normal_case() {
        let size = fixed_fractional(dec!(10_000), dec!(0.01), dec!(100), dec!(0.02), dec!(1));
        assert_eq!(size, dec!(50));
    }

    #[test]
    fn kelly_negative_edge_floors_to_zero() {
        let size = kelly(dec!(10_000), dec!(100), dec!(0.3), dec!(1), dec!(1));
        assert_eq!(size, Decimal::ZERO);
    }

    #[test]
    fn kelly_positive_edge_is_capped_at_quarter() {
        let size = kelly(dec!(10_000), dec!(100), dec!(0.9), dec!(2), dec!(1));
        // f = (2*0.9 - 0.1)/2 = 0.85, capped to 0.25 -> 10_000*0.25/100 = 25.
        assert_eq!(size, dec!(25));
    }

    #[test]
    fn volatility_targeted_scales_inversely_with_atr() {
        let tight = volatility_targeted(dec!(10_000), dec!(0.01), dec!(1), dec!(1), dec!(100), dec!(1));
        let wide = volatility_targeted(dec!(10_000), dec!(0.01), dec!(5), dec!(1), dec!(100), dec!(1));
        assert!(tight > wide);
    }
}
