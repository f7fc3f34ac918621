//! Distance-to-liquidation evaluation.
//!
//! Pure arithmetic over one position snapshot:
//! - Distance is the absolute gap between mark price and liquidation
//!   price, in quote currency, rounded to cents
//! - A position is breaching when the rounded distance is at or below
//!   the subscriber's threshold

use rust_decimal::{Decimal, RoundingStrategy};

use crate::exchange::PositionSnapshot;

/// Decimal places for distance figures (quote-currency cents).
const DISTANCE_DP: u32 = 2;

/// Outcome of evaluating one position against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDecision {
    /// Mark-to-liquidation gap, rounded to cents.
    pub distance: Decimal,
    /// Whether the distance is at or below the threshold.
    pub breaching: bool,
}

/// Evaluate a snapshot against a threshold.
///
/// Returns `None` when the snapshot carries no liquidation price; there is
/// nothing to measure. The rounded distance is the figure compared, so the
/// number shown to the subscriber always matches the decision.
pub fn evaluate(snapshot: &PositionSnapshot, threshold: Decimal) -> Option<AlertDecision> {
    let liquidation = snapshot.liquidation_price?;
    let distance = distance_to_liquidation(snapshot.mark_price, liquidation);

    Some(AlertDecision {
        distance,
        breaching: distance <= threshold,
    })
}

/// Absolute mark-to-liquidation gap in quote currency, rounded to cents.
///
/// The mark sitting below the liquidation level (already through it) still
/// yields a non-negative distance.
pub fn distance_to_liquidation(mark: Decimal, liquidation: Decimal) -> Decimal {
    (mark - liquidation)
        .abs()
        .round_dp_with_strategy(DISTANCE_DP, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{MarginMode, PositionSide};
    use rust_decimal_macros::dec;

    fn snapshot(mark: Decimal, liquidation: Option<Decimal>) -> PositionSnapshot {
        PositionSnapshot {
            coin: "NVDA".to_string(),
            side: PositionSide::Long,
            size: dec!(10),
            leverage: 10,
            margin_mode: MarginMode::Isolated,
            entry_price: Some(dec!(10.3)),
            position_value: mark * dec!(10),
            mark_price: mark,
            liquidation_price: liquidation,
            unrealized_pnl: dec!(-3.9),
        }
    }

    #[test]
    fn test_breach_at_small_gap() {
        // Mark $9.91 against liquidation $10.455 -> $0.545, shown as $0.55
        let decision = evaluate(&snapshot(dec!(9.91), Some(dec!(10.455))), dec!(5)).unwrap();

        assert_eq!(decision.distance, dec!(0.55));
        assert!(decision.breaching);
    }

    #[test]
    fn test_no_breach_above_threshold() {
        let decision = evaluate(&snapshot(dec!(22.45), Some(dec!(10.455))), dec!(5)).unwrap();

        assert_eq!(decision.distance, dec!(12.00));
        assert!(!decision.breaching);
    }

    #[test]
    fn test_exactly_at_threshold_breaches() {
        let decision = evaluate(&snapshot(dec!(15.455), Some(dec!(10.455))), dec!(5)).unwrap();

        assert_eq!(decision.distance, dec!(5.00));
        assert!(decision.breaching);
    }

    #[test]
    fn test_mark_below_liquidation_is_absolute() {
        // Already through the level; the gap is still a positive distance
        let decision = evaluate(&snapshot(dec!(10.20), Some(dec!(10.455))), dec!(5)).unwrap();

        assert_eq!(decision.distance, dec!(0.26));
        assert!(decision.breaching);
    }

    #[test]
    fn test_no_liquidation_price_yields_nothing() {
        assert!(evaluate(&snapshot(dec!(9.91), None), dec!(5)).is_none());
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(
            distance_to_liquidation(dec!(9.91), dec!(10.455)),
            dec!(0.55)
        );
        assert_eq!(distance_to_liquidation(dec!(10), dec!(8.996)), dec!(1.00));
        assert_eq!(distance_to_liquidation(dec!(5.125), dec!(5)), dec!(0.13));
    }

    #[test]
    fn test_rounded_figure_decides_the_breach() {
        // Raw gap 5.004 rounds to 5.00, which is within a $5 threshold
        let decision = evaluate(&snapshot(dec!(15.459), Some(dec!(10.455))), dec!(5)).unwrap();

        assert_eq!(decision.distance, dec!(5.00));
        assert!(decision.breaching);
    }
}
