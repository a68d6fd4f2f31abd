//! Comprehensive unit tests for the Money module
//!
//! Tests cover money creation, arithmetic operations, rounding,
//! quantities, and edge cases.

use core_kernel::{Money, Quantity};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(100.50));
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_new_rounds_to_two_decimal_places() {
        let m = Money::new(dec!(100.123456789));
        assert_eq!(m.amount(), dec!(100.12));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        assert_eq!(Money::new(dec!(0.125)).amount(), dec!(0.13));
        assert_eq!(Money::new(dec!(-0.125)).amount(), dec!(-0.13));
    }

    #[test]
    fn test_from_f64_coerces_finite_values() {
        let m = Money::from_f64(19.999);
        assert_eq!(m.amount(), dec!(20.00));
    }

    #[test]
    fn test_from_f64_non_finite_becomes_zero() {
        assert_eq!(Money::from_f64(f64::NAN), Money::ZERO);
        assert_eq!(Money::from_f64(f64::INFINITY), Money::ZERO);
    }

    #[test]
    fn test_from_f64_or_uses_fallback() {
        let fallback = Money::new(dec!(7));
        assert_eq!(Money::from_f64_or(f64::NAN, fallback), fallback);
        assert_eq!(Money::from_f64_or(1.5, fallback), Money::new(dec!(1.50)));
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(Money::default(), Money::ZERO);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_addition_and_subtraction() {
        let a = Money::new(dec!(10.25));
        let b = Money::new(dec!(4.75));
        assert_eq!(a + b, Money::new(dec!(15.00)));
        assert_eq!(a - b, Money::new(dec!(5.50)));
    }

    #[test]
    fn test_assign_operators() {
        let mut m = Money::new(dec!(1));
        m += Money::new(dec!(2));
        m -= Money::new(dec!(0.5));
        assert_eq!(m, Money::new(dec!(2.50)));
    }

    #[test]
    fn test_negation() {
        assert_eq!(-Money::new(dec!(3)), Money::new(dec!(-3)));
    }

    #[test]
    fn test_sum_over_iterator() {
        let total: Money = vec![dec!(1.11), dec!(2.22), dec!(3.33)]
            .into_iter()
            .map(Money::new)
            .sum();
        assert_eq!(total, Money::new(dec!(6.66)));
    }

    #[test]
    fn test_repeated_addition_does_not_drift() {
        let mut total = Money::ZERO;
        for _ in 0..1000 {
            total += Money::new(dec!(0.10));
        }
        assert_eq!(total, Money::new(dec!(100.00)));
    }

    #[test]
    fn test_multiply_rerounds() {
        let m = Money::new(dec!(9.99)).multiply(dec!(0.5));
        assert_eq!(m.amount(), dec!(5.00));
    }
}

mod bounds {
    use super::*;

    #[test]
    fn test_max_zero_floors_negative_amounts() {
        assert_eq!(Money::new(dec!(-5)).max_zero(), Money::ZERO);
        assert_eq!(Money::new(dec!(5)).max_zero(), Money::new(dec!(5)));
    }

    #[test]
    fn test_clamp() {
        let low = Money::ZERO;
        let high = Money::new(dec!(100));
        assert_eq!(Money::new(dec!(-1)).clamp(low, high), low);
        assert_eq!(Money::new(dec!(101)).clamp(low, high), high);
        assert_eq!(Money::new(dec!(50)).clamp(low, high), Money::new(dec!(50)));
    }

    #[test]
    fn test_min_max() {
        let a = Money::new(dec!(2));
        let b = Money::new(dec!(3));
        assert_eq!(a.min(b), a);
        assert_eq!(a.max(b), b);
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Money::new(dec!(0.01)).is_positive());
        assert!(Money::new(dec!(-0.01)).is_negative());
        assert!(Money::ZERO.is_zero());
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
    }

    #[test]
    fn test_abs() {
        assert_eq!(Money::new(dec!(-4.20)).abs(), Money::new(dec!(4.20)));
    }
}

mod display {
    use super::*;

    #[test]
    fn test_display_always_shows_cents() {
        assert_eq!(Money::new(dec!(5)).to_string(), "5.00");
        assert_eq!(Money::new(dec!(5.5)).to_string(), "5.50");
    }
}

mod quantity {
    use super::*;

    #[test]
    fn test_quantities_are_not_rounded() {
        let q = Quantity::new(dec!(1.2345));
        assert_eq!(q.value(), dec!(1.2345));
    }

    #[test]
    fn test_times_cost_produces_rounded_money() {
        let q = Quantity::new(dec!(1.333));
        let total = q.times_cost(Money::new(dec!(3)));
        assert_eq!(total, Money::new(dec!(4.00)));
    }

    #[test]
    fn test_fractional_units_price_correctly() {
        // 0.5 kg at 7.99 per kg
        let total = Quantity::new(dec!(0.5)).times_cost(Money::new(dec!(7.99)));
        assert_eq!(total, Money::new(dec!(4.00)));
    }

    #[test]
    fn test_quantity_arithmetic() {
        let a = Quantity::new(dec!(5));
        let b = Quantity::new(dec!(2));
        assert_eq!(a - b, Quantity::new(dec!(3)));
        assert_eq!(a + b, Quantity::new(dec!(7)));
    }

    #[test]
    fn test_quantity_bounds() {
        assert_eq!(Quantity::new(dec!(-1)).max_zero(), Quantity::ZERO);
        assert_eq!(Quantity::new(dec!(-2)).abs(), Quantity::new(dec!(2)));
        assert_eq!(
            Quantity::new(dec!(4)).min(Quantity::new(dec!(6))),
            Quantity::new(dec!(4))
        );
    }

    #[test]
    fn test_serde_is_transparent() {
        let q = Quantity::new(dec!(2.5));
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, "\"2.5\"");
        let back: Quantity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}
