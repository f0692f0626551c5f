//! Unit tests for the Money and Percentage types
//!
//! Amounts must keep their exact decimal value through sums and discounts.

use core_kernel::{Money, MoneyError, Percentage};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_keeps_precision() {
        let m = Money::new(dec!(100.123456789));
        assert_eq!(m.amount(), dec!(100.123456789));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        assert!(Money::zero().is_zero());
        assert_eq!(Money::default(), Money::zero());
    }

    #[test]
    fn test_positive_validation_message() {
        let err = Money::positive(dec!(-5)).unwrap_err();
        assert!(matches!(err, MoneyError::InvalidAmount(_)));
    }

    #[test]
    fn test_equality_ignores_trailing_zeros() {
        assert_eq!(Money::new(dec!(100)), Money::new(dec!(100.00)));
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_tenths_do_not_drift() {
        let total: Money = (0..10).map(|_| Money::new(dec!(0.1))).sum();
        assert_eq!(total, Money::new(dec!(1)));
    }

    #[test]
    fn test_sum_of_references() {
        let amounts = vec![Money::new(dec!(12.30)), Money::new(dec!(7.70))];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.amount(), dec!(20.00));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(Money::new(dec!(10)).divide(Decimal::ZERO), Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Money::new(dec!(5)).to_string(), "5.00");
        assert_eq!(Money::new(dec!(5.5)).to_string(), "5.50");
    }
}

mod percentage {
    use super::*;

    #[test]
    fn test_zero_percentage_keeps_amount() {
        let amount = Money::new(dec!(80));
        assert_eq!(Percentage::zero().deduct_from(amount), amount);
    }

    #[test]
    fn test_full_discount() {
        let full = Percentage::new(dec!(100)).unwrap();
        assert!(full.deduct_from(Money::new(dec!(80))).is_zero());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let result: Result<Percentage, _> = serde_json::from_str("\"150\"");
        assert!(result.is_err());

        let ok: Percentage = serde_json::from_str("\"15\"").unwrap();
        assert_eq!(ok.value(), dec!(15));
    }

    #[test]
    fn test_display() {
        assert_eq!(Percentage::new(dec!(12.50)).unwrap().to_string(), "12.5%");
    }
}
