//! Custom Test Assertions
//!
//! Assertion helpers for association billing types with descriptive failure
//! messages.

use rust_decimal::Decimal;

use core_kernel::{ErrorCode, Money};
use domain_billing::{BillingError, FinancialStats};
use domain_membership::{Membership, MembershipStatus};

/// Asserts two amounts are equal, ignoring decimal scale
///
/// # Panics
///
/// Panics if the amounts differ
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Expected {} but got {}",
        expected,
        actual.amount()
    );
}

/// Asserts that money is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money.amount());
}

/// Asserts that the parts sum exactly to the total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = parts.iter().fold(Money::zero(), |acc, m| acc + *m);
    assert_eq!(
        sum.amount(),
        total.amount(),
        "Parts sum {} does not equal total {}",
        sum.amount(),
        total.amount()
    );
}

/// Asserts the three figures of a family's season stats
pub fn assert_stats(stats: &FinancialStats, total_paid: Decimal, total_due: Decimal, balance: Decimal) {
    assert_eq!(
        (stats.total_paid.amount(), stats.total_due.amount(), stats.balance.amount()),
        (total_paid, total_due, balance),
        "Expected paid/due/balance {}/{}/{}, got {}/{}/{}",
        total_paid,
        total_due,
        balance,
        stats.total_paid.amount(),
        stats.total_due.amount(),
        stats.balance.amount()
    );
}

/// Asserts the family has nothing left to pay
pub fn assert_settled(stats: &FinancialStats) {
    assert!(
        stats.is_settled(),
        "Expected a settled balance, {} is still due",
        stats.balance.amount()
    );
}

/// Asserts the family still owes money
pub fn assert_unsettled(stats: &FinancialStats) {
    assert!(
        !stats.is_settled(),
        "Expected an outstanding balance, got {}",
        stats.balance.amount()
    );
}

/// Asserts a result failed with the given domain code
pub fn assert_error_code<T: std::fmt::Debug>(result: &Result<T, BillingError>, expected: ErrorCode) {
    match result {
        Ok(value) => panic!("Expected error {}, got Ok({:?})", expected, value),
        Err(err) => assert_eq!(
            err.code(),
            Some(expected),
            "Expected error {}, got {:?}",
            expected,
            err
        ),
    }
}

/// Asserts every membership carries `expected`
pub fn assert_all_memberships(memberships: &[Membership], expected: MembershipStatus) {
    for membership in memberships {
        assert_eq!(
            membership.status, expected,
            "Membership {} is {:?}, expected {:?}",
            membership.id, membership.status, expected
        );
    }
}

/// Asserts a decimal is within range (inclusive)
pub fn assert_decimal_in_range(value: Decimal, min: Decimal, max: Decimal) {
    assert!(
        value >= min && value <= max,
        "Value {} not in range [{}, {}]",
        value,
        min,
        max
    );
}

/// Asserts that a decimal has at most two fractional digits
pub fn assert_cents_precise(value: Decimal) {
    assert!(
        value.normalize().scale() <= 2,
        "Value {} has more than two decimal places",
        value
    );
}
