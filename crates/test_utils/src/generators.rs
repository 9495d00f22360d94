//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating charge inputs that satisfy
//! the creation-time validation rules.

use domain_fees::{ChargeInput, DiscountType, FeeStatus};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Positive amounts in cents, 0.01 to 100,000.00
pub fn positive_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Non-negative amounts in cents, 0.00 to 100,000.00
pub fn non_negative_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Valid percentages with two decimal places, 0.00 to 100.00
pub fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Discount types, including an unrecognized one
pub fn discount_type_strategy() -> impl Strategy<Value = Option<DiscountType>> {
    prop_oneof![
        Just(Some(DiscountType::Percentage)),
        Just(Some(DiscountType::Fixed)),
        Just(None),
    ]
}

/// Statuses usable as overrides
pub fn status_strategy() -> impl Strategy<Value = FeeStatus> {
    prop_oneof![
        Just(FeeStatus::Pending),
        Just(FeeStatus::Partial),
        Just(FeeStatus::Paid),
        Just(FeeStatus::Cancelled),
    ]
}

/// Charge inputs that pass discount validation, with any amount paid
pub fn valid_charge_strategy() -> impl Strategy<Value = ChargeInput> {
    (
        positive_amount_strategy(),
        discount_type_strategy(),
        percentage_strategy(),
        non_negative_amount_strategy(),
        non_negative_amount_strategy(),
    )
        .prop_map(|(total, discount_type, percentage, fixed, paid)| {
            let discount_value = match discount_type {
                Some(DiscountType::Percentage) => percentage,
                _ => fixed,
            };
            ChargeInput {
                total_amount: total,
                discount_type,
                discount_value,
                amount_paid: paid,
                explicit_status: None,
            }
        })
}
