//! Discount calculation
//!
//! Turns a nominal charge and a discount policy into a discount amount.
//! The calculator never fails: out-of-range input is clamped, and an
//! unknown discount type yields no discount. Rejecting bad input is the job
//! of [`validate_discount`], which callers run before accepting user input.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const HUNDRED: Decimal = dec!(100);

/// How a discount value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Value is a percentage of the total, 0-100
    Percentage,
    /// Value is an absolute amount
    Fixed,
}

impl DiscountType {
    /// Returns the stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }

    /// Parses a caller-supplied discount type, case-insensitively
    ///
    /// Unknown or empty input yields `None`, which the calculator treats as
    /// "no discount".
    pub fn parse_lenient(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a discount type string is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDiscountType(pub String);

impl fmt::Display for UnknownDiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown discount type: {}", self.0)
    }
}

impl std::error::Error for UnknownDiscountType {}

impl FromStr for DiscountType {
    type Err = UnknownDiscountType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            _ => Err(UnknownDiscountType(s.to_string())),
        }
    }
}

/// Calculates the discount amount for a charge
///
/// # Arguments
///
/// * `total_amount` - Nominal charge before discount
/// * `discount_type` - How to interpret `discount_value`; `None` means no discount
/// * `discount_value` - Percentage (clamped to 0-100) or fixed amount (capped at the total)
///
/// # Returns
///
/// A discount in `0..=total_amount`. Zero when the total or the value is not positive.
pub fn calculate_discount_amount(
    total_amount: Decimal,
    discount_type: Option<DiscountType>,
    discount_value: Decimal,
) -> Decimal {
    if total_amount <= Decimal::ZERO || discount_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    match discount_type {
        Some(DiscountType::Percentage) => {
            let percentage = discount_value.clamp(Decimal::ZERO, HUNDRED);
            // The rate is at most 1, so the product never exceeds the total
            total_amount * (percentage / HUNDRED)
        }
        Some(DiscountType::Fixed) => discount_value.min(total_amount),
        None => Decimal::ZERO,
    }
}

/// Validates a discount value against its type
///
/// Percentages must lie in `0..=100`. Fixed amounts only need to be
/// non-negative; capping at the total happens at calculation time.
pub fn validate_discount(discount_value: Decimal, discount_type: Option<DiscountType>) -> bool {
    if discount_value < Decimal::ZERO {
        return false;
    }

    match discount_type {
        Some(DiscountType::Percentage) => discount_value <= HUNDRED,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_of_largest_totals() {
        let total = Decimal::MAX;
        let discount = calculate_discount_amount(total, Some(DiscountType::Percentage), dec!(20));
        assert!(discount > Decimal::ZERO && discount < total);

        let total = dec!(10000000000000000000000000000);
        let discount = calculate_discount_amount(total, Some(DiscountType::Percentage), dec!(20));
        assert_eq!(discount, dec!(2000000000000000000000000000));
        assert_eq!(
            calculate_discount_amount(total, Some(DiscountType::Percentage), dec!(100)),
            total
        );
    }

    #[test]
    fn test_percentage_discount() {
        let discount = calculate_discount_amount(dec!(1000), Some(DiscountType::Percentage), dec!(20));
        assert_eq!(discount, dec!(200));
    }

    #[test]
    fn test_percentage_is_clamped_to_hundred() {
        let discount = calculate_discount_amount(dec!(500), Some(DiscountType::Percentage), dec!(150));
        assert_eq!(discount, dec!(500));
    }

    #[test]
    fn test_fixed_discount_capped_at_total() {
        let discount = calculate_discount_amount(dec!(600), Some(DiscountType::Fixed), dec!(1000));
        assert_eq!(discount, dec!(600));

        let discount = calculate_discount_amount(dec!(600), Some(DiscountType::Fixed), dec!(75.25));
        assert_eq!(discount, dec!(75.25));
    }

    #[test]
    fn test_no_discount_on_non_positive_total() {
        assert_eq!(calculate_discount_amount(Decimal::ZERO, Some(DiscountType::Fixed), dec!(10)), Decimal::ZERO);
        assert_eq!(calculate_discount_amount(dec!(-5), Some(DiscountType::Percentage), dec!(10)), Decimal::ZERO);
    }

    #[test]
    fn test_no_discount_on_non_positive_value() {
        assert_eq!(calculate_discount_amount(dec!(100), Some(DiscountType::Fixed), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(calculate_discount_amount(dec!(100), Some(DiscountType::Percentage), dec!(-3)), Decimal::ZERO);
    }

    #[test]
    fn test_unknown_type_gives_no_discount() {
        assert_eq!(calculate_discount_amount(dec!(100), None, dec!(50)), Decimal::ZERO);
        assert_eq!(DiscountType::parse_lenient("coupon"), None);
        assert_eq!(DiscountType::parse_lenient(""), None);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(DiscountType::parse_lenient("PERCENTAGE"), Some(DiscountType::Percentage));
        assert_eq!(DiscountType::parse_lenient(" Fixed "), Some(DiscountType::Fixed));
        assert_eq!(DiscountType::Fixed.to_string(), "fixed");
    }

    #[test]
    fn test_validate_discount() {
        assert!(!validate_discount(dec!(150), Some(DiscountType::Percentage)));
        assert!(validate_discount(dec!(150), Some(DiscountType::Fixed)));
        assert!(validate_discount(dec!(100), Some(DiscountType::Percentage)));
        assert!(validate_discount(Decimal::ZERO, Some(DiscountType::Percentage)));
        assert!(!validate_discount(dec!(-1), Some(DiscountType::Fixed)));
        assert!(validate_discount(dec!(500), None));
    }
}
