//! Category classification
//!
//! A charge's category depends only on how deep its discount goes, so it is
//! always derived from `(total_amount, discount_amount)` and never stored
//! independently of them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const HUNDRED: Decimal = dec!(100);

/// Classification of a charge by discount depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeCategory {
    /// Fully waived, or nothing to charge
    Free,
    /// Partially discounted
    Discount,
    /// No discount applied
    FullPayment,
}

impl FeeCategory {
    /// Returns the stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeCategory::Free => "FREE",
            FeeCategory::Discount => "DISCOUNT",
            FeeCategory::FullPayment => "FULL_PAYMENT",
        }
    }
}

impl fmt::Display for FeeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FREE" => Ok(FeeCategory::Free),
            "DISCOUNT" => Ok(FeeCategory::Discount),
            "FULL_PAYMENT" => Ok(FeeCategory::FullPayment),
            other => Err(format!("unknown fee category: {}", other)),
        }
    }
}

/// Discount as a percentage of the total, capped at 100
///
/// Zero when the total or the discount is not positive.
pub fn discount_percentage(total_amount: Decimal, discount_amount: Decimal) -> Decimal {
    if total_amount <= Decimal::ZERO || discount_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (discount_amount.min(total_amount) / total_amount * HUNDRED).min(HUNDRED)
}

/// Classifies a charge
///
/// Compares the amounts directly; [`discount_percentage`] is rounded and only
/// used for reporting.
pub fn determine_category(total_amount: Decimal, discount_amount: Decimal) -> FeeCategory {
    if total_amount <= Decimal::ZERO || discount_amount >= total_amount {
        FeeCategory::Free
    } else if discount_amount > Decimal::ZERO {
        FeeCategory::Discount
    } else {
        FeeCategory::FullPayment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_just_below_total_is_not_free() {
        let total = dec!(70000000000000000000000000000);
        let discount = total - Decimal::ONE;
        assert_eq!(discount_percentage(total, discount), HUNDRED);
        assert_eq!(determine_category(total, discount), FeeCategory::Discount);
        assert_eq!(determine_category(total, total), FeeCategory::Free);
    }

    #[test]
    fn test_percentage_ignores_discount_above_total() {
        assert_eq!(discount_percentage(dec!(50), dec!(80)), HUNDRED);
    }

    #[test]
    fn test_zero_total_is_free() {
        assert_eq!(determine_category(Decimal::ZERO, Decimal::ZERO), FeeCategory::Free);
    }

    #[test]
    fn test_full_waiver_is_free() {
        assert_eq!(determine_category(dec!(500), dec!(500)), FeeCategory::Free);
    }

    #[test]
    fn test_partial_discount() {
        assert_eq!(determine_category(dec!(1000), dec!(200)), FeeCategory::Discount);
        assert_eq!(determine_category(dec!(1000), dec!(0.01)), FeeCategory::Discount);
    }

    #[test]
    fn test_no_discount_is_full_payment() {
        assert_eq!(determine_category(dec!(1000), Decimal::ZERO), FeeCategory::FullPayment);
    }

    #[test]
    fn test_discount_percentage() {
        assert_eq!(discount_percentage(dec!(1000), dec!(200)), dec!(20));
        assert_eq!(discount_percentage(dec!(100), dec!(250)), dec!(100));
        assert_eq!(discount_percentage(Decimal::ZERO, dec!(10)), Decimal::ZERO);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("free".parse::<FeeCategory>(), Ok(FeeCategory::Free));
        assert_eq!("Full_Payment".parse::<FeeCategory>(), Ok(FeeCategory::FullPayment));
        assert!("gratis".parse::<FeeCategory>().is_err());
    }

    #[test]
    fn test_serde_uses_upper_case() {
        let json = serde_json::to_string(&FeeCategory::FullPayment).unwrap();
        assert_eq!(json, "\"FULL_PAYMENT\"");
    }
}
