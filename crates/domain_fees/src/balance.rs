//! Balance resolution
//!
//! Both functions are total and floor at zero. Overpayment recorded in
//! stored data is absorbed here rather than reported as a credit.

use rust_decimal::Decimal;

/// Amount owed after the discount, never negative
pub fn calculate_amount_due(total_amount: Decimal, discount_amount: Decimal) -> Decimal {
    (total_amount - discount_amount).max(Decimal::ZERO)
}

/// Unpaid portion of the amount due, never negative
pub fn calculate_balance(amount_due: Decimal, amount_paid: Decimal) -> Decimal {
    (amount_due - amount_paid).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_due() {
        assert_eq!(calculate_amount_due(dec!(1000), dec!(200)), dec!(800));
        assert_eq!(calculate_amount_due(dec!(500), dec!(500)), Decimal::ZERO);
    }

    #[test]
    fn test_amount_due_floors_at_zero() {
        assert_eq!(calculate_amount_due(dec!(100), dec!(150)), Decimal::ZERO);
    }

    #[test]
    fn test_balance() {
        assert_eq!(calculate_balance(dec!(800), dec!(300)), dec!(500));
        assert_eq!(calculate_balance(dec!(800), dec!(800)), Decimal::ZERO);
    }

    #[test]
    fn test_overpayment_is_absorbed() {
        assert_eq!(calculate_balance(dec!(800), dec!(1000)), Decimal::ZERO);
    }
}
