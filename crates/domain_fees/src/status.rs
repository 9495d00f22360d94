//! Payment status derivation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment-progress state of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeStatus {
    /// Nothing paid yet
    Pending,
    /// Some payment received, balance outstanding
    Partial,
    /// Balance cleared
    Paid,
    /// Voided by the record layer; never derived
    Cancelled,
}

impl FeeStatus {
    /// Returns the stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Pending => "PENDING",
            FeeStatus::Partial => "PARTIAL",
            FeeStatus::Paid => "PAID",
            FeeStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(FeeStatus::Pending),
            "PARTIAL" => Ok(FeeStatus::Partial),
            "PAID" => Ok(FeeStatus::Paid),
            "CANCELLED" => Ok(FeeStatus::Cancelled),
            other => Err(format!("unknown fee status: {}", other)),
        }
    }
}

/// Derives the status from the balance and the amount paid
///
/// Never produces [`FeeStatus::Cancelled`].
pub fn derive_status(balance: Decimal, amount_paid: Decimal) -> FeeStatus {
    if amount_paid <= Decimal::ZERO {
        FeeStatus::Pending
    } else if balance <= Decimal::ZERO {
        FeeStatus::Paid
    } else {
        FeeStatus::Partial
    }
}

/// Resolves the effective status: an explicit override wins over derivation
pub fn resolve_status(
    explicit: Option<FeeStatus>,
    balance: Decimal,
    amount_paid: Decimal,
) -> FeeStatus {
    explicit.unwrap_or_else(|| derive_status(balance, amount_paid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_nothing_paid_is_pending() {
        assert_eq!(derive_status(dec!(800), Decimal::ZERO), FeeStatus::Pending);
        // A fully waived fee with nothing paid stays pending
        assert_eq!(derive_status(Decimal::ZERO, Decimal::ZERO), FeeStatus::Pending);
    }

    #[test]
    fn test_partial() {
        assert_eq!(derive_status(dec!(500), dec!(300)), FeeStatus::Partial);
    }

    #[test]
    fn test_paid() {
        assert_eq!(derive_status(Decimal::ZERO, dec!(800)), FeeStatus::Paid);
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(
            resolve_status(Some(FeeStatus::Cancelled), Decimal::ZERO, dec!(800)),
            FeeStatus::Cancelled
        );
        assert_eq!(resolve_status(None, dec!(10), dec!(5)), FeeStatus::Partial);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("paid".parse::<FeeStatus>(), Ok(FeeStatus::Paid));
        assert_eq!("CANCELLED".parse::<FeeStatus>(), Ok(FeeStatus::Cancelled));
        assert!("refunded".parse::<FeeStatus>().is_err());
    }
}
