//! Invoice numbering
//!
//! Numbers take the form `INV-<YYYYMMDD>-<sequence>`, with the sequence
//! zero-padded to at least four digits. The sequence is supplied by the
//! [`FeePort`](crate::ports::FeePort); uniqueness across concurrent writers
//! is the adapter's responsibility.

use chrono::NaiveDate;

/// Prefix shared by every invoice number
pub const INVOICE_PREFIX: &str = "INV";

/// Builds an invoice number for an issuance date and sequence
///
/// A sequence of 0 is treated as 1 so the first invoice is always `0001`.
pub fn generate_invoice_number(issued_on: NaiveDate, sequence: u64) -> String {
    format!(
        "{}-{}-{:04}",
        INVOICE_PREFIX,
        issued_on.format("%Y%m%d"),
        sequence.max(1)
    )
}

/// Returns true if `value` has the invoice number shape
pub fn is_invoice_number(value: &str) -> bool {
    let mut parts = value.splitn(3, '-');
    let (Some(prefix), Some(date), Some(sequence)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    prefix == INVOICE_PREFIX
        && NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
        && sequence.len() >= 4
        && sequence.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 3).unwrap()
    }

    #[test]
    fn test_format() {
        assert_eq!(generate_invoice_number(date(), 7), "INV-20240903-0007");
        assert_eq!(generate_invoice_number(date(), 1234), "INV-20240903-1234");
    }

    #[test]
    fn test_sequence_widens_past_four_digits() {
        assert_eq!(generate_invoice_number(date(), 12345), "INV-20240903-12345");
    }

    #[test]
    fn test_zero_sequence_becomes_one() {
        assert_eq!(generate_invoice_number(date(), 0), "INV-20240903-0001");
    }

    #[test]
    fn test_shape_check() {
        assert!(is_invoice_number(&generate_invoice_number(date(), 42)));
        assert!(!is_invoice_number("INV-2024-0001"));
        assert!(!is_invoice_number("BILL-20240903-0001"));
        assert!(!is_invoice_number("INV-20240903-12"));
        assert!(!is_invoice_number("INV-20240903-00a1"));
    }
}
