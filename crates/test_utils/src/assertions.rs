//! Custom Test Assertions
//!
//! Provides assertion helpers for invoices that give more meaningful error
//! messages than standard assertions.

use domain_fees::{recompute_invoice, FeeInvoice, InvoiceSnapshot};
use rust_decimal::Decimal;

/// Asserts the monetary invariants of a snapshot against its total
///
/// # Panics
///
/// Panics if the discount is out of range, the amount due does not equal
/// total minus discount, or the balance is negative.
pub fn assert_snapshot_consistent(total_amount: Decimal, snapshot: &InvoiceSnapshot) {
    assert!(
        snapshot.discount_amount >= Decimal::ZERO && snapshot.discount_amount <= total_amount,
        "Discount {} outside [0, {}]",
        snapshot.discount_amount,
        total_amount
    );
    assert_eq!(
        snapshot.amount_due + snapshot.discount_amount,
        total_amount,
        "Amount due {} plus discount {} does not equal total {}",
        snapshot.amount_due,
        snapshot.discount_amount,
        total_amount
    );
    assert!(
        snapshot.balance >= Decimal::ZERO,
        "Negative balance {}",
        snapshot.balance
    );
    assert_eq!(snapshot.final_amount, snapshot.amount_due);
}

/// Asserts that a stored invoice's derived fields match a fresh recomputation
///
/// # Panics
///
/// Panics if the stored snapshot is stale
pub fn assert_invoice_fresh(invoice: &FeeInvoice) {
    let expected = recompute_invoice(&invoice.charge);
    assert_eq!(
        invoice.snapshot, expected,
        "Stale snapshot on {}: stored={:?}, recomputed={:?}",
        invoice.invoice_number, invoice.snapshot, expected
    );
    assert_snapshot_consistent(invoice.charge.total_amount, &invoice.snapshot);
}

/// Asserts that two decimals are equal within a tolerance
///
/// # Panics
///
/// Panics if the values differ by more than `tolerance`
pub fn assert_decimal_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Decimals differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}
