//! Category summary statistics

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::FeeCategory;
use crate::invoice::FeeInvoice;

/// Totals across all invoices, grouped by category
///
/// Sums saturate at `Decimal::MAX` instead of overflowing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSummary {
    /// Invoices classified FREE
    pub free_count: u64,
    /// Sum of the nominal totals waived on FREE invoices
    pub total_waived: Decimal,
    /// Invoices classified DISCOUNT
    pub discount_count: u64,
    /// Sum of discounts granted on DISCOUNT invoices
    pub total_discount_amount: Decimal,
    /// Sum still due on DISCOUNT invoices
    pub total_discount_due: Decimal,
    /// Invoices classified FULL_PAYMENT
    pub full_pay_count: u64,
    /// Sum due on FULL_PAYMENT invoices
    pub total_full_pay_due: Decimal,
    /// Sum of final amounts across every invoice
    pub total_billed: Decimal,
}

impl FeeSummary {
    /// Aggregates invoices in a single pass
    pub fn from_invoices<'a>(invoices: impl IntoIterator<Item = &'a FeeInvoice>) -> Self {
        invoices.into_iter().fold(Self::default(), |mut summary, invoice| {
            summary.record(invoice);
            summary
        })
    }

    /// Adds one invoice to the running totals
    pub fn record(&mut self, invoice: &FeeInvoice) {
        let snapshot = &invoice.snapshot;
        match snapshot.category {
            FeeCategory::Free => {
                self.free_count += 1;
                self.total_waived = self.total_waived.saturating_add(invoice.charge.total_amount);
            }
            FeeCategory::Discount => {
                self.discount_count += 1;
                self.total_discount_amount = self.total_discount_amount.saturating_add(snapshot.discount_amount);
                self.total_discount_due = self.total_discount_due.saturating_add(snapshot.amount_due);
            }
            FeeCategory::FullPayment => {
                self.full_pay_count += 1;
                self.total_full_pay_due = self.total_full_pay_due.saturating_add(snapshot.amount_due);
            }
        }
        self.total_billed = self.total_billed.saturating_add(snapshot.final_amount);
    }

    /// Total number of invoices aggregated
    pub fn invoice_count(&self) -> u64 {
        self.free_count + self.discount_count + self.full_pay_count
    }
}
