//! Fee invoices and their recomputation
//!
//! An invoice pairs a [`ChargeInput`] with the [`InvoiceSnapshot`] derived
//! from it. The snapshot is always recomputed in full from the charge,
//! never patched field by field.
//!
//! # Invariants
//!
//! After every recomputation:
//! - `0 <= discount_amount <= total_amount`
//! - `amount_due = max(0, total_amount - discount_amount)`
//! - `balance = max(0, amount_due - amount_paid)`
//! - `category` depends only on `(total_amount, discount_amount)`
//! - `status` is the explicit override if one is set, otherwise derived

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{FeeId, StudentId, SubjectId};

use crate::balance::{calculate_amount_due, calculate_balance};
use crate::category::{determine_category, discount_percentage, FeeCategory};
use crate::charge::{ChargeInput, FeeUpdate};
use crate::discount::calculate_discount_amount;
use crate::error::FeeError;
use crate::status::{resolve_status, FeeStatus};

/// Derived monetary fields, category, and status of a charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSnapshot {
    pub discount_amount: Decimal,
    pub amount_due: Decimal,
    pub balance: Decimal,
    /// Equal to `amount_due`; kept separately for reporting
    pub final_amount: Decimal,
    pub category: FeeCategory,
    pub status: FeeStatus,
}

impl InvoiceSnapshot {
    /// Discount as a percentage of the total (0-100)
    pub fn discount_percentage(&self, total_amount: Decimal) -> Decimal {
        discount_percentage(total_amount, self.discount_amount)
    }
}

/// Derives a complete snapshot from a charge
///
/// Pure: the same input always yields the same snapshot.
pub fn recompute_invoice(charge: &ChargeInput) -> InvoiceSnapshot {
    let discount_amount = calculate_discount_amount(
        charge.total_amount,
        charge.discount_type,
        charge.discount_value,
    );
    let amount_due = calculate_amount_due(charge.total_amount, discount_amount);
    let balance = calculate_balance(amount_due, charge.amount_paid);

    InvoiceSnapshot {
        discount_amount,
        amount_due,
        balance,
        final_amount: amount_due,
        category: determine_category(charge.total_amount, discount_amount),
        status: resolve_status(charge.explicit_status, balance, charge.amount_paid),
    }
}

/// A persisted fee record: one student billed for one subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeInvoice {
    /// Unique identifier
    pub id: FeeId,
    /// Human-readable number, assigned once at creation
    pub invoice_number: String,
    /// Student being billed
    pub student_id: StudentId,
    /// Subject the charge is for
    pub subject_id: SubjectId,
    /// Financial inputs
    #[serde(flatten)]
    pub charge: ChargeInput,
    /// Derived fields
    #[serde(flatten)]
    pub snapshot: InvoiceSnapshot,
    /// Payment date; defaults to the issuance date
    pub payment_date: NaiveDate,
    /// Academic year, e.g. "2024/2025"
    pub academic_year: Option<String>,
    /// Term within the academic year
    pub term: Option<String>,
    /// Starts at 1 and increases with every change; stores reject a write
    /// whose previous version is no longer current
    pub version: u32,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl FeeInvoice {
    /// Issues a new invoice and computes its derived fields
    ///
    /// # Arguments
    ///
    /// * `student_id` - Student being billed
    /// * `subject_id` - Subject the charge is for
    /// * `invoice_number` - Number assigned by the caller
    /// * `charge` - Normalized financial inputs
    /// * `payment_date` - Payment or issuance date
    pub fn issue(
        student_id: StudentId,
        subject_id: SubjectId,
        invoice_number: impl Into<String>,
        charge: ChargeInput,
        payment_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        let snapshot = recompute_invoice(&charge);

        Self {
            id: FeeId::new_v7(),
            invoice_number: invoice_number.into(),
            student_id,
            subject_id,
            charge,
            snapshot,
            payment_date,
            academic_year: None,
            term: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the academic year
    pub fn with_academic_year(mut self, academic_year: Option<String>) -> Self {
        self.academic_year = academic_year;
        self
    }

    /// Sets the term
    pub fn with_term(mut self, term: Option<String>) -> Self {
        self.term = term;
        self
    }

    /// Recomputes every derived field from the current charge
    pub fn recompute(&mut self) {
        self.snapshot = recompute_invoice(&self.charge);
        debug!(
            invoice_number = %self.invoice_number,
            amount_due = %self.snapshot.amount_due,
            balance = %self.snapshot.balance,
            status = %self.snapshot.status,
            "Recomputed invoice"
        );
    }

    /// Applies a partial update
    ///
    /// The whole update is validated before anything changes, so an error
    /// leaves the invoice untouched. The invoice number never changes.
    pub fn apply_update(&mut self, update: &FeeUpdate) -> Result<(), FeeError> {
        let charge = update.apply_to(&self.charge)?;

        self.charge = charge;
        if let Some(payment_date) = update.payment_date {
            self.payment_date = payment_date;
        }
        if let Some(academic_year) = &update.academic_year {
            self.academic_year = Some(academic_year.clone());
        }
        if let Some(term) = &update.term {
            self.term = Some(term.clone());
        }

        self.recompute();
        self.touch();
        Ok(())
    }

    /// Records a payment against the invoice
    ///
    /// # Errors
    ///
    /// - `InvalidPayment` if `amount` is not positive
    /// - `OverpaymentRejected` if the payment would take the amount paid past
    ///   the amount due; the error carries the largest acceptable payment
    pub fn apply_payment(&mut self, amount: Decimal) -> Result<(), FeeError> {
        if amount <= Decimal::ZERO {
            return Err(FeeError::InvalidPayment(
                "Payment amount must be greater than 0".to_string(),
            ));
        }

        let max_payment = self.remaining_payable();
        if amount > max_payment {
            return Err(FeeError::OverpaymentRejected { max_payment });
        }

        self.charge.amount_paid += amount;
        self.recompute();
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Version the store must still hold for this invoice to be written
    pub fn previous_version(&self) -> u32 {
        self.version.saturating_sub(1)
    }

    /// Largest payment `apply_payment` would accept
    pub fn remaining_payable(&self) -> Decimal {
        (self.snapshot.amount_due - self.charge.amount_paid).max(Decimal::ZERO)
    }

    /// Total amount before discount
    pub fn total_amount(&self) -> Decimal {
        self.charge.total_amount
    }

    /// Effective status
    pub fn status(&self) -> FeeStatus {
        self.snapshot.status
    }

    /// Derived category
    pub fn category(&self) -> FeeCategory {
        self.snapshot.category
    }

    /// Returns true if a sticky status override is in force
    pub fn has_status_override(&self) -> bool {
        self.charge.explicit_status.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::DiscountType;
    use rust_decimal_macros::dec;

    fn issue(charge: ChargeInput) -> FeeInvoice {
        FeeInvoice::issue(
            StudentId::new(),
            SubjectId::new(),
            "INV-20240901-0001",
            charge,
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        )
    }

    #[test]
    fn test_percentage_discount_snapshot() {
        let charge = ChargeInput::new(dec!(1000)).with_discount(DiscountType::Percentage, dec!(20));
        let snapshot = recompute_invoice(&charge);

        assert_eq!(snapshot.discount_amount, dec!(200));
        assert_eq!(snapshot.amount_due, dec!(800));
        assert_eq!(snapshot.balance, dec!(800));
        assert_eq!(snapshot.final_amount, dec!(800));
        assert_eq!(snapshot.category, FeeCategory::Discount);
        assert_eq!(snapshot.status, FeeStatus::Pending);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let charge = ChargeInput::new(dec!(333.33))
            .with_discount(DiscountType::Percentage, dec!(12.5))
            .with_amount_paid(dec!(10));
        assert_eq!(recompute_invoice(&charge), recompute_invoice(&charge));
    }

    #[test]
    fn test_payment_to_paid() {
        let mut invoice = issue(ChargeInput::new(dec!(1000)).with_discount(DiscountType::Percentage, dec!(20)));
        invoice.apply_payment(dec!(300)).unwrap();
        assert_eq!(invoice.status(), FeeStatus::Partial);
        assert_eq!(invoice.snapshot.balance, dec!(500));

        invoice.apply_payment(dec!(500)).unwrap();
        assert_eq!(invoice.status(), FeeStatus::Paid);
        assert_eq!(invoice.version, 3);
        assert_eq!(invoice.previous_version(), 2);
        assert_eq!(invoice.snapshot.balance, Decimal::ZERO);
    }

    #[test]
    fn test_overpayment_rejected_with_maximum() {
        let mut invoice = issue(ChargeInput::new(dec!(100)));
        invoice.apply_payment(dec!(60)).unwrap();

        match invoice.apply_payment(dec!(50)) {
            Err(FeeError::OverpaymentRejected { max_payment }) => assert_eq!(max_payment, dec!(40)),
            other => panic!("Expected OverpaymentRejected, got {other:?}"),
        }
        assert_eq!(invoice.charge.amount_paid, dec!(60));
        assert_eq!(invoice.version, 2);
    }

    #[test]
    fn test_large_total_snapshot() {
        let total = dec!(10000000000000000000000000000);
        let snapshot = recompute_invoice(&ChargeInput::new(total).with_discount(DiscountType::Percentage, dec!(20)));
        assert_eq!(snapshot.amount_due, dec!(8000000000000000000000000000));
        assert_eq!(snapshot.category, FeeCategory::Discount);
    }

    #[test]
    fn test_huge_payment_rejected_without_overflow() {
        let mut invoice = issue(ChargeInput::new(dec!(100)));
        invoice.apply_payment(dec!(60)).unwrap();

        assert!(matches!(
            invoice.apply_payment(Decimal::MAX),
            Err(FeeError::OverpaymentRejected { .. })
        ));
        assert_eq!(invoice.charge.amount_paid, dec!(60));
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        let mut invoice = issue(ChargeInput::new(dec!(100)));
        assert!(matches!(invoice.apply_payment(Decimal::ZERO), Err(FeeError::InvalidPayment(_))));
        assert!(matches!(invoice.apply_payment(dec!(-5)), Err(FeeError::InvalidPayment(_))));
    }

    #[test]
    fn test_override_survives_financial_change() {
        let mut invoice = issue(ChargeInput::new(dec!(100)));
        invoice
            .apply_update(&FeeUpdate {
                status: Some(FeeStatus::Cancelled),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(invoice.status(), FeeStatus::Cancelled);

        invoice
            .apply_update(&FeeUpdate {
                discount_value: Some(dec!(10)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(invoice.status(), FeeStatus::Cancelled);
        assert_eq!(invoice.snapshot.amount_due, dec!(90));

        invoice
            .apply_update(&FeeUpdate {
                clear_status_override: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(invoice.status(), FeeStatus::Pending);
    }

    #[test]
    fn test_failed_update_leaves_invoice_untouched() {
        let mut invoice = issue(ChargeInput::new(dec!(100)));
        let before = invoice.clone();

        let result = invoice.apply_update(&FeeUpdate {
            discount_value: Some(dec!(101)),
            term: Some("T3".to_string()),
            ..Default::default()
        });

        assert!(matches!(result, Err(FeeError::InvalidDiscount { .. })));
        assert_eq!(invoice.charge, before.charge);
        assert_eq!(invoice.snapshot, before.snapshot);
        assert_eq!(invoice.term, before.term);
    }

    #[test]
    fn test_serializes_flat() {
        let invoice = issue(ChargeInput::new(dec!(100)));
        let json = serde_json::to_value(&invoice).unwrap();
        assert!(json.get("total_amount").is_some());
        assert!(json.get("balance").is_some());
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["category"], "FULL_PAYMENT");
    }
}
