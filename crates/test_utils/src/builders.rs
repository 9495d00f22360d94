//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{StudentId, SubjectId};
use domain_fees::{ChargeInput, DiscountType, FeeStatus, NewCharge};
use rust_decimal::Decimal;

use crate::fixtures::AmountFixtures;

/// Builder for creation requests
pub struct NewChargeBuilder {
    request: NewCharge,
}

impl Default for NewChargeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewChargeBuilder {
    /// Creates a builder for a standard term fee with no student or subjects
    pub fn new() -> Self {
        Self {
            request: NewCharge {
                total_amount: Some(AmountFixtures::term_fee()),
                ..Default::default()
            },
        }
    }

    /// Sets the student
    pub fn for_student(mut self, student_id: StudentId) -> Self {
        self.request.student_id = Some(student_id);
        self
    }

    /// Adds a subject
    pub fn with_subject(mut self, subject_id: SubjectId) -> Self {
        self.request.subject_ids.push(subject_id);
        self
    }

    /// Replaces the subject list
    pub fn with_subjects(mut self, subject_ids: impl IntoIterator<Item = SubjectId>) -> Self {
        self.request.subject_ids = subject_ids.into_iter().collect();
        self
    }

    /// Sets the aggregate total
    pub fn with_total(mut self, total: Decimal) -> Self {
        self.request.total_amount = Some(total);
        self
    }

    /// Clears the total
    pub fn without_total(mut self) -> Self {
        self.request.total_amount = None;
        self
    }

    /// Sets a raw discount type and value
    pub fn with_discount(mut self, discount_type: &str, value: Decimal) -> Self {
        self.request.discount_type = Some(discount_type.to_string());
        self.request.discount_value = Some(value);
        self
    }

    /// Sets the amount already paid
    pub fn with_amount_paid(mut self, amount_paid: Decimal) -> Self {
        self.request.amount_paid = Some(amount_paid);
        self
    }

    /// Sets the payment date
    pub fn with_payment_date(mut self, date: NaiveDate) -> Self {
        self.request.payment_date = Some(date);
        self
    }

    /// Sets academic year and term
    pub fn in_term(mut self, academic_year: &str, term: &str) -> Self {
        self.request.academic_year = Some(academic_year.to_string());
        self.request.term = Some(term.to_string());
        self
    }

    /// Builds the request
    pub fn build(self) -> NewCharge {
        self.request
    }
}

/// Builder for normalized charge inputs
pub struct ChargeInputBuilder {
    charge: ChargeInput,
}

impl Default for ChargeInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChargeInputBuilder {
    /// Creates a builder for an undiscounted standard term fee
    pub fn new() -> Self {
        Self {
            charge: ChargeInput::new(AmountFixtures::term_fee()),
        }
    }

    /// Sets the total
    pub fn total(mut self, total: Decimal) -> Self {
        self.charge.total_amount = total;
        self
    }

    /// Percentage discount
    pub fn percentage(mut self, value: Decimal) -> Self {
        self.charge = self.charge.with_discount(DiscountType::Percentage, value);
        self
    }

    /// Fixed discount
    pub fn fixed(mut self, value: Decimal) -> Self {
        self.charge = self.charge.with_discount(DiscountType::Fixed, value);
        self
    }

    /// Unrecognized discount type; value is ignored
    pub fn no_discount_type(mut self, value: Decimal) -> Self {
        self.charge.discount_type = None;
        self.charge.discount_value = value;
        self
    }

    /// Sets the amount paid
    pub fn paid(mut self, amount_paid: Decimal) -> Self {
        self.charge.amount_paid = amount_paid;
        self
    }

    /// Sets a status override
    pub fn status(mut self, status: FeeStatus) -> Self {
        self.charge.explicit_status = Some(status);
        self
    }

    /// Builds the charge input
    pub fn build(self) -> ChargeInput {
        self.charge
    }
}
