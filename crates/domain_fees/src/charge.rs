//! Charge input and its normalization
//!
//! Callers hand the domain loosely-typed requests ([`NewCharge`],
//! [`FeeUpdate`]) whose fields are mostly optional. Normalization happens
//! here, once, so the calculators only ever see a fully-populated
//! [`ChargeInput`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{StudentId, SubjectId};

use crate::discount::{validate_discount, DiscountType};
use crate::error::FeeError;
use crate::status::FeeStatus;

/// The financial inputs of a single charge
///
/// Every derived field of an invoice is a function of this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeInput {
    /// Nominal charge before discount
    pub total_amount: Decimal,
    /// How `discount_value` is interpreted; `None` means no discount applies
    pub discount_type: Option<DiscountType>,
    /// Percentage or fixed amount, depending on `discount_type`
    pub discount_value: Decimal,
    /// Cumulative payments received
    pub amount_paid: Decimal,
    /// Sticky status override; wins over derivation until explicitly cleared
    pub explicit_status: Option<FeeStatus>,
}

impl ChargeInput {
    /// Creates an undiscounted, unpaid charge
    pub fn new(total_amount: Decimal) -> Self {
        Self {
            total_amount,
            discount_type: Some(DiscountType::Percentage),
            discount_value: Decimal::ZERO,
            amount_paid: Decimal::ZERO,
            explicit_status: None,
        }
    }

    /// Sets the discount policy
    pub fn with_discount(mut self, discount_type: DiscountType, value: Decimal) -> Self {
        self.discount_type = Some(discount_type);
        self.discount_value = value;
        self
    }

    /// Sets the amount already paid
    pub fn with_amount_paid(mut self, amount_paid: Decimal) -> Self {
        self.amount_paid = amount_paid;
        self
    }

    /// Sets a status override
    pub fn with_explicit_status(mut self, status: FeeStatus) -> Self {
        self.explicit_status = Some(status);
        self
    }
}

/// Request to bill a student for one or more subjects
#[derive(Debug, Clone, Default)]
pub struct NewCharge {
    pub student_id: Option<StudentId>,
    pub subject_ids: Vec<SubjectId>,
    /// Aggregate amount across all subjects
    pub total_amount: Option<Decimal>,
    /// Raw discount type; defaults to percentage, unknown values mean no discount
    pub discount_type: Option<String>,
    pub discount_value: Option<Decimal>,
    pub amount_paid: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub academic_year: Option<String>,
    pub term: Option<String>,
}

/// A creation request that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedCharge {
    pub student_id: StudentId,
    pub subject_ids: Vec<SubjectId>,
    /// Charge for the whole request, before splitting across subjects
    pub charge: ChargeInput,
    pub payment_date: Option<NaiveDate>,
    pub academic_year: Option<String>,
    pub term: Option<String>,
}

impl NewCharge {
    /// Validates the request and normalizes it into a [`ValidatedCharge`]
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if the student, the subjects, or a positive total is absent
    /// - `InvalidDiscount` if the discount value does not fit its type
    /// - `InvalidPayment` if the amount already paid is negative
    pub fn validate(self) -> Result<ValidatedCharge, FeeError> {
        let student_id = self
            .student_id
            .ok_or_else(|| FeeError::missing("Student ID is required"))?;

        if self.subject_ids.is_empty() {
            return Err(FeeError::missing("At least one subject ID is required"));
        }

        let total_amount = match self.total_amount {
            Some(total) if total > Decimal::ZERO => total,
            _ => return Err(FeeError::missing("Total amount must be greater than 0")),
        };

        let discount_type = match self.discount_type.as_deref() {
            None => Some(DiscountType::Percentage),
            Some(raw) => DiscountType::parse_lenient(raw),
        };
        let discount_value = self.discount_value.unwrap_or(Decimal::ZERO);
        if !validate_discount(discount_value, discount_type) {
            return Err(FeeError::InvalidDiscount { value: discount_value });
        }

        let amount_paid = self.amount_paid.unwrap_or(Decimal::ZERO);
        if amount_paid < Decimal::ZERO {
            return Err(FeeError::InvalidPayment("Amount paid cannot be negative".to_string()));
        }

        Ok(ValidatedCharge {
            student_id,
            subject_ids: self.subject_ids,
            charge: ChargeInput {
                total_amount,
                discount_type,
                discount_value,
                amount_paid,
                explicit_status: None,
            },
            payment_date: self.payment_date,
            academic_year: self.academic_year,
            term: self.term,
        })
    }
}

/// Splits an aggregate charge evenly across `parts` subjects
///
/// Each part gets `total_amount / parts` with no remainder redistribution.
/// The discount policy and the amount paid are carried to every part
/// unchanged, so each part is discounted independently.
pub fn split_charge(charge: &ChargeInput, parts: usize) -> Vec<ChargeInput> {
    if parts <= 1 {
        return vec![charge.clone()];
    }

    let share = charge.total_amount / Decimal::from(parts as u64);
    (0..parts)
        .map(|_| ChargeInput {
            total_amount: share,
            ..charge.clone()
        })
        .collect()
}

/// Partial update of an existing fee record
///
/// Unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct FeeUpdate {
    /// Raw discount type; unknown values mean no discount
    pub discount_type: Option<String>,
    pub discount_value: Option<Decimal>,
    /// Replaces the cumulative amount paid
    pub amount_paid: Option<Decimal>,
    /// Sets the sticky status override
    pub status: Option<FeeStatus>,
    /// Clears the sticky status override so status is derived again
    pub clear_status_override: bool,
    pub payment_date: Option<NaiveDate>,
    pub academic_year: Option<String>,
    pub term: Option<String>,
}

impl FeeUpdate {
    /// Returns true if the update changes an input of the derived fields
    pub fn touches_charge(&self) -> bool {
        self.discount_type.is_some()
            || self.discount_value.is_some()
            || self.amount_paid.is_some()
            || self.status.is_some()
            || self.clear_status_override
    }

    /// Computes the charge this update would produce, without mutating anything
    ///
    /// # Errors
    ///
    /// - `InvalidDiscount` if the effective discount value does not fit the effective type
    /// - `InvalidPayment` if `amount_paid` is negative
    /// - `InvalidStatusUpdate` if the update both sets and clears the override
    pub fn apply_to(&self, current: &ChargeInput) -> Result<ChargeInput, FeeError> {
        if self.status.is_some() && self.clear_status_override {
            return Err(FeeError::InvalidStatusUpdate(
                "cannot set and clear the status override in one update".to_string(),
            ));
        }

        let mut next = current.clone();

        if let Some(raw) = self.discount_type.as_deref() {
            next.discount_type = DiscountType::parse_lenient(raw);
        }
        if let Some(value) = self.discount_value {
            next.discount_value = value;
        }
        if (self.discount_type.is_some() || self.discount_value.is_some())
            && !validate_discount(next.discount_value, next.discount_type)
        {
            return Err(FeeError::InvalidDiscount { value: next.discount_value });
        }

        if let Some(amount_paid) = self.amount_paid {
            if amount_paid < Decimal::ZERO {
                return Err(FeeError::InvalidPayment("Amount paid cannot be negative".to_string()));
            }
            next.amount_paid = amount_paid;
        }

        if let Some(status) = self.status {
            next.explicit_status = Some(status);
        } else if self.clear_status_override {
            next.explicit_status = None;
        }

        Ok(next)
    }
}
