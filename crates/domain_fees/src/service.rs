//! Fee ledger service
//!
//! Orchestrates charge creation, updates, and payments over the
//! [`FeePort`] and [`RosterPort`]. Every operation validates fully before
//! it writes, so a rejected request never leaves a partial record behind.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};

use core_kernel::{FeeId, StudentId};

use crate::charge::{split_charge, FeeUpdate, NewCharge, ValidatedCharge};
use crate::error::FeeError;
use crate::invoice::FeeInvoice;
use crate::numbering::generate_invoice_number;
use crate::ports::{FeePort, FeeQuery, RosterPort};
use crate::summary::FeeSummary;

/// Result of a creation request
///
/// A request naming one subject yields one invoice; a request naming several
/// yields one invoice per subject.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CreatedCharges {
    Single(FeeInvoice),
    Split(Vec<FeeInvoice>),
}

impl CreatedCharges {
    /// Flattens into the list of created invoices
    pub fn into_vec(self) -> Vec<FeeInvoice> {
        match self {
            CreatedCharges::Single(invoice) => vec![invoice],
            CreatedCharges::Split(invoices) => invoices,
        }
    }

    /// Number of invoices created
    pub fn len(&self) -> usize {
        match self {
            CreatedCharges::Single(_) => 1,
            CreatedCharges::Split(invoices) => invoices.len(),
        }
    }

    /// Always false; creation yields at least one invoice
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Service for the fee ledger
#[derive(Clone)]
pub struct FeeService {
    fees: Arc<dyn FeePort>,
    roster: Arc<dyn RosterPort>,
}

impl FeeService {
    /// Creates a service over the given ports
    pub fn new(fees: Arc<dyn FeePort>, roster: Arc<dyn RosterPort>) -> Self {
        Self { fees, roster }
    }

    /// Bills a student for one or more subjects
    ///
    /// Validation runs in order: required fields, discount, student lookup,
    /// then every subject lookup. Invoice numbers are only drawn once all of
    /// them pass, and the resulting invoices are persisted together.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField`, `InvalidDiscount`, `InvalidPayment` from validation
    /// - `NotFound` if the student or any subject does not exist
    /// - `Port` if persistence fails
    #[instrument(skip(self, request), fields(subjects = request.subject_ids.len()))]
    pub async fn create_charge(&self, request: NewCharge) -> Result<CreatedCharges, FeeError> {
        let validated = request.validate().map_err(|e| {
            warn!(error = %e, "Rejected charge request");
            e
        })?;

        self.roster.get_student(validated.student_id).await?;
        for subject_id in &validated.subject_ids {
            self.roster.get_subject(*subject_id).await?;
        }

        let student_id = validated.student_id;
        let issued_on = Utc::now().date_naive();
        let mut invoices = self.issue_invoices(validated, issued_on).await?;
        self.fees.insert_fees(&invoices).await?;

        info!(count = invoices.len(), student_id = %student_id, "Created fee charges");

        if invoices.len() == 1 {
            Ok(CreatedCharges::Single(invoices.remove(0)))
        } else {
            Ok(CreatedCharges::Split(invoices))
        }
    }

    async fn issue_invoices(
        &self,
        validated: ValidatedCharge,
        issued_on: NaiveDate,
    ) -> Result<Vec<FeeInvoice>, FeeError> {
        let payment_date = validated.payment_date.unwrap_or(issued_on);
        let parts = split_charge(&validated.charge, validated.subject_ids.len());

        let mut invoices = Vec::with_capacity(parts.len());
        for (subject_id, charge) in validated.subject_ids.iter().zip(parts) {
            let sequence = self.fees.next_invoice_sequence().await?;
            let invoice = FeeInvoice::issue(
                validated.student_id,
                *subject_id,
                generate_invoice_number(issued_on, sequence),
                charge,
                payment_date,
            )
            .with_academic_year(validated.academic_year.clone())
            .with_term(validated.term.clone());
            invoices.push(invoice);
        }
        Ok(invoices)
    }

    /// Applies a partial update to an existing charge
    ///
    /// # Errors
    ///
    /// - `NotFound` if the charge does not exist
    /// - `InvalidDiscount`, `InvalidPayment`, `InvalidStatusUpdate` from the update
    #[instrument(skip(self, update), fields(fee_id = %id))]
    pub async fn update_charge(&self, id: FeeId, update: FeeUpdate) -> Result<FeeInvoice, FeeError> {
        let mut invoice = self.fees.get_fee(id).await?;

        invoice.apply_update(&update).map_err(|e| {
            warn!(error = %e, "Rejected charge update");
            e
        })?;
        self.fees.update_fee(&invoice).await?;

        info!(
            invoice_number = %invoice.invoice_number,
            status = %invoice.status(),
            "Updated fee charge"
        );
        Ok(invoice)
    }

    /// Records a payment against a charge
    ///
    /// # Errors
    ///
    /// - `NotFound` if the charge does not exist
    /// - `InvalidPayment` if `amount` is not positive
    /// - `OverpaymentRejected` if the payment exceeds what remains payable
    #[instrument(skip(self), fields(fee_id = %id))]
    pub async fn record_payment(&self, id: FeeId, amount: Decimal) -> Result<FeeInvoice, FeeError> {
        let mut invoice = self.fees.get_fee(id).await?;

        invoice.apply_payment(amount).map_err(|e| {
            warn!(error = %e, "Rejected payment");
            e
        })?;
        self.fees.update_fee(&invoice).await?;

        info!(
            invoice_number = %invoice.invoice_number,
            balance = %invoice.snapshot.balance,
            status = %invoice.status(),
            "Recorded payment"
        );
        Ok(invoice)
    }

    /// Deletes a charge
    #[instrument(skip(self), fields(fee_id = %id))]
    pub async fn delete_charge(&self, id: FeeId) -> Result<(), FeeError> {
        self.fees.delete_fee(id).await?;
        info!("Deleted fee charge");
        Ok(())
    }

    /// Deletes every charge billed to a student
    ///
    /// Returns the number of charges removed; zero if the student had none.
    #[instrument(skip(self), fields(student_id = %student_id))]
    pub async fn delete_student_charges(&self, student_id: StudentId) -> Result<u64, FeeError> {
        let removed = self.fees.delete_fees_for_student(student_id).await?;
        info!(removed, "Deleted student fee charges");
        Ok(removed)
    }

    /// Retrieves a charge by ID
    pub async fn get_charge(&self, id: FeeId) -> Result<FeeInvoice, FeeError> {
        Ok(self.fees.get_fee(id).await?)
    }

    /// Lists charges matching a query
    pub async fn list_charges(&self, query: FeeQuery) -> Result<Vec<FeeInvoice>, FeeError> {
        Ok(self.fees.find_fees(query).await?)
    }

    /// Computes category totals over every stored charge
    #[instrument(skip(self))]
    pub async fn summary_statistics(&self) -> Result<FeeSummary, FeeError> {
        let invoices = self.fees.find_fees(FeeQuery::all()).await?;
        Ok(FeeSummary::from_invoices(&invoices))
    }
}
