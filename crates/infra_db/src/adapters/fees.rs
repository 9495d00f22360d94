//! PostgreSQL Fee Adapter
//!
//! Implements [`FeePort`] over the [`FeeRepository`]. Invoice numbering
//! draws from the `fee_invoice_seq` sequence, so concurrent writers never
//! collide; the UNIQUE constraint on `invoice_number` backs this up.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresFeeAdapter;
//! use domain_fees::FeePort;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn FeePort> = Arc::new(PostgresFeeAdapter::new(pool));
//! let fee = port.get_fee(fee_id).await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, DomainPort, FeeId, HealthCheckResult, HealthCheckable, PortError, StudentId, SubjectId,
};
use domain_fees::{ChargeInput, DiscountType, FeeInvoice, FeePort, FeeQuery, InvoiceSnapshot};

use crate::error::DatabaseError;
use crate::repositories::fees::{FeeFilter, FeeRepository, FeeRow};

/// PostgreSQL-backed implementation of the FeePort trait
///
/// Database errors are translated to `PortError` variants:
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - `DatabaseError::DuplicateEntry` -> `PortError::Conflict`
/// - Other errors -> `PortError::Internal` or a transient variant
#[derive(Debug, Clone)]
pub struct PostgresFeeAdapter {
    repository: FeeRepository,
    pool: PgPool,
}

impl PostgresFeeAdapter {
    /// Creates a new PostgreSQL fee adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: FeeRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &FeeRepository {
        &self.repository
    }
}

impl DomainPort for PostgresFeeAdapter {}

#[async_trait]
impl HealthCheckable for PostgresFeeAdapter {
    /// Performs a `SELECT 1` to verify the pool is operational
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: "postgres-fee-adapter".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: "postgres-fee-adapter".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl FeePort for PostgresFeeAdapter {
    #[instrument(skip(self), fields(fee_id = %id))]
    async fn get_fee(&self, id: FeeId) -> Result<FeeInvoice, PortError> {
        debug!("Fetching fee by ID");
        let row = self.repository.get_by_id(id.into()).await?;
        row_to_invoice(row)
    }

    #[instrument(skip(self))]
    async fn find_fees(&self, query: FeeQuery) -> Result<Vec<FeeInvoice>, PortError> {
        debug!("Finding fees with query: {:?}", query);
        let rows = self.repository.find(&query_to_filter(&query)).await?;
        rows.into_iter().map(row_to_invoice).collect()
    }

    #[instrument(skip(self, fees), fields(count = fees.len()))]
    async fn insert_fees(&self, fees: &[FeeInvoice]) -> Result<(), PortError> {
        let rows: Vec<FeeRow> = fees.iter().map(invoice_to_row).collect();
        self.repository.insert_many(&rows).await?;
        Ok(())
    }

    #[instrument(skip(self, fee), fields(fee_id = %fee.id))]
    async fn update_fee(&self, fee: &FeeInvoice) -> Result<(), PortError> {
        self.repository
            .update(&invoice_to_row(fee), i64::from(fee.previous_version()))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(fee_id = %id))]
    async fn delete_fee(&self, id: FeeId) -> Result<(), PortError> {
        self.repository.delete(id.into()).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(student_id = %student_id))]
    async fn delete_fees_for_student(&self, student_id: StudentId) -> Result<u64, PortError> {
        Ok(self.repository.delete_by_student(student_id.into()).await?)
    }

    async fn count_fees(&self) -> Result<u64, PortError> {
        let count = self.repository.count().await?;
        Ok(count.max(0) as u64)
    }

    async fn next_invoice_sequence(&self) -> Result<u64, PortError> {
        let next = self.repository.next_sequence().await?;
        u64::try_from(next).map_err(|_| PortError::internal(format!("Invalid invoice sequence value {next}")))
    }
}

/// Converts a query into repository filters
fn query_to_filter(query: &FeeQuery) -> FeeFilter {
    FeeFilter {
        student_id: query.student_id.map(Into::into),
        subject_id: query.subject_id.map(Into::into),
        status: query.status.map(|s| s.as_str().to_string()),
        category: query.category.map(|c| c.as_str().to_string()),
        academic_year: query.academic_year.clone(),
        term: query.term.clone(),
        payment_month: query.payment_month,
        class_name: query.class_name.clone(),
        limit: query.limit.map(i64::from),
        offset: query.offset.map(i64::from),
    }
}

/// Converts a domain invoice into a row
pub(crate) fn invoice_to_row(fee: &FeeInvoice) -> FeeRow {
    FeeRow {
        fee_id: fee.id.into(),
        invoice_number: fee.invoice_number.clone(),
        student_id: fee.student_id.into(),
        subject_id: fee.subject_id.into(),
        total_amount: fee.charge.total_amount,
        discount_type: fee.charge.discount_type.map(|t| t.as_str().to_string()),
        discount_value: fee.charge.discount_value,
        amount_paid: fee.charge.amount_paid,
        explicit_status: fee.charge.explicit_status.map(|s| s.as_str().to_string()),
        discount_amount: fee.snapshot.discount_amount,
        amount_due: fee.snapshot.amount_due,
        balance: fee.snapshot.balance,
        final_amount: fee.snapshot.final_amount,
        category: fee.snapshot.category.as_str().to_string(),
        status: fee.snapshot.status.as_str().to_string(),
        payment_date: fee.payment_date,
        academic_year: fee.academic_year.clone(),
        term: fee.term.clone(),
        version: i64::from(fee.version),
        created_at: fee.created_at,
        updated_at: fee.updated_at,
    }
}

/// Converts a row back into a domain invoice
///
/// Fails with `PortError::Transformation` if a stored enumeration is unknown.
pub(crate) fn row_to_invoice(row: FeeRow) -> Result<FeeInvoice, PortError> {
    let discount_type = row
        .discount_type
        .as_deref()
        .map(str::parse::<DiscountType>)
        .transpose()
        .map_err(|e| PortError::from(DatabaseError::SerializationError(e.to_string())))?;
    let explicit_status = row
        .explicit_status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e: String| PortError::from(DatabaseError::SerializationError(e)))?;
    let category = row
        .category
        .parse()
        .map_err(|e: String| PortError::from(DatabaseError::SerializationError(e)))?;
    let status = row
        .status
        .parse()
        .map_err(|e: String| PortError::from(DatabaseError::SerializationError(e)))?;
    let version = u32::try_from(row.version).map_err(|_| {
        PortError::from(DatabaseError::SerializationError(format!("invalid fee version {}", row.version)))
    })?;

    Ok(FeeInvoice {
        id: FeeId::from(row.fee_id),
        invoice_number: row.invoice_number,
        student_id: StudentId::from(row.student_id),
        subject_id: SubjectId::from(row.subject_id),
        charge: ChargeInput {
            total_amount: row.total_amount,
            discount_type,
            discount_value: row.discount_value,
            amount_paid: row.amount_paid,
            explicit_status,
        },
        snapshot: InvoiceSnapshot {
            discount_amount: row.discount_amount,
            amount_due: row.amount_due,
            balance: row.balance,
            final_amount: row.final_amount,
            category,
            status,
        },
        payment_date: row.payment_date,
        academic_year: row.academic_year,
        term: row.term,
        version,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
