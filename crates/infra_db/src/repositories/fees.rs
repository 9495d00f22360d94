//! Fee repository implementation
//!
//! This module provides database access for fee invoices. Rows carry both
//! the charge inputs and the derived fields; the derived fields are written
//! exactly as the domain computed them and never recalculated in SQL.
//!
//! Enumerations are stored as text and decoded by the adapter.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

const FEE_COLUMNS: &str = "fee_id, invoice_number, student_id, subject_id, \
    total_amount, discount_type, discount_value, amount_paid, explicit_status, \
    discount_amount, amount_due, balance, final_amount, category, status, \
    payment_date, academic_year, term, version, created_at, updated_at";

/// A row from the `fees` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FeeRow {
    pub fee_id: Uuid,
    pub invoice_number: String,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub total_amount: Decimal,
    pub discount_type: Option<String>,
    pub discount_value: Decimal,
    pub amount_paid: Decimal,
    pub explicit_status: Option<String>,
    pub discount_amount: Decimal,
    pub amount_due: Decimal,
    pub balance: Decimal,
    pub final_amount: Decimal,
    pub category: String,
    pub status: String,
    pub payment_date: NaiveDate,
    pub academic_year: Option<String>,
    pub term: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column filters for listing fees
///
/// Text values are compared exactly; callers pass the stored representation.
#[derive(Debug, Clone, Default)]
pub struct FeeFilter {
    pub student_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub academic_year: Option<String>,
    pub term: Option<String>,
    pub payment_month: Option<(i32, u32)>,
    /// Matched case-insensitively against the student's current class
    pub class_name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Repository for fee invoices
#[derive(Debug, Clone)]
pub struct FeeRepository {
    pool: PgPool,
}

impl FeeRepository {
    /// Creates a new FeeRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a fee by its identifier
    ///
    /// # Returns
    ///
    /// The fee row or a NotFound error
    pub async fn get_by_id(&self, fee_id: Uuid) -> Result<FeeRow, DatabaseError> {
        let sql = format!("SELECT {FEE_COLUMNS} FROM fees WHERE fee_id = $1");
        sqlx::query_as::<_, FeeRow>(&sql)
            .bind(fee_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Fee", fee_id))
    }

    /// Lists fees matching a filter, oldest first
    pub async fn find(&self, filter: &FeeFilter) -> Result<Vec<FeeRow>, DatabaseError> {
        let mut builder = build_find_query(filter);
        let rows = builder
            .build_query_as::<FeeRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Inserts fees in a single transaction
    ///
    /// Either every row is written or none are.
    pub async fn insert_many(&self, rows: &[FeeRow]) -> Result<(), DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        for row in rows {
            let sql = format!(
                "INSERT INTO fees ({FEE_COLUMNS}) VALUES \
                 ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)"
            );
            sqlx::query(&sql)
                .bind(row.fee_id)
                .bind(&row.invoice_number)
                .bind(row.student_id)
                .bind(row.subject_id)
                .bind(row.total_amount)
                .bind(&row.discount_type)
                .bind(row.discount_value)
                .bind(row.amount_paid)
                .bind(&row.explicit_status)
                .bind(row.discount_amount)
                .bind(row.amount_due)
                .bind(row.balance)
                .bind(row.final_amount)
                .bind(&row.category)
                .bind(&row.status)
                .bind(row.payment_date)
                .bind(&row.academic_year)
                .bind(&row.term)
                .bind(row.version)
                .bind(row.created_at)
                .bind(row.updated_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    /// Overwrites every mutable column of an existing fee
    ///
    /// The write only applies while the stored version is still
    /// `expected_version`; otherwise it fails with `StaleVersion`, or
    /// `NotFound` if the row is gone. The invoice number, student, subject,
    /// and creation time are immutable.
    pub async fn update(&self, row: &FeeRow, expected_version: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE fees SET
                total_amount = $2,
                discount_type = $3,
                discount_value = $4,
                amount_paid = $5,
                explicit_status = $6,
                discount_amount = $7,
                amount_due = $8,
                balance = $9,
                final_amount = $10,
                category = $11,
                status = $12,
                payment_date = $13,
                academic_year = $14,
                term = $15,
                updated_at = $16,
                version = $17
            WHERE fee_id = $1 AND version = $18
            "#,
        )
        .bind(row.fee_id)
        .bind(row.total_amount)
        .bind(&row.discount_type)
        .bind(row.discount_value)
        .bind(row.amount_paid)
        .bind(&row.explicit_status)
        .bind(row.discount_amount)
        .bind(row.amount_due)
        .bind(row.balance)
        .bind(row.final_amount)
        .bind(&row.category)
        .bind(&row.status)
        .bind(row.payment_date)
        .bind(&row.academic_year)
        .bind(&row.term)
        .bind(row.updated_at)
        .bind(row.version)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM fees WHERE fee_id = $1)")
                .bind(row.fee_id)
                .fetch_one(&self.pool)
                .await?;
            return Err(if exists {
                DatabaseError::StaleVersion {
                    entity: "Fee".to_string(),
                    id: row.fee_id.to_string(),
                }
            } else {
                DatabaseError::not_found("Fee", row.fee_id)
            });
        }
        Ok(())
    }

    /// Deletes a fee
    pub async fn delete(&self, fee_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM fees WHERE fee_id = $1")
            .bind(fee_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Fee", fee_id));
        }
        Ok(())
    }

    /// Deletes every fee for a student, returning the number removed
    pub async fn delete_by_student(&self, student_id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM fees WHERE student_id = $1")
            .bind(student_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Counts stored fees
    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM fees")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Draws the next value from `fee_invoice_seq`
    pub async fn next_sequence(&self) -> Result<i64, DatabaseError> {
        let next = sqlx::query_scalar::<_, i64>("SELECT nextval('fee_invoice_seq')")
            .fetch_one(&self.pool)
            .await?;
        Ok(next)
    }
}

/// Builds the filtered listing query
fn build_find_query(filter: &FeeFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {FEE_COLUMNS} FROM fees WHERE TRUE"));

    if let Some(student_id) = filter.student_id {
        builder.push(" AND student_id = ").push_bind(student_id);
    }
    if let Some(subject_id) = filter.subject_id {
        builder.push(" AND subject_id = ").push_bind(subject_id);
    }
    if let Some(status) = &filter.status {
        builder.push(" AND status = ").push_bind(status.clone());
    }
    if let Some(category) = &filter.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(academic_year) = &filter.academic_year {
        builder.push(" AND academic_year = ").push_bind(academic_year.clone());
    }
    if let Some(term) = &filter.term {
        builder.push(" AND term = ").push_bind(term.clone());
    }
    if let Some((year, month)) = filter.payment_month {
        builder
            .push(" AND EXTRACT(YEAR FROM payment_date) = ")
            .push_bind(year)
            .push(" AND EXTRACT(MONTH FROM payment_date) = ")
            .push_bind(month as i32);
    }
    if let Some(class_name) = &filter.class_name {
        builder
            .push(" AND student_id IN (SELECT student_id FROM students WHERE lower(class_name) = lower(")
            .push_bind(class_name.clone())
            .push("))");
    }

    builder.push(" ORDER BY created_at, invoice_number");

    if let Some(limit) = filter.limit {
        builder.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = filter.offset {
        builder.push(" OFFSET ").push_bind(offset);
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfiltered_query() {
        let builder = build_find_query(&FeeFilter::default());
        let sql = builder.sql();
        assert!(sql.starts_with("SELECT fee_id, invoice_number"));
        assert!(sql.ends_with("ORDER BY created_at, invoice_number"));
        assert!(!sql.contains("$1"));
    }

    #[test]
    fn test_filters_bind_in_order() {
        let filter = FeeFilter {
            student_id: Some(Uuid::nil()),
            status: Some("PAID".to_string()),
            payment_month: Some((2024, 9)),
            limit: Some(10),
            ..Default::default()
        };
        let builder = build_find_query(&filter);
        let sql = builder.sql();

        assert!(sql.contains("student_id = $1"));
        assert!(sql.contains("status = $2"));
        assert!(sql.contains("EXTRACT(YEAR FROM payment_date) = $3"));
        assert!(sql.contains("EXTRACT(MONTH FROM payment_date) = $4"));
        assert!(sql.contains("LIMIT $5"));
        assert!(!sql.contains("OFFSET"));
    }

    #[test]
    fn test_class_filter_uses_student_subquery() {
        let filter = FeeFilter {
            term: Some("Term 1".to_string()),
            class_name: Some("Grade 10".to_string()),
            ..Default::default()
        };
        let builder = build_find_query(&filter);
        let sql = builder.sql();

        assert!(sql.contains("term = $1"));
        assert!(sql.contains(
            "student_id IN (SELECT student_id FROM students WHERE lower(class_name) = lower($2))"
        ));
        assert!(sql.ends_with("ORDER BY created_at, invoice_number"));
    }
}
