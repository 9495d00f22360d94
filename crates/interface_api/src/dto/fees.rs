//! Fee DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{StudentId, SubjectId};
use domain_fees::{
    CreatedCharges, FeeCategory, FeeInvoice, FeeQuery, FeeStatus, FeeSummary, FeeUpdate, NewCharge,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFeeRequest {
    pub student_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(max = 50, message = "at most 50 subjects per charge"))]
    pub subject_ids: Vec<Uuid>,
    pub total_amount: Option<Decimal>,
    #[validate(length(max = 32))]
    pub discount_type: Option<String>,
    pub discount_value: Option<Decimal>,
    pub amount_paid: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 20))]
    pub academic_year: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub term: Option<String>,
}

impl From<CreateFeeRequest> for NewCharge {
    fn from(request: CreateFeeRequest) -> Self {
        NewCharge {
            student_id: request.student_id.map(StudentId::from),
            subject_ids: request.subject_ids.into_iter().map(SubjectId::from).collect(),
            total_amount: request.total_amount,
            discount_type: request.discount_type,
            discount_value: request.discount_value,
            amount_paid: request.amount_paid,
            payment_date: request.payment_date,
            academic_year: request.academic_year,
            term: request.term,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateFeeRequest {
    #[validate(length(max = 32))]
    pub discount_type: Option<String>,
    pub discount_value: Option<Decimal>,
    pub amount_paid: Option<Decimal>,
    /// Status override; any case
    pub status: Option<String>,
    #[serde(default)]
    pub clear_status_override: bool,
    pub payment_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 20))]
    pub academic_year: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub term: Option<String>,
}

impl TryFrom<UpdateFeeRequest> for FeeUpdate {
    type Error = ApiError;

    fn try_from(request: UpdateFeeRequest) -> Result<Self, Self::Error> {
        let status = request
            .status
            .as_deref()
            .map(str::parse::<FeeStatus>)
            .transpose()
            .map_err(ApiError::BadRequest)?;

        Ok(FeeUpdate {
            discount_type: request.discount_type,
            discount_value: request.discount_value,
            amount_paid: request.amount_paid,
            status,
            clear_status_override: request.clear_status_override,
            payment_date: request.payment_date,
            academic_year: request.academic_year,
            term: request.term,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
}

/// Query-string filters for listing fees
#[derive(Debug, Default, Deserialize, Validate)]
pub struct FeeListParams {
    pub student_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub academic_year: Option<String>,
    pub term: Option<String>,
    /// `YYYY-MM`
    pub payment_month: Option<String>,
    /// Case-insensitive match on the student's class
    pub class_name: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl TryFrom<FeeListParams> for FeeQuery {
    type Error = ApiError;

    fn try_from(params: FeeListParams) -> Result<Self, Self::Error> {
        let status = params
            .status
            .as_deref()
            .map(str::parse::<FeeStatus>)
            .transpose()
            .map_err(ApiError::BadRequest)?;
        let category = params
            .category
            .as_deref()
            .map(str::parse::<FeeCategory>)
            .transpose()
            .map_err(ApiError::BadRequest)?;
        let payment_month = params.payment_month.as_deref().map(parse_month).transpose()?;

        Ok(FeeQuery {
            student_id: params.student_id.map(StudentId::from),
            subject_id: params.subject_id.map(SubjectId::from),
            status,
            category,
            academic_year: params.academic_year,
            term: params.term,
            payment_month,
            class_name: params.class_name,
            limit: params.limit,
            offset: params.offset,
        })
    }
}

fn parse_month(value: &str) -> Result<(i32, u32), ApiError> {
    let invalid = || ApiError::BadRequest(format!("invalid payment month '{}', expected YYYY-MM", value));
    let (year, month) = value.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

#[derive(Debug, Serialize)]
pub struct FeeResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub total_amount: Decimal,
    pub discount_type: Option<String>,
    pub discount_value: Decimal,
    pub discount_amount: Decimal,
    pub discount_percentage: Decimal,
    pub amount_due: Decimal,
    pub amount_paid: Decimal,
    pub balance: Decimal,
    pub final_amount: Decimal,
    pub category: FeeCategory,
    pub status: FeeStatus,
    pub status_overridden: bool,
    pub payment_date: NaiveDate,
    pub academic_year: Option<String>,
    pub term: Option<String>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FeeInvoice> for FeeResponse {
    fn from(fee: FeeInvoice) -> Self {
        Self {
            id: fee.id.into(),
            invoice_number: fee.invoice_number.clone(),
            student_id: fee.student_id.into(),
            subject_id: fee.subject_id.into(),
            total_amount: fee.charge.total_amount,
            discount_type: fee.charge.discount_type.map(|t| t.as_str().to_string()),
            discount_value: fee.charge.discount_value,
            discount_amount: fee.snapshot.discount_amount,
            discount_percentage: fee.snapshot.discount_percentage(fee.charge.total_amount),
            amount_due: fee.snapshot.amount_due,
            amount_paid: fee.charge.amount_paid,
            balance: fee.snapshot.balance,
            final_amount: fee.snapshot.final_amount,
            category: fee.snapshot.category,
            status: fee.snapshot.status,
            status_overridden: fee.has_status_override(),
            payment_date: fee.payment_date,
            academic_year: fee.academic_year,
            term: fee.term,
            version: fee.version,
            created_at: fee.created_at,
            updated_at: fee.updated_at,
        }
    }
}

/// A single invoice, or one invoice per subject when the charge was split
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CreateFeeResponse {
    Single(FeeResponse),
    Split(Vec<FeeResponse>),
}

impl From<CreatedCharges> for CreateFeeResponse {
    fn from(created: CreatedCharges) -> Self {
        match created {
            CreatedCharges::Single(fee) => CreateFeeResponse::Single(fee.into()),
            CreatedCharges::Split(fees) => {
                CreateFeeResponse::Split(fees.into_iter().map(FeeResponse::from).collect())
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FreeSummary {
    pub count: u64,
    pub total_waived: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DiscountSummary {
    pub count: u64,
    pub total_discount_amount: Decimal,
    pub total_due: Decimal,
}

#[derive(Debug, Serialize)]
pub struct FullPaymentSummary {
    pub count: u64,
    pub total_due: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub free: FreeSummary,
    pub discount: DiscountSummary,
    pub full_payment: FullPaymentSummary,
    pub invoice_count: u64,
    pub total_billed: Decimal,
}

impl From<FeeSummary> for SummaryResponse {
    fn from(summary: FeeSummary) -> Self {
        Self {
            invoice_count: summary.invoice_count(),
            free: FreeSummary {
                count: summary.free_count,
                total_waived: summary.total_waived,
            },
            discount: DiscountSummary {
                count: summary.discount_count,
                total_discount_amount: summary.total_discount_amount,
                total_due: summary.total_discount_due,
            },
            full_payment: FullPaymentSummary {
                count: summary.full_pay_count,
                total_due: summary.total_full_pay_due,
            },
            total_billed: summary.total_billed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedFeesResponse {
    pub student_id: Uuid,
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_parse_case_insensitively() {
        let params = FeeListParams {
            status: Some("partial".to_string()),
            category: Some("Full_Payment".to_string()),
            payment_month: Some("2024-09".to_string()),
            ..Default::default()
        };
        let query = FeeQuery::try_from(params).unwrap();
        assert_eq!(query.status, Some(FeeStatus::Partial));
        assert_eq!(query.category, Some(FeeCategory::FullPayment));
        assert_eq!(query.payment_month, Some((2024, 9)));
    }

    #[test]
    fn test_list_params_reject_unknown_status() {
        let params = FeeListParams {
            status: Some("refunded".to_string()),
            ..Default::default()
        };
        assert!(matches!(FeeQuery::try_from(params), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_parse_month_bounds() {
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024").is_err());
        assert_eq!(parse_month("2025-01").unwrap(), (2025, 1));
    }

    #[test]
    fn test_update_request_status_override() {
        let request = UpdateFeeRequest {
            status: Some("cancelled".to_string()),
            ..Default::default()
        };
        let update = FeeUpdate::try_from(request).unwrap();
        assert_eq!(update.status, Some(FeeStatus::Cancelled));
        assert!(update.touches_charge());
    }
}
