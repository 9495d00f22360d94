//! Fee Domain Ports
//!
//! Port interfaces the fee domain needs from the record-management layer.
//!
//! - [`FeePort`]: persistence of fee invoices and invoice sequencing
//! - [`RosterPort`]: read-only lookup of students and subjects
//!
//! `infra_db` provides the PostgreSQL adapters. The in-memory adapters in
//! [`mock`] are available to tests and behind the `mock` feature.
//!
//! ```rust,ignore
//! use domain_fees::{FeeService, FeePort, RosterPort};
//! use std::sync::Arc;
//!
//! let fees: Arc<dyn FeePort> = Arc::new(PostgresFeeAdapter::new(pool.clone()));
//! let roster: Arc<dyn RosterPort> = Arc::new(PostgresRosterAdapter::new(pool));
//! let service = FeeService::new(fees, roster);
//! ```

use async_trait::async_trait;
use chrono::Datelike;

use core_kernel::{DomainPort, FeeId, HealthCheckable, PortError, StudentId, SubjectId};

use crate::category::FeeCategory;
use crate::invoice::FeeInvoice;
use crate::roster::{Student, Subject};
use crate::status::FeeStatus;

/// Query parameters for listing fee invoices
///
/// Filters combine with AND; unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeQuery {
    pub student_id: Option<StudentId>,
    pub subject_id: Option<SubjectId>,
    pub status: Option<FeeStatus>,
    pub category: Option<FeeCategory>,
    pub academic_year: Option<String>,
    pub term: Option<String>,
    /// Calendar `(year, month)` of the payment date
    pub payment_month: Option<(i32, u32)>,
    /// Current class of the billed student, compared case-insensitively
    ///
    /// Adapters resolve this against the roster; [`FeeQuery::matches`] ignores it.
    pub class_name: Option<String>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl FeeQuery {
    /// Matches every invoice
    pub fn all() -> Self {
        Self::default()
    }

    /// Invoices billed to a student
    pub fn by_student(student_id: StudentId) -> Self {
        Self {
            student_id: Some(student_id),
            ..Default::default()
        }
    }

    /// Invoices for a subject
    pub fn by_subject(subject_id: SubjectId) -> Self {
        Self {
            subject_id: Some(subject_id),
            ..Default::default()
        }
    }

    /// Invoices with an effective status
    pub fn by_status(status: FeeStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Invoices in a category
    pub fn by_category(category: FeeCategory) -> Self {
        Self {
            category: Some(category),
            ..Default::default()
        }
    }

    /// Invoices for an academic year
    pub fn by_academic_year(academic_year: impl Into<String>) -> Self {
        Self {
            academic_year: Some(academic_year.into()),
            ..Default::default()
        }
    }

    /// Invoices for a term
    pub fn by_term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            ..Default::default()
        }
    }

    /// Invoices whose payment date falls in a calendar month
    pub fn by_payment_month(year: i32, month: u32) -> Self {
        Self {
            payment_month: Some((year, month)),
            ..Default::default()
        }
    }

    /// Invoices billed to students in a class
    pub fn by_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Default::default()
        }
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Returns true if the invoice passes every filter
    pub fn matches(&self, invoice: &FeeInvoice) -> bool {
        self.student_id.map_or(true, |id| invoice.student_id == id)
            && self.subject_id.map_or(true, |id| invoice.subject_id == id)
            && self.status.map_or(true, |s| invoice.snapshot.status == s)
            && self.category.map_or(true, |c| invoice.snapshot.category == c)
            && self
                .academic_year
                .as_ref()
                .map_or(true, |y| invoice.academic_year.as_ref() == Some(y))
            && self.term.as_ref().map_or(true, |t| invoice.term.as_ref() == Some(t))
            && self.payment_month.map_or(true, |(year, month)| {
                invoice.payment_date.year() == year && invoice.payment_date.month() == month
            })
    }
}

/// Persistence port for fee invoices
///
/// Updates are optimistic: a write only lands if the stored invoice is still
/// at [`FeeInvoice::previous_version`], so concurrent read-modify-write
/// cycles on one invoice cannot silently overwrite each other.
#[async_trait]
pub trait FeePort: DomainPort + HealthCheckable {
    /// Retrieves an invoice by ID, or `PortError::NotFound`
    async fn get_fee(&self, id: FeeId) -> Result<FeeInvoice, PortError>;

    /// Lists invoices matching the query, oldest first
    async fn find_fees(&self, query: FeeQuery) -> Result<Vec<FeeInvoice>, PortError>;

    /// Inserts new invoices; either all are stored or none are
    async fn insert_fees(&self, fees: &[FeeInvoice]) -> Result<(), PortError>;

    /// Replaces a stored invoice
    ///
    /// Fails with `PortError::NotFound` if it is gone, or `PortError::Conflict`
    /// if its stored version is not `fee.previous_version()`.
    async fn update_fee(&self, fee: &FeeInvoice) -> Result<(), PortError>;

    /// Deletes an invoice, or `PortError::NotFound`
    async fn delete_fee(&self, id: FeeId) -> Result<(), PortError>;

    /// Deletes every invoice billed to a student, returning how many were removed
    async fn delete_fees_for_student(&self, student_id: StudentId) -> Result<u64, PortError>;

    /// Number of stored invoices
    async fn count_fees(&self) -> Result<u64, PortError>;

    /// Next sequence number for invoice numbering
    ///
    /// The default is `count + 1`, which is only unique under a single
    /// writer. Adapters backed by an atomic sequence should override it.
    async fn next_invoice_sequence(&self) -> Result<u64, PortError> {
        Ok(self.count_fees().await? + 1)
    }
}

/// Lookup port for roster records
#[async_trait]
pub trait RosterPort: DomainPort {
    /// Retrieves a student, or `PortError::NotFound`
    async fn get_student(&self, id: StudentId) -> Result<Student, PortError>;

    /// Retrieves a subject, or `PortError::NotFound`
    async fn get_subject(&self, id: SubjectId) -> Result<Subject, PortError>;
}

/// In-memory implementations of the fee ports for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    struct FeeStore {
        fees: HashMap<FeeId, FeeInvoice>,
        /// Insertion order, for stable listing
        order: Vec<FeeId>,
        last_sequence: u64,
    }

    /// In-memory mock implementation of FeePort
    #[derive(Debug, Default, Clone)]
    pub struct MockFeePort {
        store: Arc<RwLock<FeeStore>>,
        /// Resolves class filters; without it no student belongs to a class
        roster: Option<MockRosterPort>,
    }

    impl MockFeePort {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with invoices for testing
        pub async fn with_fees(fees: Vec<FeeInvoice>) -> Self {
            let port = Self::new();
            {
                let mut store = port.store.write().await;
                for fee in fees {
                    store.order.push(fee.id);
                    store.fees.insert(fee.id, fee);
                }
            }
            port
        }

        /// Resolves `class_name` filters against a roster
        pub fn with_roster_lookup(mut self, roster: MockRosterPort) -> Self {
            self.roster = Some(roster);
            self
        }

        async fn students_in_class(&self, class_name: &str) -> HashSet<StudentId> {
            let Some(roster) = &self.roster else {
                return HashSet::new();
            };
            let wanted = class_name.to_lowercase();
            roster
                .students
                .read()
                .await
                .values()
                .filter(|s| s.class_name.as_deref().is_some_and(|c| c.to_lowercase() == wanted))
                .map(|s| s.id)
                .collect()
        }
    }

    impl DomainPort for MockFeePort {}

    #[async_trait]
    impl HealthCheckable for MockFeePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-fee-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl FeePort for MockFeePort {
        async fn get_fee(&self, id: FeeId) -> Result<FeeInvoice, PortError> {
            self.store
                .read()
                .await
                .fees
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Fee", id))
        }

        async fn find_fees(&self, query: FeeQuery) -> Result<Vec<FeeInvoice>, PortError> {
            let class_members = match query.class_name.as_deref() {
                Some(class_name) => Some(self.students_in_class(class_name).await),
                None => None,
            };

            let store = self.store.read().await;
            let matching = store
                .order
                .iter()
                .filter_map(|id| store.fees.get(id))
                .filter(|fee| query.matches(fee))
                .filter(|fee| {
                    class_members
                        .as_ref()
                        .map_or(true, |members| members.contains(&fee.student_id))
                })
                .skip(query.offset.unwrap_or(0) as usize)
                .take(query.limit.map_or(usize::MAX, |l| l as usize))
                .cloned()
                .collect();
            Ok(matching)
        }

        async fn insert_fees(&self, fees: &[FeeInvoice]) -> Result<(), PortError> {
            let mut store = self.store.write().await;
            for fee in fees {
                let duplicate_number = store
                    .fees
                    .values()
                    .any(|existing| existing.invoice_number == fee.invoice_number);
                if store.fees.contains_key(&fee.id) || duplicate_number {
                    return Err(PortError::conflict(format!(
                        "Fee {} already exists",
                        fee.invoice_number
                    )));
                }
            }
            for fee in fees {
                store.order.push(fee.id);
                store.fees.insert(fee.id, fee.clone());
            }
            Ok(())
        }

        async fn update_fee(&self, fee: &FeeInvoice) -> Result<(), PortError> {
            let mut store = self.store.write().await;
            match store.fees.get_mut(&fee.id) {
                Some(existing) if existing.version == fee.previous_version() => {
                    *existing = fee.clone();
                    Ok(())
                }
                Some(existing) => Err(PortError::conflict(format!(
                    "Fee {} was modified concurrently (stored version {}, expected {})",
                    fee.invoice_number,
                    existing.version,
                    fee.previous_version()
                ))),
                None => Err(PortError::not_found("Fee", fee.id)),
            }
        }

        async fn delete_fee(&self, id: FeeId) -> Result<(), PortError> {
            let mut store = self.store.write().await;
            if store.fees.remove(&id).is_none() {
                return Err(PortError::not_found("Fee", id));
            }
            store.order.retain(|existing| *existing != id);
            Ok(())
        }

        async fn delete_fees_for_student(&self, student_id: StudentId) -> Result<u64, PortError> {
            let mut store = self.store.write().await;
            let doomed: Vec<FeeId> = store
                .fees
                .values()
                .filter(|fee| fee.student_id == student_id)
                .map(|fee| fee.id)
                .collect();
            for id in &doomed {
                store.fees.remove(id);
            }
            store.order.retain(|id| !doomed.contains(id));
            Ok(doomed.len() as u64)
        }

        async fn count_fees(&self) -> Result<u64, PortError> {
            Ok(self.store.read().await.fees.len() as u64)
        }

        async fn next_invoice_sequence(&self) -> Result<u64, PortError> {
            let mut store = self.store.write().await;
            let next = store.last_sequence.max(store.fees.len() as u64) + 1;
            store.last_sequence = next;
            Ok(next)
        }
    }

    /// In-memory mock implementation of RosterPort
    #[derive(Debug, Default, Clone)]
    pub struct MockRosterPort {
        students: Arc<RwLock<HashMap<StudentId, Student>>>,
        subjects: Arc<RwLock<HashMap<SubjectId, Subject>>>,
    }

    impl MockRosterPort {
        /// Creates an empty roster
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with students and subjects
        pub async fn with_roster(students: Vec<Student>, subjects: Vec<Subject>) -> Self {
            let port = Self::new();
            for student in students {
                port.add_student(student).await;
            }
            for subject in subjects {
                port.add_subject(subject).await;
            }
            port
        }

        /// Adds a student
        pub async fn add_student(&self, student: Student) {
            self.students.write().await.insert(student.id, student);
        }

        /// Adds a subject
        pub async fn add_subject(&self, subject: Subject) {
            self.subjects.write().await.insert(subject.id, subject);
        }
    }

    impl DomainPort for MockRosterPort {}

    #[async_trait]
    impl RosterPort for MockRosterPort {
        async fn get_student(&self, id: StudentId) -> Result<Student, PortError> {
            self.students
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Student", id))
        }

        async fn get_subject(&self, id: SubjectId) -> Result<Subject, PortError> {
            self.subjects
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Subject", id))
        }
    }
}
