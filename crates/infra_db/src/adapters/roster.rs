//! PostgreSQL Roster Adapter
//!
//! Implements [`RosterPort`] over the [`RosterRepository`].

use async_trait::async_trait;
use tracing::instrument;

use core_kernel::{DomainPort, PortError, StudentId, SubjectId};
use domain_fees::{RosterPort, Student, Subject};
use sqlx::PgPool;

use crate::repositories::roster::{RosterRepository, StudentRow, SubjectRow};

/// PostgreSQL-backed implementation of the RosterPort trait
#[derive(Debug, Clone)]
pub struct PostgresRosterAdapter {
    repository: RosterRepository,
}

impl PostgresRosterAdapter {
    /// Creates a new PostgreSQL roster adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: RosterRepository::new(pool),
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &RosterRepository {
        &self.repository
    }

    /// Stores a student
    pub async fn add_student(&self, student: &Student) -> Result<(), PortError> {
        self.repository.insert_student(&student_to_row(student)).await?;
        Ok(())
    }

    /// Stores a subject
    pub async fn add_subject(&self, subject: &Subject) -> Result<(), PortError> {
        self.repository.insert_subject(&subject_to_row(subject)).await?;
        Ok(())
    }
}

impl DomainPort for PostgresRosterAdapter {}

#[async_trait]
impl RosterPort for PostgresRosterAdapter {
    #[instrument(skip(self), fields(student_id = %id))]
    async fn get_student(&self, id: StudentId) -> Result<Student, PortError> {
        let row = self.repository.get_student(id.into()).await?;
        Ok(row_to_student(row))
    }

    #[instrument(skip(self), fields(subject_id = %id))]
    async fn get_subject(&self, id: SubjectId) -> Result<Subject, PortError> {
        let row = self.repository.get_subject(id.into()).await?;
        Ok(row_to_subject(row))
    }
}

fn student_to_row(student: &Student) -> StudentRow {
    StudentRow {
        student_id: student.id.into(),
        first_name: student.first_name.clone(),
        last_name: student.last_name.clone(),
        class_name: student.class_name.clone(),
    }
}

fn row_to_student(row: StudentRow) -> Student {
    Student {
        id: StudentId::from(row.student_id),
        first_name: row.first_name,
        last_name: row.last_name,
        class_name: row.class_name,
    }
}

fn subject_to_row(subject: &Subject) -> SubjectRow {
    SubjectRow {
        subject_id: subject.id.into(),
        name: subject.name.clone(),
        code: subject.code.clone(),
    }
}

fn row_to_subject(row: SubjectRow) -> Subject {
    Subject {
        id: SubjectId::from(row.subject_id),
        name: row.name,
        code: row.code,
    }
}
