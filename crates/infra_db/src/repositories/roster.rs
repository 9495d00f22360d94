//! Roster repository implementation
//!
//! Read access to students and subjects, plus inserts used to seed the
//! roster in tests and local environments.

use uuid::Uuid;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// A row from the `students` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StudentRow {
    pub student_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub class_name: Option<String>,
}

/// A row from the `subjects` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SubjectRow {
    pub subject_id: Uuid,
    pub name: String,
    pub code: Option<String>,
}

/// Repository for students and subjects
#[derive(Debug, Clone)]
pub struct RosterRepository {
    pool: PgPool,
}

impl RosterRepository {
    /// Creates a new RosterRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a student by identifier
    pub async fn get_student(&self, student_id: Uuid) -> Result<StudentRow, DatabaseError> {
        sqlx::query_as::<_, StudentRow>(
            "SELECT student_id, first_name, last_name, class_name FROM students WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Student", student_id))
    }

    /// Retrieves a subject by identifier
    pub async fn get_subject(&self, subject_id: Uuid) -> Result<SubjectRow, DatabaseError> {
        sqlx::query_as::<_, SubjectRow>("SELECT subject_id, name, code FROM subjects WHERE subject_id = $1")
            .bind(subject_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Subject", subject_id))
    }

    /// Inserts a student
    pub async fn insert_student(&self, row: &StudentRow) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO students (student_id, first_name, last_name, class_name) VALUES ($1, $2, $3, $4)")
            .bind(row.student_id)
            .bind(&row.first_name)
            .bind(&row.last_name)
            .bind(&row.class_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts a subject
    pub async fn insert_subject(&self, row: &SubjectRow) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO subjects (subject_id, name, code) VALUES ($1, $2, $3)")
            .bind(row.subject_id)
            .bind(&row.name)
            .bind(&row.code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
