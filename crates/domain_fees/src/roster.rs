//! Roster records owned by the record-management layer
//!
//! The fee domain only reads these to check that a charge refers to a real
//! student and subject.

use serde::{Deserialize, Serialize};

use core_kernel::{StudentId, SubjectId};

/// A student who can be billed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    /// Class or grade the student is enrolled in
    pub class_name: Option<String>,
}

impl Student {
    /// Creates a new student record
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: StudentId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            class_name: None,
        }
    }

    /// Sets the class name
    pub fn in_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Returns "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A subject a student can be charged for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub code: Option<String>,
}

impl Subject {
    /// Creates a new subject record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SubjectId::new(),
            name: name.into(),
            code: None,
        }
    }

    /// Sets the subject code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}
