//! Pre-built Test Fixtures
//!
//! Provides ready-to-use roster records and seeded mock ports. Named
//! fixtures are deterministic; `random_*` fixtures use `fake` for names.

use std::sync::Arc;

use chrono::NaiveDate;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_fees::{FeeService, MockFeePort, MockRosterPort, Student, Subject};

/// Fixture for roster records
pub struct RosterFixtures;

impl RosterFixtures {
    /// A student enrolled in grade 10
    pub fn student() -> Student {
        Student::new("Amara", "Okafor").in_class("Grade 10")
    }

    /// A student with a generated name
    pub fn random_student() -> Student {
        Student::new(FirstName().fake::<String>(), LastName().fake::<String>())
    }

    /// Mathematics
    pub fn mathematics() -> Subject {
        Subject::new("Mathematics").with_code("MATH101")
    }

    /// Physics
    pub fn physics() -> Subject {
        Subject::new("Physics").with_code("PHY101")
    }

    /// Chemistry
    pub fn chemistry() -> Subject {
        Subject::new("Chemistry").with_code("CHEM101")
    }

    /// Three distinct subjects
    pub fn subjects() -> Vec<Subject> {
        vec![Self::mathematics(), Self::physics(), Self::chemistry()]
    }
}

/// Fixture for monetary amounts
pub struct AmountFixtures;

impl AmountFixtures {
    /// Standard term fee
    pub fn term_fee() -> Decimal {
        dec!(1000.00)
    }

    /// Small fee for payment tests
    pub fn small_fee() -> Decimal {
        dec!(100.00)
    }
}

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// First day of the autumn term
    pub fn term_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date")
    }
}

/// A fee service over in-memory ports, seeded with one student and three subjects
pub struct ServiceFixture {
    pub service: FeeService,
    pub fees: Arc<MockFeePort>,
    pub roster: Arc<MockRosterPort>,
    pub student: Student,
    pub subjects: Vec<Subject>,
}

impl ServiceFixture {
    /// Builds the fixture
    pub async fn new() -> Self {
        let student = RosterFixtures::student();
        let subjects = RosterFixtures::subjects();
        let roster = Arc::new(MockRosterPort::with_roster(vec![student.clone()], subjects.clone()).await);
        let fees = Arc::new(MockFeePort::new().with_roster_lookup(roster.as_ref().clone()));
        let service = FeeService::new(fees.clone(), roster.clone());

        Self {
            service,
            fees,
            roster,
            student,
            subjects,
        }
    }
}
