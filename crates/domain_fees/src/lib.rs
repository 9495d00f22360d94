//! School Fee Ledger Domain
//!
//! This crate turns a raw charge request into an invoice with its derived
//! discount, amount due, balance, category, and status, and keeps those
//! fields consistent through updates and payments.
//!
//! # Derivation Pipeline
//!
//! Every derived field is a pure function of a [`ChargeInput`]:
//!
//! - **Discount**: percentage of the total, or a fixed amount capped at the total
//! - **Amount due**: total minus discount, floored at zero
//! - **Balance**: amount due minus amount paid, floored at zero
//! - **Category**: FREE, DISCOUNT, or FULL_PAYMENT from the discount share
//! - **Status**: a sticky override if set, otherwise PENDING, PARTIAL, or PAID
//!
//! # Examples
//!
//! ```rust
//! use domain_fees::{recompute_invoice, ChargeInput, DiscountType, FeeCategory, FeeStatus};
//! use rust_decimal_macros::dec;
//!
//! let charge = ChargeInput::new(dec!(1000))
//!     .with_discount(DiscountType::Percentage, dec!(20))
//!     .with_amount_paid(dec!(300));
//!
//! let snapshot = recompute_invoice(&charge);
//! assert_eq!(snapshot.discount_amount, dec!(200));
//! assert_eq!(snapshot.amount_due, dec!(800));
//! assert_eq!(snapshot.balance, dec!(500));
//! assert_eq!(snapshot.category, FeeCategory::Discount);
//! assert_eq!(snapshot.status, FeeStatus::Partial);
//! ```

pub mod discount;
pub mod balance;
pub mod category;
pub mod status;
pub mod numbering;
pub mod charge;
pub mod invoice;
pub mod summary;
pub mod roster;
pub mod error;
pub mod ports;
pub mod service;

pub use discount::{calculate_discount_amount, validate_discount, DiscountType, UnknownDiscountType};
pub use balance::{calculate_amount_due, calculate_balance};
pub use category::{determine_category, discount_percentage, FeeCategory};
pub use status::{derive_status, resolve_status, FeeStatus};
pub use numbering::{generate_invoice_number, is_invoice_number, INVOICE_PREFIX};
pub use charge::{split_charge, ChargeInput, FeeUpdate, NewCharge, ValidatedCharge};
pub use invoice::{recompute_invoice, FeeInvoice, InvoiceSnapshot};
pub use summary::FeeSummary;
pub use roster::{Student, Subject};
pub use error::FeeError;
pub use ports::{FeePort, FeeQuery, RosterPort};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockFeePort, MockRosterPort};
pub use service::{CreatedCharges, FeeService};
