//! Domain primitives, aggregates, and reporting computations.
//!
//! Purpose: define strongly typed business entities used by the API and
//! persistence layers, plus the pure reporting functions computed over
//! them. Types are validated at the boundary; each type documents its
//! invariants and serde contract in its own Rustdoc.

pub mod employee;
pub mod error;
pub mod expense;
pub mod invoice;
pub mod ports;
pub mod project;
pub mod reporting;
pub mod user;

pub use self::employee::{Currency, Department, Employee, TechStack};
pub use self::error::{Error, ErrorCode};
pub use self::expense::{Expense, ExpenseCategory, Month};
pub use self::invoice::{Invoice, InvoiceStatus};
pub use self::project::{
    Assignment, Project, ProjectStatus, ProjectType, SalesChannel,
};
pub use self::user::{Email, Role, User};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
