//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling. The
//! adapters are thin: row structs and schema definitions stay internal,
//! and every database failure is mapped to the owning port's error type.

pub(crate) mod diesel_helpers;
mod diesel_employee_repository;
mod diesel_expense_category_repository;
mod diesel_expense_repository;
mod diesel_invoice_repository;
mod diesel_password_reset_repository;
mod diesel_project_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_employee_repository::DieselEmployeeRepository;
pub use diesel_expense_category_repository::DieselExpenseCategoryRepository;
pub use diesel_expense_repository::DieselExpenseRepository;
pub use diesel_invoice_repository::DieselInvoiceRepository;
pub use diesel_password_reset_repository::DieselPasswordResetRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
