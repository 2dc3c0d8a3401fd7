//! Port abstractions for expense and expense category persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::expense::{Expense, ExpenseCategory, Month};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by expense repository adapters.
    pub enum ExpensePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "expense repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "expense repository query failed: {message}",
    }
}

#[async_trait]
pub trait ExpenseCategoryRepository: Send + Sync {
    /// All expense categories.
    async fn list(&self) -> Result<Vec<ExpenseCategory>, ExpensePersistenceError>;

    /// Fetch a category by identifier.
    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ExpenseCategory>, ExpensePersistenceError>;

    /// Fetch a category by name, matched case-insensitively.
    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ExpenseCategory>, ExpensePersistenceError>;

    /// Insert a new category.
    async fn create(&self, category: &ExpenseCategory) -> Result<(), ExpensePersistenceError>;

    /// Replace an existing category.
    async fn update(&self, category: &ExpenseCategory) -> Result<(), ExpensePersistenceError>;

    /// Remove a category. Returns whether a record was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ExpensePersistenceError>;
}

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// All expenses.
    async fn list(&self) -> Result<Vec<Expense>, ExpensePersistenceError>;

    /// Fetch an expense by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, ExpensePersistenceError>;

    /// Fetch the expense recorded for a `(year, month, category)` key.
    /// At most one exists.
    async fn find_by_period(
        &self,
        year: i32,
        month: Month,
        category_id: Uuid,
    ) -> Result<Option<Expense>, ExpensePersistenceError>;

    /// Insert a new expense.
    async fn create(&self, expense: &Expense) -> Result<(), ExpensePersistenceError>;

    /// Replace an existing expense.
    async fn update(&self, expense: &Expense) -> Result<(), ExpensePersistenceError>;

    /// Remove an expense. Returns whether a record was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ExpensePersistenceError>;
}
