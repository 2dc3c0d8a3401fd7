//! PostgreSQL-backed `ExpenseRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::expense::{Expense, Month};
use crate::domain::ports::{ExpensePersistenceError, ExpenseRepository};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{month_from_db, month_to_db, ExpenseRow};
use super::pool::DbPool;
use super::schema::expenses;

/// Diesel-backed implementation of the `ExpenseRepository` port.
#[derive(Clone)]
pub struct DieselExpenseRepository {
    pool: DbPool,
}

impl DieselExpenseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_expense(row: ExpenseRow) -> Result<Expense, ExpensePersistenceError> {
    let month = month_from_db(row.month).map_err(|error| {
        ExpensePersistenceError::query(format!("stored expense {} is invalid: {error}", row.id))
    })?;
    Ok(Expense {
        id: row.id,
        year: row.year,
        month,
        planned_expense: row.planned_expense,
        actual_expense: row.actual_expense,
        expense_category_id: row.expense_category_id,
    })
}

fn expense_to_row(expense: &Expense) -> ExpenseRow {
    ExpenseRow {
        id: expense.id,
        year: expense.year,
        month: month_to_db(expense.month),
        planned_expense: expense.planned_expense,
        actual_expense: expense.actual_expense,
        expense_category_id: expense.expense_category_id,
    }
}

#[async_trait]
impl ExpenseRepository for DieselExpenseRepository {
    async fn list(&self) -> Result<Vec<Expense>, ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ExpenseRow> = expenses::table
            .select(ExpenseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_expense).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ExpenseRow> = expenses::table
            .find(id)
            .select(ExpenseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_expense).transpose()
    }

    async fn find_by_period(
        &self,
        year: i32,
        month: Month,
        category_id: Uuid,
    ) -> Result<Option<Expense>, ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ExpenseRow> = expenses::table
            .filter(expenses::year.eq(year))
            .filter(expenses::month.eq(month_to_db(month)))
            .filter(expenses::expense_category_id.eq(category_id))
            .select(ExpenseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_expense).transpose()
    }

    async fn create(&self, expense: &Expense) -> Result<(), ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(expenses::table)
            .values(expense_to_row(expense))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, expense: &Expense) -> Result<(), ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(expenses::table.find(expense.id))
            .set(expense_to_row(expense))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(ExpensePersistenceError::query(
                "expense vanished during update",
            ));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(expenses::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
