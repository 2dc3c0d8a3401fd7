//! PostgreSQL-backed `ExpenseCategoryRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::expense::ExpenseCategory;
use crate::domain::ports::{ExpenseCategoryRepository, ExpensePersistenceError};

use super::diesel_helpers::{lower, map_diesel_error, map_pool_error};
use super::models::ExpenseCategoryRow;
use super::pool::DbPool;
use super::schema::expense_categories;

/// Diesel-backed implementation of the `ExpenseCategoryRepository` port.
#[derive(Clone)]
pub struct DieselExpenseCategoryRepository {
    pool: DbPool,
}

impl DieselExpenseCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_category(row: ExpenseCategoryRow) -> ExpenseCategory {
    ExpenseCategory {
        id: row.id,
        name: row.name,
        description: row.description,
    }
}

fn category_to_row(category: &ExpenseCategory) -> ExpenseCategoryRow {
    ExpenseCategoryRow {
        id: category.id,
        name: category.name.clone(),
        description: category.description.clone(),
    }
}

#[async_trait]
impl ExpenseCategoryRepository for DieselExpenseCategoryRepository {
    async fn list(&self) -> Result<Vec<ExpenseCategory>, ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ExpenseCategoryRow> = expense_categories::table
            .select(ExpenseCategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_category).collect())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ExpenseCategory>, ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ExpenseCategoryRow> = expense_categories::table
            .find(id)
            .select(ExpenseCategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_category))
    }

    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ExpenseCategory>, ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ExpenseCategoryRow> = expense_categories::table
            .filter(lower(expense_categories::name).eq(name.to_lowercase()))
            .select(ExpenseCategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_category))
    }

    async fn create(&self, category: &ExpenseCategory) -> Result<(), ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(expense_categories::table)
            .values(category_to_row(category))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, category: &ExpenseCategory) -> Result<(), ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(expense_categories::table.find(category.id))
            .set(category_to_row(category))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(ExpensePersistenceError::query(
                "expense category vanished during update",
            ));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ExpensePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(expense_categories::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn category_round_trips_through_the_row() {
        let category = ExpenseCategory {
            id: Uuid::new_v4(),
            name: "Direct".to_owned(),
            description: "Derived from project staffing".to_owned(),
        };

        let back = row_to_category(category_to_row(&category));
        assert_eq!(back, category);
    }
}
