//! PostgreSQL-backed `UserRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::user::{Email, PasswordHash, PersonName, Role, User};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Rebuild a domain user from a stored row.
///
/// The validated constructors are reapplied; a failure means the row was
/// written outside the application and surfaces as a query error.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let invalid = |error: &dyn std::fmt::Display| {
        UserPersistenceError::query(format!("stored user {} is invalid: {error}", row.id))
    };
    Ok(User {
        id: row.id,
        email: Email::new(row.email.clone()).map_err(|e| invalid(&e))?,
        first_name: PersonName::new("firstName", row.first_name.clone()).map_err(|e| invalid(&e))?,
        last_name: PersonName::new("lastName", row.last_name.clone()).map_err(|e| invalid(&e))?,
        role: Role::parse(&row.role).map_err(|e| invalid(&e))?,
        image: row.image,
        password_hash: PasswordHash::new(row.password_hash),
    })
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        id: user.id,
        email: user.email.as_ref().to_owned(),
        first_name: user.first_name.as_ref().to_owned(),
        last_name: user.last_name.as_ref().to_owned(),
        role: user.role.as_str().to_owned(),
        image: user.image.clone(),
        password_hash: user.password_hash.as_str().to_owned(),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Emails are stored normalised, so an exact match suffices.
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(users::table)
            .values(user_to_row(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(users::table.find(user.id))
            .set(user_to_row(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(UserPersistenceError::query("user vanished during update"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.find(id))
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

    fn row(email: &str, role: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            role: role.to_owned(),
            image: None,
            password_hash: "$argon2id$stub".to_owned(),
        }
    }

    #[rstest]
    fn valid_row_converts() {
        let user = row_to_user(row("ada@example.com", "Admin")).unwrap();
        assert_eq!(user.email.as_ref(), "ada@example.com");
        assert!(user.is_admin());
    }

    #[rstest]
    fn corrupt_role_surfaces_as_query_error() {
        let error = row_to_user(row("ada@example.com", "Superuser")).unwrap_err();
        assert!(matches!(error, UserPersistenceError::Query { .. }));
        assert!(error.to_string().contains("is invalid"));
    }

    #[rstest]
    fn domain_user_round_trips_through_the_row() {
        let user = row_to_user(row("ada@example.com", "Guest")).unwrap();
        let back = row_to_user(user_to_row(&user)).unwrap();
        assert_eq!(back, user);
    }
}
