//! Port abstraction for user persistence adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::user::{Email, User};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All user records, unpaginated.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by email. Emails are unique per deployment.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new user record.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Replace an existing user record.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Remove a user record. Returns whether a record was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, UserPersistenceError>;
}
