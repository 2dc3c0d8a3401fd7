//! Port abstraction for password reset token persistence.
//!
//! Adapters store only the SHA-256 digest of the token; the cleartext
//! travels once, inside the emailed reset link.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by password reset adapters.
    pub enum PasswordResetPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "password reset repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "password reset repository query failed: {message}",
    }
}

/// A stored reset token digest and its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetToken {
    pub user_id: Uuid,
    /// Hex-encoded SHA-256 digest of the emailed token.
    pub token_digest: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Store a freshly issued token.
    async fn store(&self, token: &PasswordResetToken)
        -> Result<(), PasswordResetPersistenceError>;

    /// Look up a stored token by user and digest.
    async fn find(
        &self,
        user_id: Uuid,
        token_digest: &str,
    ) -> Result<Option<PasswordResetToken>, PasswordResetPersistenceError>;

    /// Revoke every token issued to the user.
    async fn revoke_for_user(&self, user_id: Uuid)
        -> Result<(), PasswordResetPersistenceError>;
}
