//! PostgreSQL-backed `PasswordResetRepository` adapter.
//!
//! Only token digests are stored; expiry is checked by the auth handler,
//! so this adapter is plain keyed storage.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    PasswordResetPersistenceError, PasswordResetRepository, PasswordResetToken,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::PasswordResetTokenRow;
use super::pool::DbPool;
use super::schema::password_reset_tokens;

/// Diesel-backed implementation of the `PasswordResetRepository` port.
#[derive(Clone)]
pub struct DieselPasswordResetRepository {
    pool: DbPool,
}

impl DieselPasswordResetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn token_to_row(token: &PasswordResetToken) -> PasswordResetTokenRow {
    PasswordResetTokenRow {
        user_id: token.user_id,
        token_digest: token.token_digest.clone(),
        expires_at: token.expires_at,
    }
}

fn row_to_token(row: PasswordResetTokenRow) -> PasswordResetToken {
    PasswordResetToken {
        user_id: row.user_id,
        token_digest: row.token_digest,
        expires_at: row.expires_at,
    }
}

#[async_trait]
impl PasswordResetRepository for DieselPasswordResetRepository {
    async fn store(
        &self,
        token: &PasswordResetToken,
    ) -> Result<(), PasswordResetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Re-requesting a reset may reissue the same digest; refresh the
        // expiry instead of failing on the key.
        diesel::insert_into(password_reset_tokens::table)
            .values(token_to_row(token))
            .on_conflict((
                password_reset_tokens::user_id,
                password_reset_tokens::token_digest,
            ))
            .do_update()
            .set(password_reset_tokens::expires_at.eq(token.expires_at))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        user_id: Uuid,
        token_digest: &str,
    ) -> Result<Option<PasswordResetToken>, PasswordResetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PasswordResetTokenRow> = password_reset_tokens::table
            .find((user_id, token_digest))
            .select(PasswordResetTokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_token))
    }

    async fn revoke_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<(), PasswordResetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(
            password_reset_tokens::table.filter(password_reset_tokens::user_id.eq(user_id)),
        )
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }
}
