use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::db::now_rfc3339;
use crate::entities::{prelude::*, reset_tokens};

/// Short-lived key-value entries backing the password-reset flow:
/// `forget-password:<uuid> -> user_id` with a fixed expiry.
pub struct ResetTokenRepository {
    conn: DatabaseConnection,
}

impl ResetTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, token_key: &str, user_id: i32, ttl_hours: i64) -> Result<()> {
        let now = chrono::Utc::now();
        let expires_at = (now + chrono::Duration::hours(ttl_hours))
            .to_rfc3339_opts(chrono::SecondsFormat::Micros, true);

        let active = reset_tokens::ActiveModel {
            token: Set(token_key.to_string()),
            user_id: Set(user_id),
            expires_at: Set(expires_at),
            created_at: Set(now_rfc3339()),
        };

        ResetTokens::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to store reset token")?;

        Ok(())
    }

    /// Looks up a live token and returns the user id it maps to.
    /// Expired rows are purged opportunistically on every lookup.
    pub async fn peek(&self, token_key: &str) -> Result<Option<i32>> {
        let now = now_rfc3339();

        let _ = ResetTokens::delete_many()
            .filter(reset_tokens::Column::ExpiresAt.lt(now.as_str()))
            .exec(&self.conn)
            .await;

        let entry = ResetTokens::find()
            .filter(reset_tokens::Column::Token.eq(token_key))
            .filter(reset_tokens::Column::ExpiresAt.gt(now.as_str()))
            .one(&self.conn)
            .await
            .context("Failed to query reset token")?;

        Ok(entry.map(|e| e.user_id))
    }

    /// Removes a token after redemption so it is single-use.
    pub async fn delete(&self, token_key: &str) -> Result<()> {
        ResetTokens::delete_many()
            .filter(reset_tokens::Column::Token.eq(token_key))
            .exec(&self.conn)
            .await
            .context("Failed to delete reset token")?;

        Ok(())
    }
}
