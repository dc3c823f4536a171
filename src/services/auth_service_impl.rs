use std::sync::Arc;

use sea_orm::SqlErr;
use tokio::task;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::constants::reset::{FORGET_PASSWORD_PREFIX, TOKEN_TTL_HOURS};
use crate::db::{Store, hash_password, verify_password};
use crate::entities::users;
use crate::services::auth_service::{
    AuthError, AuthService, FieldViolation, RegisterInput, validate_register,
};
use crate::services::mailer::Mailer;

/// [`AuthService`] backed by the SQLite store, Argon2id hashing, and the
/// SMTP mailer.
pub struct SeaOrmAuthService {
    store: Store,
    mailer: Arc<Mailer>,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, mailer: Arc<Mailer>, security: SecurityConfig) -> Self {
        Self {
            store,
            mailer,
            security,
        }
    }

    /// Argon2 hashing is CPU-bound, so it runs on the blocking pool.
    async fn hash_on_blocking_pool(&self, password: String) -> Result<String, AuthError> {
        let security = self.security.clone();
        let hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {e}")))??;
        Ok(hash)
    }
}

#[async_trait::async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, options: RegisterInput) -> Result<users::Model, AuthError> {
        let violations = validate_register(&options);
        if !violations.is_empty() {
            return Err(AuthError::Validation(violations));
        }

        let hash = self.hash_on_blocking_pool(options.password.clone()).await?;

        match self
            .store
            .create_user(&options.username, &options.email, &hash)
            .await
        {
            Ok(user) => {
                info!(user_id = user.id, username = %user.username, "User registered");
                Ok(user)
            }
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AuthError::Duplicate),
                _ => Err(err.into()),
            },
        }
    }

    async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<users::Model, AuthError> {
        let user = if username_or_email.contains('@') {
            self.store.get_user_by_email(username_or_email).await?
        } else {
            self.store.get_user_by_username(username_or_email).await?
        };

        let Some(user) = user else {
            return Err(AuthError::UnknownUser);
        };

        let stored_hash = user.password_hash.clone();
        let password = password.to_string();
        let valid = task::spawn_blocking(move || verify_password(&stored_hash, &password))
            .await
            .map_err(|e| AuthError::Internal(format!("Verify task failed: {e}")))??;

        if valid {
            Ok(user)
        } else {
            Err(AuthError::WrongPassword)
        }
    }

    async fn me(&self, user_id: i32) -> Result<Option<users::Model>, AuthError> {
        Ok(self.store.get_user(user_id).await?)
    }

    async fn forgot_password(&self, email: &str) -> Result<Option<String>, AuthError> {
        let Some(user) = self.store.get_user_by_email(email).await? else {
            // Do not reveal whether the address is registered
            debug!(email, "Password reset requested for unknown email");
            return Ok(None);
        };

        let token = Uuid::new_v4().to_string();
        let token_key = format!("{FORGET_PASSWORD_PREFIX}{token}");

        self.store
            .store_reset_token(&token_key, user.id, TOKEN_TTL_HOURS)
            .await?;

        self.mailer.send_password_reset(email, &token).await?;

        info!(user_id = user.id, "Password reset token issued");
        Ok(Some(token))
    }

    async fn change_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<users::Model, AuthError> {
        if new_password.chars().count() < crate::constants::limits::MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(vec![FieldViolation::new(
                "newPassword",
                "password is too short, 6 chars at least",
            )]));
        }

        let token_key = format!("{FORGET_PASSWORD_PREFIX}{token}");

        let Some(user_id) = self.store.peek_reset_token(&token_key).await? else {
            return Err(AuthError::TokenExpired);
        };

        if self.store.get_user(user_id).await?.is_none() {
            return Err(AuthError::TokenUserGone);
        }

        let hash = self.hash_on_blocking_pool(new_password.to_string()).await?;
        self.store.update_user_password(user_id, &hash).await?;
        self.store.delete_reset_token(&token_key).await?;

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::TokenUserGone)?;

        info!(user_id, "Password changed via reset token");
        Ok(user)
    }
}
