//! Domain service for registration, login, and the password-reset flow.
//!
//! Session handling stays in the GraphQL layer; this service only talks to
//! the store and the mailer.

use serde::Serialize;
use thiserror::Error;

use crate::constants::limits::{MIN_PASSWORD_LEN, MIN_USERNAME_LEN};
use crate::entities::users;

/// A validation failure tagged with the client form field it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    #[must_use]
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("username or email already taken")]
    Duplicate,

    #[error("unknown username or email")]
    UnknownUser,

    #[error("incorrect password")]
    WrongPassword,

    #[error("reset token expired or invalid")]
    TokenExpired,

    #[error("user for this token no longer exists")]
    TokenUserGone,

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Registration form payload.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Checks the registration form. Returns the full list of violations so the
/// client can mark every offending field at once.
#[must_use]
pub fn validate_register(options: &RegisterInput) -> Vec<FieldViolation> {
    let mut errors = Vec::new();

    if !options.email.contains('@') {
        errors.push(FieldViolation::new("email", "invalid email"));
    }

    if options.username.chars().count() < MIN_USERNAME_LEN {
        errors.push(FieldViolation::new(
            "username",
            "username is too short, 3 chars at least",
        ));
    }

    if options.username.contains('@') {
        errors.push(FieldViolation::new("username", "cannot include an @"));
    }

    if options.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldViolation::new(
            "password",
            "password is too short, 6 chars at least",
        ));
    }

    errors
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Validates the form, hashes the password, and creates the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for form errors and
    /// [`AuthError::Duplicate`] when the username or email is taken.
    async fn register(&self, options: RegisterInput) -> Result<users::Model, AuthError>;

    /// Verifies credentials. The identifier is treated as an email when it
    /// contains an `@`, as a username otherwise.
    async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<users::Model, AuthError>;

    /// Resolves the session-stored user id back into a user.
    async fn me(&self, user_id: i32) -> Result<Option<users::Model>, AuthError>;

    /// Starts the reset flow for an email address. Returns the generated
    /// token when the address is registered, `None` otherwise; callers must
    /// not leak the difference to the client.
    async fn forgot_password(&self, email: &str) -> Result<Option<String>, AuthError>;

    /// Redeems a reset token, replaces the password, and deletes the token
    /// so it is single-use.
    async fn change_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<users::Model, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(username: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(validate_register(&input("ben", "ben@example.com", "secret")).is_empty());
    }

    #[test]
    fn flags_bad_email() {
        let errors = validate_register(&input("ben", "not-an-email", "secret"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn flags_short_username_and_at_sign() {
        let errors = validate_register(&input("a@", "a@example.com", "secret"));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.field == "username"));
    }

    #[test]
    fn flags_short_password() {
        let errors = validate_register(&input("ben", "ben@example.com", "12345"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
    }

    #[test]
    fn collects_every_violation() {
        let errors = validate_register(&input("ab", "nope", "123"));
        assert_eq!(errors.len(), 3);
    }
}
