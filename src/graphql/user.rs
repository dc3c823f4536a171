use async_graphql::{Context, Object, Result};
use tower_sessions::Session;
use tracing::warn;

use crate::constants::SESSION_USER_KEY;
use crate::graphql::session_user_id;
use crate::graphql::types::{User, UserResponse, UsernamePasswordInput};
use crate::services::RegisterInput;
use crate::state::SharedState;

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The currently logged-in user, or null when the request carries no
    /// session.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(user_id) = session_user_id(ctx).await? else {
            return Ok(None);
        };

        let state = ctx.data::<SharedState>()?;
        let user = state.auth.me(user_id).await?;
        Ok(user.map(Into::into))
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// Creates an account and logs the new user in.
    async fn register(
        &self,
        ctx: &Context<'_>,
        options: UsernamePasswordInput,
    ) -> Result<UserResponse> {
        let state = ctx.data::<SharedState>()?;
        let session = ctx.data::<Session>()?;

        let input = RegisterInput {
            username: options.username,
            email: options.email,
            password: options.password,
        };

        match state.auth.register(input).await {
            Ok(user) => {
                session.insert(SESSION_USER_KEY, user.id).await?;
                Ok(UserResponse::from_user(user))
            }
            Err(err) => Ok(err.into()),
        }
    }

    /// Logs in by username or email; the identifier is treated as an email
    /// when it contains an `@`.
    async fn login(
        &self,
        ctx: &Context<'_>,
        username_or_email: String,
        password: String,
    ) -> Result<UserResponse> {
        let state = ctx.data::<SharedState>()?;
        let session = ctx.data::<Session>()?;

        match state.auth.login(&username_or_email, &password).await {
            Ok(user) => {
                session.insert(SESSION_USER_KEY, user.id).await?;
                Ok(UserResponse::from_user(user))
            }
            Err(err) => Ok(err.into()),
        }
    }

    /// Destroys the session server-side and expires the cookie.
    async fn logout(&self, ctx: &Context<'_>) -> Result<bool> {
        let session = ctx.data::<Session>()?;

        match session.flush().await {
            Ok(()) => Ok(true),
            Err(err) => {
                warn!(error = %err, "Failed to destroy session");
                Ok(false)
            }
        }
    }

    /// Starts the password-reset flow. Always returns true so callers cannot
    /// probe which emails are registered.
    async fn forgot_password(&self, ctx: &Context<'_>, email: String) -> Result<bool> {
        let state = ctx.data::<SharedState>()?;
        state.auth.forgot_password(&email).await?;
        Ok(true)
    }

    /// Redeems a reset token and logs the user in with the new password.
    async fn change_password(
        &self,
        ctx: &Context<'_>,
        token: String,
        new_password: String,
    ) -> Result<UserResponse> {
        let state = ctx.data::<SharedState>()?;
        let session = ctx.data::<Session>()?;

        match state.auth.change_password(&token, &new_password).await {
            Ok(user) => {
                session.insert(SESSION_USER_KEY, user.id).await?;
                Ok(UserResponse::from_user(user))
            }
            Err(err) => Ok(err.into()),
        }
    }
}
