//! GraphQL schema: thin resolvers over the domain services. Resolvers pull
//! the per-request [`Session`] and the shared state out of context data.

use async_graphql::{Context, EmptySubscription, Error, MergedObject, Result, Schema};
use tower_sessions::Session;

use crate::constants::SESSION_USER_KEY;
use crate::state::SharedState;

pub mod post;
pub mod types;
pub mod user;

#[derive(MergedObject, Default)]
pub struct QueryRoot(user::UserQuery, post::PostQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(user::UserMutation, post::PostMutation);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[must_use]
pub fn build_schema(state: SharedState) -> AppSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(state)
    .finish()
}

/// User id stored in the request's session, if any.
pub(crate) async fn session_user_id(ctx: &Context<'_>) -> Result<Option<i32>> {
    let session = ctx.data::<Session>()?;
    Ok(session.get::<i32>(SESSION_USER_KEY).await?)
}

/// Fails resolution when the request carries no logged-in session.
pub(crate) async fn require_user_id(ctx: &Context<'_>) -> Result<i32> {
    session_user_id(ctx)
        .await?
        .ok_or_else(|| Error::new("Not authenticated"))
}
