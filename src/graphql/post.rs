use async_graphql::{Context, Error, Object, Result};

use crate::graphql::require_user_id;
use crate::graphql::types::{PaginatedPosts, Post, PostInput};
use crate::services::PostError;
use crate::state::SharedState;

fn map_post_error(err: PostError) -> Error {
    match err {
        PostError::Invalid(msg) => Error::new(msg),
        PostError::NotOwner => Error::new("not authorized"),
        PostError::Database(msg) => {
            tracing::error!(error = %msg, "Post operation failed");
            Error::new("server error, please try again")
        }
    }
}

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// Cursor-paginated feed, newest first. `cursor` is the `createdAt` of
    /// the last post of the previous page.
    async fn posts(
        &self,
        ctx: &Context<'_>,
        limit: i32,
        cursor: Option<String>,
    ) -> Result<PaginatedPosts> {
        let state = ctx.data::<SharedState>()?;

        let page = state
            .posts
            .list_page(limit, cursor.as_deref())
            .await
            .map_err(map_post_error)?;

        Ok(PaginatedPosts {
            posts: page.posts.into_iter().map(Into::into).collect(),
            has_more: page.has_more,
        })
    }

    async fn post(&self, ctx: &Context<'_>, id: i32) -> Result<Option<Post>> {
        let state = ctx.data::<SharedState>()?;
        let post = state.posts.get(id).await.map_err(map_post_error)?;
        Ok(post.map(Into::into))
    }
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    /// Creates a post owned by the logged-in user.
    async fn create_post(&self, ctx: &Context<'_>, input: PostInput) -> Result<Post> {
        let user_id = require_user_id(ctx).await?;
        let state = ctx.data::<SharedState>()?;

        let post = state
            .posts
            .create(&input.title, &input.text, user_id)
            .await
            .map_err(map_post_error)?;

        Ok(post.into())
    }

    /// Updates the title of one of the logged-in user's own posts. Returns
    /// null when the post does not exist.
    async fn update_post(
        &self,
        ctx: &Context<'_>,
        id: i32,
        title: Option<String>,
    ) -> Result<Option<Post>> {
        let user_id = require_user_id(ctx).await?;
        let state = ctx.data::<SharedState>()?;

        let post = state
            .posts
            .update(id, title.as_deref(), user_id)
            .await
            .map_err(map_post_error)?;

        Ok(post.map(Into::into))
    }

    /// Deletes one of the logged-in user's own posts. Returns false when the
    /// post does not exist.
    async fn delete_post(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        let user_id = require_user_id(ctx).await?;
        let state = ctx.data::<SharedState>()?;

        state
            .posts
            .delete(id, user_id)
            .await
            .map_err(map_post_error)
    }
}
