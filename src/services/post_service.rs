use thiserror::Error;

use crate::entities::posts;

/// Errors specific to post operations.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("{0}")]
    Invalid(String),

    #[error("not authorized")]
    NotOwner,

    #[error("database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for PostError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// One page of the post feed, newest first. `has_more` tells the client
/// whether another page exists past the last returned post.
#[derive(Debug)]
pub struct PostPage {
    pub posts: Vec<posts::Model>,
    pub has_more: bool,
}

/// Domain service trait for posts.
#[async_trait::async_trait]
pub trait PostService: Send + Sync {
    /// Cursor-paginated feed. The limit is capped server-side; the cursor is
    /// the `created_at` of the last post from the previous page.
    async fn list_page(&self, limit: i32, cursor: Option<&str>) -> Result<PostPage, PostError>;

    async fn get(&self, id: i32) -> Result<Option<posts::Model>, PostError>;

    async fn create(
        &self,
        title: &str,
        text: &str,
        creator_id: i32,
    ) -> Result<posts::Model, PostError>;

    /// Updates the title of a post owned by `editor_id`. Returns `None` when
    /// no such post exists, [`PostError::NotOwner`] when it belongs to
    /// someone else.
    async fn update(
        &self,
        id: i32,
        title: Option<&str>,
        editor_id: i32,
    ) -> Result<Option<posts::Model>, PostError>;

    /// Deletes a post owned by `editor_id`. Returns `false` when the post
    /// does not exist.
    async fn delete(&self, id: i32, editor_id: i32) -> Result<bool, PostError>;
}
