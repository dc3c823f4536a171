use tracing::info;

use crate::constants::limits::MAX_POSTS_PAGE;
use crate::db::Store;
use crate::entities::posts;
use crate::services::post_service::{PostError, PostPage, PostService};

/// [`PostService`] backed by the SQLite store.
pub struct SeaOrmPostService {
    store: Store,
}

impl SeaOrmPostService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl PostService for SeaOrmPostService {
    async fn list_page(&self, limit: i32, cursor: Option<&str>) -> Result<PostPage, PostError> {
        let capped = u64::try_from(limit).unwrap_or(1).clamp(1, MAX_POSTS_PAGE);

        // Fetch one extra row to learn whether another page exists
        let mut rows = self.store.list_posts_page(capped + 1, cursor).await?;

        let page_len = usize::try_from(capped).unwrap_or(usize::MAX);
        let has_more = rows.len() > page_len;
        rows.truncate(page_len);

        Ok(PostPage {
            posts: rows,
            has_more,
        })
    }

    async fn get(&self, id: i32) -> Result<Option<posts::Model>, PostError> {
        Ok(self.store.get_post(id).await?)
    }

    async fn create(
        &self,
        title: &str,
        text: &str,
        creator_id: i32,
    ) -> Result<posts::Model, PostError> {
        if title.trim().is_empty() {
            return Err(PostError::Invalid("title cannot be empty".to_string()));
        }
        if text.trim().is_empty() {
            return Err(PostError::Invalid("text cannot be empty".to_string()));
        }

        let post = self.store.create_post(title, text, creator_id).await?;
        info!(post_id = post.id, creator_id, "Post created");
        Ok(post)
    }

    async fn update(
        &self,
        id: i32,
        title: Option<&str>,
        editor_id: i32,
    ) -> Result<Option<posts::Model>, PostError> {
        let Some(post) = self.store.get_post(id).await? else {
            return Ok(None);
        };

        if post.creator_id != editor_id {
            return Err(PostError::NotOwner);
        }

        match title {
            None => Ok(Some(post)),
            Some(title) if title.trim().is_empty() => {
                Err(PostError::Invalid("title cannot be empty".to_string()))
            }
            Some(title) => {
                let updated = self.store.update_post_title(post, title).await?;
                info!(post_id = id, editor_id, "Post updated");
                Ok(Some(updated))
            }
        }
    }

    async fn delete(&self, id: i32, editor_id: i32) -> Result<bool, PostError> {
        let Some(post) = self.store.get_post(id).await? else {
            return Ok(false);
        };

        if post.creator_id != editor_id {
            return Err(PostError::NotOwner);
        }

        let deleted = self.store.delete_post(post.id).await?;
        if deleted {
            info!(post_id = id, editor_id, "Post deleted");
        }
        Ok(deleted)
    }
}
