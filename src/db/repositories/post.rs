use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::db::now_rfc3339;
use crate::entities::posts;

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, title: &str, text: &str, creator_id: i32) -> Result<posts::Model> {
        let now = now_rfc3339();

        let active = posts::ActiveModel {
            title: Set(title.to_string()),
            text: Set(text.to_string()),
            creator_id: Set(creator_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(&self.conn).await.context("Failed to insert post")
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<posts::Model>> {
        posts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query post by ID")
    }

    /// Newest-first page of posts. `cursor` is the `created_at` of the last
    /// item of the previous page; only strictly older posts are returned.
    /// `fetch` is the row count to pull (callers over-fetch by one to learn
    /// whether more pages exist).
    pub async fn list_page(&self, fetch: u64, cursor: Option<&str>) -> Result<Vec<posts::Model>> {
        let mut query = posts::Entity::find()
            .order_by_desc(posts::Column::CreatedAt)
            .limit(fetch);

        if let Some(cursor) = cursor {
            query = query.filter(posts::Column::CreatedAt.lt(cursor));
        }

        query.all(&self.conn).await.context("Failed to list posts")
    }

    pub async fn update_title(&self, post: posts::Model, title: &str) -> Result<posts::Model> {
        let mut active: posts::ActiveModel = post.into();
        active.title = Set(title.to_string());
        active.updated_at = Set(now_rfc3339());

        active
            .update(&self.conn)
            .await
            .context("Failed to update post title")
    }

    /// Deletes a post by id; returns whether a row was removed.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = posts::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete post")?;

        Ok(result.rows_affected > 0)
    }
}
