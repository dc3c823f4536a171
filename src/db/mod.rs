use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{posts, users};

pub mod migrator;
pub mod repositories;

pub use repositories::user::{hash_password, verify_password};

/// Current UTC timestamp as fixed-width RFC 3339 (microsecond precision,
/// trailing `Z`). Fixed width keeps string comparison equal to chronological
/// comparison, which the posts cursor depends on.
#[must_use]
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());

        if in_memory {
            // Each pooled connection would otherwise get its own database
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// Underlying sqlx pool; shared with the session store.
    #[must_use]
    pub fn sqlite_pool(&self) -> sea_orm::sqlx::SqlitePool {
        self.conn.get_sqlite_connection_pool().clone()
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn post_repo(&self) -> repositories::post::PostRepository {
        repositories::post::PostRepository::new(self.conn.clone())
    }

    fn reset_token_repo(&self) -> repositories::reset_token::ResetTokenRepository {
        repositories::reset_token::ResetTokenRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<users::Model, DbErr> {
        self.user_repo().create(username, email, password_hash).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().find_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        self.user_repo().find_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().find_by_email(email).await
    }

    pub async fn update_user_password(&self, user_id: i32, new_hash: &str) -> Result<()> {
        self.user_repo().update_password(user_id, new_hash).await
    }

    // Posts

    pub async fn create_post(
        &self,
        title: &str,
        text: &str,
        creator_id: i32,
    ) -> Result<posts::Model> {
        self.post_repo().create(title, text, creator_id).await
    }

    pub async fn get_post(&self, id: i32) -> Result<Option<posts::Model>> {
        self.post_repo().find_by_id(id).await
    }

    pub async fn list_posts_page(
        &self,
        fetch: u64,
        cursor: Option<&str>,
    ) -> Result<Vec<posts::Model>> {
        self.post_repo().list_page(fetch, cursor).await
    }

    pub async fn update_post_title(
        &self,
        post: posts::Model,
        title: &str,
    ) -> Result<posts::Model> {
        self.post_repo().update_title(post, title).await
    }

    pub async fn delete_post(&self, id: i32) -> Result<bool> {
        self.post_repo().delete(id).await
    }

    // Reset tokens

    pub async fn store_reset_token(
        &self,
        token_key: &str,
        user_id: i32,
        ttl_hours: i64,
    ) -> Result<()> {
        self.reset_token_repo()
            .insert(token_key, user_id, ttl_hours)
            .await
    }

    pub async fn peek_reset_token(&self, token_key: &str) -> Result<Option<i32>> {
        self.reset_token_repo().peek(token_key).await
    }

    pub async fn delete_reset_token(&self, token_key: &str) -> Result<()> {
        self.reset_token_repo().delete(token_key).await
    }
}
