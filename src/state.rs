use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, Mailer, PostService, SeaOrmAuthService, SeaOrmPostService,
};

/// Everything resolvers need, built once at startup and shared via the
/// schema's context data.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub mailer: Arc<Mailer>,

    pub auth: Arc<dyn AuthService>,

    pub posts: Arc<dyn PostService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let mailer = Arc::new(Mailer::new(&config.smtp, &config.server.frontend_url)?);

        let auth: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            mailer.clone(),
            config.security.clone(),
        ));

        let posts: Arc<dyn PostService> = Arc::new(SeaOrmPostService::new(store.clone()));

        Ok(Self {
            config,
            store,
            mailer,
            auth,
            posts,
        })
    }
}
