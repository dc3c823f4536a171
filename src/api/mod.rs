use anyhow::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, header},
    response::{Html, IntoResponse},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, Session, SessionManagerLayer, cookie::SameSite};
use tower_sessions_sqlx_store::SqliteStore;

use crate::constants::COOKIE_NAME;
use crate::graphql::{AppSchema, build_schema};
use crate::state::SharedState;

/// The per-request [`Session`] rides along as schema context data so
/// resolvers can log users in and out.
async fn graphql_handler(
    State(schema): State<AppSchema>,
    session: Session,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner().data(session)).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

pub async fn router(state: SharedState) -> anyhow::Result<Router> {
    // Sessions live in the same SQLite database as the app data
    let session_store = SqliteStore::new(state.store.sqlite_pool());
    session_store
        .migrate()
        .await
        .context("Failed to migrate session store")?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_name(COOKIE_NAME)
        .with_secure(state.config.server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(
            state.config.server.session_ttl_days,
        )));

    let frontend_origin: HeaderValue = state
        .config
        .server
        .frontend_url
        .parse()
        .context("Invalid frontend URL for CORS")?;

    // Credentialed CORS forbids wildcards, so everything is explicit
    let cors_layer = CorsLayer::new()
        .allow_origin(frontend_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let schema = build_schema(state);

    Ok(Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .with_state(schema)
        .layer(session_layer)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http()))
}
