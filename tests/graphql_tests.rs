use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use lireddit::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;
    // keep the tests fast
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = lireddit::SharedState::new(config)
        .await
        .expect("Failed to create app state");
    lireddit::api::router(state)
        .await
        .expect("Failed to build router")
}

/// Posts a GraphQL request, returning the response body and the session
/// cookie if the server set one.
async fn graphql(
    app: &Router,
    query: &str,
    variables: Value,
    cookie: Option<&str>,
) -> (Value, Option<String>) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie.to_string());
    }

    let body = json!({ "query": query, "variables": variables }).to_string();

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(ToString::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    (json, set_cookie)
}

const REGISTER: &str = r"
mutation Register($options: UsernamePasswordInput!) {
  register(options: $options) {
    errors { field message }
    user { id username email }
  }
}";

const LOGIN: &str = r"
mutation Login($usernameOrEmail: String!, $password: String!) {
  login(usernameOrEmail: $usernameOrEmail, password: $password) {
    errors { field message }
    user { id username }
  }
}";

const ME: &str = "{ me { id username } }";

const CREATE_POST: &str = r"
mutation CreatePost($input: PostInput!) {
  createPost(input: $input) { id title text textSnippet creatorId }
}";

const POSTS: &str = r"
query Posts($limit: Int!, $cursor: String) {
  posts(limit: $limit, cursor: $cursor) {
    hasMore
    posts { id title createdAt textSnippet }
  }
}";

const UPDATE_POST: &str = r"
mutation UpdatePost($id: Int!, $title: String) {
  updatePost(id: $id, title: $title) { id title }
}";

const DELETE_POST: &str = r"
mutation DeletePost($id: Int!) {
  deletePost(id: $id)
}";

const LOGOUT: &str = "mutation { logout }";

async fn register(app: &Router, username: &str, email: &str) -> (Value, Option<String>) {
    graphql(
        app,
        REGISTER,
        json!({ "options": { "username": username, "email": email, "password": "secret123" } }),
        None,
    )
    .await
}

async fn create_post(app: &Router, cookie: &str, title: &str, text: &str) -> i64 {
    let (body, _) = graphql(
        app,
        CREATE_POST,
        json!({ "input": { "title": title, "text": text } }),
        Some(cookie),
    )
    .await;
    body["data"]["createPost"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn register_logs_user_in() {
    let app = spawn_app().await;

    let (body, cookie) = register(&app, "ben", "ben@example.com").await;

    assert!(body["data"]["register"]["errors"].is_null());
    assert_eq!(body["data"]["register"]["user"]["username"], "ben");
    let cookie = cookie.expect("register should set a session cookie");
    assert!(cookie.starts_with("qid="));

    let (body, _) = graphql(&app, ME, json!({}), Some(&cookie)).await;
    assert_eq!(body["data"]["me"]["username"], "ben");
}

#[tokio::test]
async fn me_is_null_without_session() {
    let app = spawn_app().await;

    let (body, _) = graphql(&app, ME, json!({}), None).await;
    assert!(body["data"]["me"].is_null());
}

#[tokio::test]
async fn register_rejects_duplicates() {
    let app = spawn_app().await;

    register(&app, "ben", "ben@example.com").await;
    let (body, _) = register(&app, "ben", "other@example.com").await;

    let errors = &body["data"]["register"]["errors"];
    assert_eq!(errors[0]["field"], "username");
    assert!(body["data"]["register"]["user"].is_null());
}

#[tokio::test]
async fn register_validates_the_form() {
    let app = spawn_app().await;

    let (body, _) = graphql(
        &app,
        REGISTER,
        json!({ "options": { "username": "ab", "email": "not-an-email", "password": "123" } }),
        None,
    )
    .await;

    let errors = body["data"]["register"]["errors"].as_array().unwrap();
    let fields: Vec<&str> = errors.iter().map(|e| e["field"].as_str().unwrap()).collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"username"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn login_by_username_or_email() {
    let app = spawn_app().await;
    register(&app, "ben", "ben@example.com").await;

    let (body, cookie) = graphql(
        &app,
        LOGIN,
        json!({ "usernameOrEmail": "ben", "password": "secret123" }),
        None,
    )
    .await;
    assert_eq!(body["data"]["login"]["user"]["username"], "ben");
    assert!(cookie.is_some());

    let (body, _) = graphql(
        &app,
        LOGIN,
        json!({ "usernameOrEmail": "ben@example.com", "password": "secret123" }),
        None,
    )
    .await;
    assert_eq!(body["data"]["login"]["user"]["username"], "ben");
}

#[tokio::test]
async fn login_reports_tagged_errors() {
    let app = spawn_app().await;
    register(&app, "ben", "ben@example.com").await;

    let (body, _) = graphql(
        &app,
        LOGIN,
        json!({ "usernameOrEmail": "nobody", "password": "secret123" }),
        None,
    )
    .await;
    assert_eq!(
        body["data"]["login"]["errors"][0]["field"],
        "usernameOrEmail"
    );

    let (body, _) = graphql(
        &app,
        LOGIN,
        json!({ "usernameOrEmail": "ben", "password": "wrong-password" }),
        None,
    )
    .await;
    assert_eq!(body["data"]["login"]["errors"][0]["field"], "password");
}

#[tokio::test]
async fn logout_destroys_the_session() {
    let app = spawn_app().await;
    let (_, cookie) = register(&app, "ben", "ben@example.com").await;
    let cookie = cookie.unwrap();

    let (body, _) = graphql(&app, LOGOUT, json!({}), Some(&cookie)).await;
    assert_eq!(body["data"]["logout"], true);

    let (body, _) = graphql(&app, ME, json!({}), Some(&cookie)).await;
    assert!(body["data"]["me"].is_null());
}

#[tokio::test]
async fn create_post_requires_login() {
    let app = spawn_app().await;

    let (body, _) = graphql(
        &app,
        CREATE_POST,
        json!({ "input": { "title": "hello", "text": "world" } }),
        None,
    )
    .await;

    assert_eq!(body["errors"][0]["message"], "Not authenticated");
}

#[tokio::test]
async fn create_post_sets_the_creator() {
    let app = spawn_app().await;
    let (body, cookie) = register(&app, "ben", "ben@example.com").await;
    let user_id = body["data"]["register"]["user"]["id"].as_i64().unwrap();
    let cookie = cookie.unwrap();

    let (body, _) = graphql(
        &app,
        CREATE_POST,
        json!({ "input": { "title": "hello", "text": "world" } }),
        Some(&cookie),
    )
    .await;

    let post = &body["data"]["createPost"];
    assert_eq!(post["title"], "hello");
    assert_eq!(post["creatorId"].as_i64().unwrap(), user_id);
}

#[tokio::test]
async fn text_snippet_truncates_long_bodies() {
    let app = spawn_app().await;
    let (_, cookie) = register(&app, "ben", "ben@example.com").await;
    let cookie = cookie.unwrap();

    let long_text = "x".repeat(200);
    let (body, _) = graphql(
        &app,
        CREATE_POST,
        json!({ "input": { "title": "long", "text": long_text } }),
        Some(&cookie),
    )
    .await;

    let snippet = body["data"]["createPost"]["textSnippet"].as_str().unwrap();
    assert_eq!(snippet.len(), 50);
}

#[tokio::test]
async fn posts_paginate_newest_first() {
    let app = spawn_app().await;
    let (_, cookie) = register(&app, "ben", "ben@example.com").await;
    let cookie = cookie.unwrap();

    for i in 1..=3 {
        create_post(&app, &cookie, &format!("post {i}"), "body").await;
    }

    let (body, _) = graphql(&app, POSTS, json!({ "limit": 2 }), None).await;
    let page = &body["data"]["posts"];
    assert_eq!(page["hasMore"], true);

    let posts = page["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["title"], "post 3");
    assert_eq!(posts[1]["title"], "post 2");

    let cursor = posts[1]["createdAt"].as_str().unwrap();
    let (body, _) = graphql(&app, POSTS, json!({ "limit": 2, "cursor": cursor }), None).await;
    let page = &body["data"]["posts"];
    assert_eq!(page["hasMore"], false);

    let posts = page["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "post 1");
}

#[tokio::test]
async fn single_post_lookup() {
    let app = spawn_app().await;
    let (_, cookie) = register(&app, "ben", "ben@example.com").await;
    let cookie = cookie.unwrap();
    let id = create_post(&app, &cookie, "hello", "world").await;

    let query = "query Post($id: Int!) { post(id: $id) { id title } }";

    let (body, _) = graphql(&app, query, json!({ "id": id }), None).await;
    assert_eq!(body["data"]["post"]["title"], "hello");

    let (body, _) = graphql(&app, query, json!({ "id": 999_999 }), None).await;
    assert!(body["data"]["post"].is_null());
}

#[tokio::test]
async fn update_post_changes_own_title() {
    let app = spawn_app().await;
    let (_, cookie) = register(&app, "ben", "ben@example.com").await;
    let cookie = cookie.unwrap();
    let id = create_post(&app, &cookie, "before", "body").await;

    let (body, _) = graphql(
        &app,
        UPDATE_POST,
        json!({ "id": id, "title": "after" }),
        Some(&cookie),
    )
    .await;

    assert_eq!(body["data"]["updatePost"]["title"], "after");
}

#[tokio::test]
async fn only_the_creator_may_update_or_delete() {
    let app = spawn_app().await;

    let (_, owner_cookie) = register(&app, "owner", "owner@example.com").await;
    let owner_cookie = owner_cookie.unwrap();
    let id = create_post(&app, &owner_cookie, "mine", "body").await;

    let (_, intruder_cookie) = register(&app, "intruder", "intruder@example.com").await;
    let intruder_cookie = intruder_cookie.unwrap();

    let (body, _) = graphql(
        &app,
        UPDATE_POST,
        json!({ "id": id, "title": "stolen" }),
        Some(&intruder_cookie),
    )
    .await;
    assert_eq!(body["errors"][0]["message"], "not authorized");

    let (body, _) = graphql(&app, DELETE_POST, json!({ "id": id }), Some(&intruder_cookie)).await;
    assert_eq!(body["errors"][0]["message"], "not authorized");

    // Still there, untouched
    let (body, _) = graphql(&app, POSTS, json!({ "limit": 10 }), None).await;
    assert_eq!(body["data"]["posts"]["posts"][0]["title"], "mine");
}

#[tokio::test]
async fn delete_post_removes_own_post() {
    let app = spawn_app().await;
    let (_, cookie) = register(&app, "ben", "ben@example.com").await;
    let cookie = cookie.unwrap();
    let id = create_post(&app, &cookie, "doomed", "body").await;

    let (body, _) = graphql(&app, DELETE_POST, json!({ "id": id }), Some(&cookie)).await;
    assert_eq!(body["data"]["deletePost"], true);

    let (body, _) = graphql(&app, DELETE_POST, json!({ "id": id }), Some(&cookie)).await;
    assert_eq!(body["data"]["deletePost"], false);
}

#[tokio::test]
async fn forgot_password_never_leaks_registration() {
    let app = spawn_app().await;
    register(&app, "ben", "ben@example.com").await;

    let query = "mutation Forgot($email: String!) { forgotPassword(email: $email) }";

    let (body, _) = graphql(&app, query, json!({ "email": "ben@example.com" }), None).await;
    assert_eq!(body["data"]["forgotPassword"], true);

    let (body, _) = graphql(&app, query, json!({ "email": "nobody@example.com" }), None).await;
    assert_eq!(body["data"]["forgotPassword"], true);
}

#[tokio::test]
async fn graphiql_is_served() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/graphql")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
