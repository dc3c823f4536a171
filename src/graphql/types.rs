use async_graphql::{ComplexObject, InputObject, SimpleObject};
use tracing::error;

use crate::constants::limits::SNIPPET_LEN;
use crate::entities::{posts, users};
use crate::services::AuthError;

/// A form error tagged with the input field it belongs to, so the client can
/// render it next to the right input.
#[derive(SimpleObject, Debug)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Public view of a user. The password hash never leaves the server.
#[derive(SimpleObject, Debug)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Union-style payload for auth mutations: either a user or a list of form
/// errors, never both.
#[derive(SimpleObject, Debug, Default)]
pub struct UserResponse {
    pub errors: Option<Vec<FieldError>>,
    pub user: Option<User>,
}

impl UserResponse {
    #[must_use]
    pub fn from_user(user: users::Model) -> Self {
        Self {
            errors: None,
            user: Some(user.into()),
        }
    }
}

impl From<AuthError> for UserResponse {
    fn from(err: AuthError) -> Self {
        let errors = match err {
            AuthError::Validation(violations) => violations
                .into_iter()
                .map(|v| FieldError {
                    field: v.field,
                    message: v.message,
                })
                .collect(),
            AuthError::Duplicate => vec![FieldError::new(
                "username",
                "user with this username or email already exists",
            )],
            AuthError::UnknownUser => vec![FieldError::new(
                "usernameOrEmail",
                "that username doesn't exist",
            )],
            AuthError::WrongPassword => vec![FieldError::new("password", "incorrect password")],
            AuthError::TokenExpired => vec![FieldError::new(
                "newPassword",
                "token expired, request a new reset link",
            )],
            AuthError::TokenUserGone => {
                vec![FieldError::new("newPassword", "user no longer exists")]
            }
            AuthError::Database(msg) | AuthError::Internal(msg) => {
                error!(error = %msg, "Auth operation failed");
                vec![FieldError::new(
                    "username",
                    "server error, please try again",
                )]
            }
        };

        Self {
            errors: Some(errors),
            user: None,
        }
    }
}

#[derive(SimpleObject, Debug)]
#[graphql(complex)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub text: String,
    pub creator_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[ComplexObject]
impl Post {
    /// First characters of the body, so the feed never ships full post text.
    async fn text_snippet(&self) -> String {
        self.text.chars().take(SNIPPET_LEN).collect()
    }
}

impl From<posts::Model> for Post {
    fn from(model: posts::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            text: model.text,
            creator_id: model.creator_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// One page of the feed plus a flag telling the client whether to render a
/// "load more" control.
#[derive(SimpleObject, Debug)]
pub struct PaginatedPosts {
    pub posts: Vec<Post>,
    pub has_more: bool,
}

#[derive(InputObject, Debug)]
pub struct UsernamePasswordInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(InputObject, Debug)]
pub struct PostInput {
    pub title: String,
    pub text: String,
}
