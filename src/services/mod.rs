pub mod auth_service;
pub mod auth_service_impl;
pub mod mailer;
pub mod post_service;
pub mod post_service_impl;

pub use auth_service::{AuthError, AuthService, FieldViolation, RegisterInput};
pub use auth_service_impl::SeaOrmAuthService;
pub use mailer::Mailer;
pub use post_service::{PostError, PostPage, PostService};
pub use post_service_impl::SeaOrmPostService;
