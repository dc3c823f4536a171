pub mod post;
pub mod reset_token;
pub mod user;
