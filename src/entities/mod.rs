pub mod posts;
pub mod reset_tokens;
pub mod users;

pub mod prelude {
    pub use super::posts::Entity as Posts;
    pub use super::reset_tokens::Entity as ResetTokens;
    pub use super::users::Entity as Users;
}
