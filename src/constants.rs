/// Session cookie name sent to the browser.
pub const COOKIE_NAME: &str = "qid";

/// Key under which the logged-in user id is stored in the session.
pub const SESSION_USER_KEY: &str = "user_id";

pub mod reset {
    /// Namespace prefix for password-reset token keys.
    pub const FORGET_PASSWORD_PREFIX: &str = "forget-password:";

    /// How long a reset token stays redeemable.
    pub const TOKEN_TTL_HOURS: i64 = 24;
}

pub mod limits {
    /// Hard cap on the `posts` query page size.
    pub const MAX_POSTS_PAGE: u64 = 50;

    /// Characters shown in a post's `textSnippet`.
    pub const SNIPPET_LEN: usize = 50;

    pub const MIN_USERNAME_LEN: usize = 3;

    pub const MIN_PASSWORD_LEN: usize = 6;
}
