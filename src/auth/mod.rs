pub mod current_user;
pub mod handlers;
pub mod middleware;
pub mod redirect;

pub use current_user::CurrentUser;

pub const SESSION_USER_ID: &str = "user_id";
pub const SESSION_USERNAME: &str = "username";
pub const SESSION_EMAIL: &str = "email";
pub const SESSION_AUTH_TIMESTAMP: &str = "auth_timestamp";
