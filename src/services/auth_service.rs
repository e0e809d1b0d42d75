use crate::models::user::User;
use crate::repositories::{RepositoryError, UserRepository};
use crate::services::user_service::{hash_password, verify_password};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Hash checked against when the username is unknown, so a failed login
/// costs the same whether or not the account exists.
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("runnerbee-dummy-password").ok());

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn authenticate(&self, request: LoginRequest) -> Result<User, AuthServiceError> {
        let user = self
            .user_repository
            .find_by_username(request.username.trim())
            .await?;

        match user {
            Some(user) if verify_password(&request.password, &user.password_hash) => Ok(user),
            Some(user) => {
                tracing::debug!(user_id = user.id, "Login rejected");
                Err(AuthServiceError::InvalidCredentials)
            }
            None => {
                if let Some(dummy) = DUMMY_PASSWORD_HASH.as_deref() {
                    verify_password(&request.password, dummy);
                }
                tracing::debug!("Login rejected");
                Err(AuthServiceError::InvalidCredentials)
            }
        }
    }
}
