use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::{redirect::login_url_for, SESSION_EMAIL, SESSION_USERNAME, SESSION_USER_ID};

/// The signed-in user for the current request, read from the session.
///
/// Handlers take this instead of digging through the session themselves.
/// Extraction fails with a redirect to the login page when nobody is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl CurrentUser {
    pub async fn from_session(
        session: &Session,
    ) -> Result<Option<Self>, tower_sessions::session::Error> {
        let Some(id) = session.get::<i64>(SESSION_USER_ID).await? else {
            return Ok(None);
        };

        let username = session
            .get::<String>(SESSION_USERNAME)
            .await?
            .unwrap_or_default();
        let email = session
            .get::<String>(SESSION_EMAIL)
            .await?
            .unwrap_or_default();

        Ok(Some(Self {
            id,
            username,
            email,
        }))
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match CurrentUser::from_session(&session).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(Redirect::to(&login_url_for(&parts.uri)).into_response()),
            Err(e) => {
                tracing::error!("Failed to read session: {}", e);
                Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
            }
        }
    }
}
