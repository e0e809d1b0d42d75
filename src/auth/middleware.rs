use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::{redirect::login_url_for, SESSION_USER_ID};

/// Sends anonymous visitors to the login page, remembering where they were going.
pub async fn require_auth(session: Session, request: Request, next: Next) -> Response {
    if let Ok(Some(_user_id)) = session.get::<i64>(SESSION_USER_ID).await {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), "Anonymous request redirected to login");
        Redirect::to(&login_url_for(request.uri())).into_response()
    }
}
