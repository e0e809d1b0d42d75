use crate::error::AppError;
use crate::flash::{self, FlashLevel, FlashMessage};
use crate::middleware::csrf::{get_or_create_csrf_token, validate_csrf_form_field};
use crate::services::auth_service::{AuthServiceError, LoginRequest};
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::{Expiry, Session};

use super::{
    redirect::{after_login_target, login_url_with_next, safe_next},
    CurrentUser, SESSION_AUTH_TIMESTAMP, SESSION_EMAIL, SESSION_USERNAME, SESSION_USER_ID,
};
use crate::config::session::REMEMBER_ME_DAYS;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";
pub const INVALID_CSRF_MESSAGE: &str =
    "Invalid security token. Please refresh the page and try again.";

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    csrf_token: String,
    next: String,
    flashes: Vec<FlashMessage>,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    remember_me: Option<String>,
    #[serde(default)]
    csrf_token: String,
    next: Option<String>,
}

/// GET /login
pub async fn login_page(
    session: Session,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    if CurrentUser::from_session(&session).await?.is_some() {
        return Ok(Redirect::to(&after_login_target(query.next.as_deref())).into_response());
    }

    let template = LoginTemplate {
        csrf_token: get_or_create_csrf_token(&session).await?,
        next: query
            .next
            .as_deref()
            .and_then(safe_next)
            .unwrap_or_default()
            .to_string(),
        flashes: flash::take(&session).await,
    };

    Ok(template.into_response())
}

/// POST /login
pub async fn login_handler(
    State(app_state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let retry_url = login_url_with_next(form.next.as_deref());

    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        flash::push(&session, FlashLevel::Error, INVALID_CSRF_MESSAGE).await?;
        return Ok(Redirect::to(&retry_url).into_response());
    }

    let request = LoginRequest {
        username: form.username,
        password: form.password,
    };

    let user = match app_state.auth_service.authenticate(request).await {
        Ok(user) => user,
        Err(AuthServiceError::InvalidCredentials) => {
            flash::push(&session, FlashLevel::Error, INVALID_CREDENTIALS_MESSAGE).await?;
            return Ok(Redirect::to(&retry_url).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    // New id on privilege change
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID, user.id).await?;
    session.insert(SESSION_USERNAME, &user.username).await?;
    session.insert(SESSION_EMAIL, &user.email).await?;
    session
        .insert(SESSION_AUTH_TIMESTAMP, chrono::Utc::now().timestamp())
        .await?;

    if form.remember_me.is_some() {
        session.set_expiry(Some(Expiry::OnInactivity(time::Duration::days(
            REMEMBER_ME_DAYS,
        ))));
    }

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Redirect::to(&after_login_target(form.next.as_deref())).into_response())
}

/// GET /logout
pub async fn logout_handler(session: Session) -> impl IntoResponse {
    if let Err(e) = session.flush().await {
        tracing::warn!("Failed to flush session on logout: {}", e);
    }
    Redirect::to("/login")
}
