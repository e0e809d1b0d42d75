use crate::auth::{handlers::INVALID_CSRF_MESSAGE, CurrentUser};
use crate::error::AppError;
use crate::flash::{self, FlashLevel, FlashMessage};
use crate::middleware::csrf::{get_or_create_csrf_token, validate_csrf_form_field};
use crate::models::{run::format_distance, Run, RunForm, RunFormErrors};
use crate::services::RunServiceError;
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

/// Run as shown in lists.
pub struct RunDisplay {
    pub id: i64,
    pub distance: String,
    pub run_time: i64,
    pub calories_burned: i64,
    pub created_at: String,
}

impl From<Run> for RunDisplay {
    fn from(run: Run) -> Self {
        RunDisplay {
            id: run.id,
            distance: format_distance(run.distance),
            run_time: run.run_time,
            calories_burned: run.calories_burned,
            created_at: run.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
struct IndexTemplate {
    username: String,
    runs: Vec<RunDisplay>,
    csrf_token: String,
    flashes: Vec<FlashMessage>,
}

#[derive(Template, WebTemplate)]
#[template(path = "runs/form.html")]
struct RunFormTemplate {
    username: String,
    heading: &'static str,
    action: String,
    form: RunForm,
    errors: RunFormErrors,
    csrf_token: String,
    flashes: Vec<FlashMessage>,
}

/// Run id from the path. Anything that is not an integer is a missing run.
pub struct RunId(pub i64);

impl<S> FromRequestParts<S> for RunId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i64>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| RunId(id))
            .map_err(|_| AppError::RunNotFound)
    }
}

#[derive(Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    csrf_token: String,
}

async fn render_run_form(
    session: &Session,
    user: &CurrentUser,
    heading: &'static str,
    action: String,
    form: RunForm,
    errors: RunFormErrors,
) -> Result<Response, AppError> {
    let template = RunFormTemplate {
        username: user.username.clone(),
        heading,
        action,
        form,
        errors,
        csrf_token: get_or_create_csrf_token(session).await?,
        flashes: flash::take(session).await,
    };
    Ok(template.into_response())
}

/// GET / - the current user's runs, newest first
pub async fn list_runs_page(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let runs = state.run_service.list_runs(user.id).await?;

    Ok(IndexTemplate {
        username: user.username,
        runs: runs.into_iter().map(RunDisplay::from).collect(),
        csrf_token: get_or_create_csrf_token(&session).await?,
        flashes: flash::take(&session).await,
    })
}

/// GET /add
pub async fn new_run_page(session: Session, user: CurrentUser) -> Result<Response, AppError> {
    render_run_form(
        &session,
        &user,
        "Log a run",
        "/add".to_string(),
        RunForm::default(),
        RunFormErrors::default(),
    )
    .await
}

/// POST /add
pub async fn create_run_handler(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    Form(form): Form<RunForm>,
) -> Result<Response, AppError> {
    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        let errors = RunFormErrors::form_error(INVALID_CSRF_MESSAGE);
        return render_run_form(&session, &user, "Log a run", "/add".to_string(), form, errors)
            .await;
    }

    match state.run_service.create_run(user.id, &form).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(RunServiceError::Invalid(errors)) => {
            render_run_form(&session, &user, "Log a run", "/add".to_string(), form, errors).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /edit/{id}
pub async fn edit_run_page(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    RunId(id): RunId,
) -> Result<Response, AppError> {
    let run = state.run_service.get_run(user.id, id).await?;

    render_run_form(
        &session,
        &user,
        "Edit run",
        format!("/edit/{}", id),
        RunForm::from_run(&run),
        RunFormErrors::default(),
    )
    .await
}

/// POST /edit/{id}
pub async fn update_run_handler(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    RunId(id): RunId,
    Form(form): Form<RunForm>,
) -> Result<Response, AppError> {
    // 404 takes precedence over form problems
    state.run_service.get_run(user.id, id).await?;

    let action = format!("/edit/{}", id);

    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        let errors = RunFormErrors::form_error(INVALID_CSRF_MESSAGE);
        return render_run_form(&session, &user, "Edit run", action, form, errors).await;
    }

    match state.run_service.update_run(user.id, id, &form).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(RunServiceError::Invalid(errors)) => {
            render_run_form(&session, &user, "Edit run", action, form, errors).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /delete/{id} - link-style delete, no token
pub async fn delete_run_link(
    State(state): State<AppState>,
    user: CurrentUser,
    RunId(id): RunId,
) -> Result<Response, AppError> {
    state.run_service.delete_run(user.id, id).await?;
    Ok(Redirect::to("/").into_response())
}

/// POST /delete/{id}
pub async fn delete_run_handler(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    RunId(id): RunId,
    Form(form): Form<DeleteForm>,
) -> Result<Response, AppError> {
    if validate_csrf_form_field(&session, &form.csrf_token)
        .await
        .is_err()
    {
        flash::push(&session, FlashLevel::Error, INVALID_CSRF_MESSAGE).await?;
        return Ok(Redirect::to("/").into_response());
    }

    state.run_service.delete_run(user.id, id).await?;
    Ok(Redirect::to("/").into_response())
}

/// GET /index
pub async fn index_redirect() -> Redirect {
    Redirect::to("/")
}
