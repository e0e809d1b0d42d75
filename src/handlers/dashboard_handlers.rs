use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::flash::{self, FlashMessage};
use crate::handlers::run_handlers::RunDisplay;
use crate::models::run::format_distance;
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    username: String,
    email: String,
    run_count: i64,
    total_distance: String,
    total_run_time: i64,
    total_calories: i64,
    runs: Vec<RunDisplay>,
    flashes: Vec<FlashMessage>,
}

/// GET /dashboard - the signed-in user's totals and runs
pub async fn dashboard_handler(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let totals = state.run_service.totals_for_user(user.id).await?;
    let runs = state.run_service.list_runs(user.id).await?;

    Ok(DashboardTemplate {
        username: user.username,
        email: user.email,
        run_count: totals.run_count,
        total_distance: format_distance(totals.total_distance),
        total_run_time: totals.total_run_time,
        total_calories: totals.total_calories,
        runs: runs.into_iter().map(RunDisplay::from).collect(),
        flashes: flash::take(&session).await,
    })
}
