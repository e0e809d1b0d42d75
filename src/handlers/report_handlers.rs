use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::flash::{self, FlashLevel};
use crate::services::ReportRecipient;
use crate::AppState;
use axum::{extract::State, response::Redirect};
use tower_sessions::Session;

/// GET /report - mails the weekly summary to the signed-in user.
///
/// Provider failures surface as a 500; nothing is retried.
pub async fn send_report_handler(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
) -> Result<Redirect, AppError> {
    let recipient = ReportRecipient {
        user_id: user.id,
        username: user.username,
        email: user.email,
    };

    state.report_service.send_weekly_report(&recipient).await?;

    flash::push(
        &session,
        FlashLevel::Info,
        format!("Weekly report sent to {}", recipient.email),
    )
    .await?;

    Ok(Redirect::to("/dashboard"))
}
