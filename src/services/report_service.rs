use crate::config::ReportScope;
use crate::models::{run::format_distance, RunTotals};
use crate::repositories::{RepositoryError, RunRepository};
use crate::services::email_service::{EmailError, EmailService, OutgoingEmail};
use askama::Template;
use std::sync::Arc;

pub const REPORT_SUBJECT: &str = "Your weekly RunnerBee report";

#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
    #[error("Email error: {0}")]
    Email(#[from] EmailError),
}

/// Who the report goes to.
#[derive(Debug, Clone)]
pub struct ReportRecipient {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Template)]
#[template(path = "emails/weekly_report.html")]
struct WeeklyReportHtml<'a> {
    username: &'a str,
    scope_label: &'a str,
    run_count: i64,
    total_distance: String,
    total_run_time: i64,
    total_calories: i64,
}

#[derive(Template)]
#[template(path = "emails/weekly_report.txt")]
struct WeeklyReportText<'a> {
    username: &'a str,
    scope_label: &'a str,
    run_count: i64,
    total_distance: String,
    total_run_time: i64,
    total_calories: i64,
}

pub struct ReportService {
    runs: Arc<dyn RunRepository>,
    email_service: Arc<dyn EmailService>,
    scope: ReportScope,
    sender: String,
}

impl ReportService {
    pub fn new(
        runs: Arc<dyn RunRepository>,
        email_service: Arc<dyn EmailService>,
        scope: ReportScope,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            runs,
            email_service,
            scope,
            sender: sender.into(),
        }
    }

    pub async fn totals(&self, user_id: i64) -> Result<RunTotals, ReportServiceError> {
        let totals = match self.scope {
            ReportScope::AllRuns => self.runs.totals_all().await?,
            ReportScope::CurrentUser => self.runs.totals_for_user(user_id).await?,
        };
        Ok(totals)
    }

    pub fn compose(
        &self,
        recipient: &ReportRecipient,
        totals: &RunTotals,
    ) -> Result<OutgoingEmail, askama::Error> {
        let scope_label = match self.scope {
            ReportScope::AllRuns => "all runners",
            ReportScope::CurrentUser => "you",
        };
        let total_distance = format_distance(totals.total_distance);

        let html_body = WeeklyReportHtml {
            username: &recipient.username,
            scope_label,
            run_count: totals.run_count,
            total_distance: total_distance.clone(),
            total_run_time: totals.total_run_time,
            total_calories: totals.total_calories,
        }
        .render()?;

        let text_body = WeeklyReportText {
            username: &recipient.username,
            scope_label,
            run_count: totals.run_count,
            total_distance,
            total_run_time: totals.total_run_time,
            total_calories: totals.total_calories,
        }
        .render()?;

        Ok(OutgoingEmail {
            to: recipient.email.clone(),
            from: self.sender.clone(),
            subject: REPORT_SUBJECT.to_string(),
            html_body,
            text_body,
        })
    }

    /// Aggregates the configured scope and mails it to `recipient`. Provider
    /// failures are returned unchanged.
    pub async fn send_weekly_report(
        &self,
        recipient: &ReportRecipient,
    ) -> Result<RunTotals, ReportServiceError> {
        let totals = self.totals(recipient.user_id).await?;
        let email = self.compose(recipient, &totals)?;

        self.email_service.send_email(&email).await?;

        tracing::info!(
            user_id = recipient.user_id,
            provider = self.email_service.provider_name(),
            run_count = totals.run_count,
            "Weekly report sent"
        );
        Ok(totals)
    }
}
