use crate::config::RunAccessPolicy;
use crate::models::{Run, RunForm, RunFormErrors, RunTotals};
use crate::repositories::{RepositoryError, RunRepository};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RunServiceError {
    #[error("Run not found")]
    NotFound,
    #[error("Invalid run form")]
    Invalid(RunFormErrors),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct RunService {
    repository: Arc<dyn RunRepository>,
    access: RunAccessPolicy,
}

impl RunService {
    pub fn new(repository: Arc<dyn RunRepository>, access: RunAccessPolicy) -> Self {
        Self { repository, access }
    }

    /// Runs owned by `user_id`, newest first.
    pub async fn list_runs(&self, user_id: i64) -> Result<Vec<Run>, RunServiceError> {
        Ok(self.repository.list_by_user(user_id).await?)
    }

    pub async fn create_run(&self, user_id: i64, form: &RunForm) -> Result<Run, RunServiceError> {
        let input = form.validate().map_err(RunServiceError::Invalid)?;
        let run = self.repository.create(user_id, input).await?;
        tracing::info!(run_id = run.id, user_id, "Run created");
        Ok(run)
    }

    /// Loads a run for editing on behalf of `user_id`.
    pub async fn get_run(&self, user_id: i64, id: i64) -> Result<Run, RunServiceError> {
        let run = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(RunServiceError::NotFound)?;

        if !self.may_modify(user_id, &run) {
            tracing::warn!(run_id = id, user_id, "Run belongs to another user");
            return Err(RunServiceError::NotFound);
        }

        Ok(run)
    }

    /// Overwrites distance, duration and calories in place. Nothing is
    /// written when the form is invalid.
    pub async fn update_run(
        &self,
        user_id: i64,
        id: i64,
        form: &RunForm,
    ) -> Result<Run, RunServiceError> {
        let run = self.get_run(user_id, id).await?;
        let input = form.validate().map_err(RunServiceError::Invalid)?;

        if !self.repository.update(id, input).await? {
            return Err(RunServiceError::NotFound);
        }

        tracing::info!(run_id = id, user_id, "Run updated");
        Ok(Run {
            distance: input.distance,
            run_time: input.run_time,
            calories_burned: input.calories_burned,
            ..run
        })
    }

    /// Deletes by id. Unknown ids, and under the owner-only policy runs of
    /// other users, are a no-op. Returns whether a row was removed.
    pub async fn delete_run(&self, user_id: i64, id: i64) -> Result<bool, RunServiceError> {
        if self.access == RunAccessPolicy::OwnerOnly {
            match self.repository.get_by_id(id).await? {
                Some(run) if self.may_modify(user_id, &run) => {}
                _ => return Ok(false),
            }
        }

        let deleted = self.repository.delete(id).await?;
        if deleted {
            tracing::info!(run_id = id, user_id, "Run deleted");
        }
        Ok(deleted)
    }

    pub async fn totals_for_user(&self, user_id: i64) -> Result<RunTotals, RunServiceError> {
        Ok(self.repository.totals_for_user(user_id).await?)
    }

    fn may_modify(&self, user_id: i64, run: &Run) -> bool {
        match self.access {
            RunAccessPolicy::Shared => true,
            RunAccessPolicy::OwnerOnly => run.user_id == Some(user_id),
        }
    }
}
