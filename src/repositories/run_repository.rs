use super::RepositoryResult;
use crate::models::{Run, RunInput, RunTotals};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait RunRepository: Send + Sync {
    async fn create(&self, user_id: i64, input: RunInput) -> RepositoryResult<Run>;
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Run>>;
    /// Newest first.
    async fn list_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Run>>;
    /// Overwrites the editable fields. Returns false when no row has `id`.
    async fn update(&self, id: i64, input: RunInput) -> RepositoryResult<bool>;
    /// Returns false when no row has `id`.
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
    async fn totals_for_user(&self, user_id: i64) -> RepositoryResult<RunTotals>;
    async fn totals_all(&self) -> RepositoryResult<RunTotals>;
}

const RUN_COLUMNS: &str = "id, user_id, distance, run_time, calories_burned, created_at";

const TOTALS_SELECT: &str = r#"
    SELECT
        COUNT(*) AS run_count,
        CAST(COALESCE(SUM(distance), 0) AS REAL) AS total_distance,
        CAST(COALESCE(SUM(run_time), 0) AS INTEGER) AS total_run_time,
        CAST(COALESCE(SUM(calories_burned), 0) AS INTEGER) AS total_calories
    FROM runs
"#;

pub struct SqliteRunRepository {
    pool: SqlitePool,
}

impl SqliteRunRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunRepository for SqliteRunRepository {
    async fn create(&self, user_id: i64, input: RunInput) -> RepositoryResult<Run> {
        let run = sqlx::query_as::<_, Run>(&format!(
            r#"
            INSERT INTO runs (user_id, distance, run_time, calories_burned, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {RUN_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(input.distance)
        .bind(input.run_time)
        .bind(input.calories_burned)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(run)
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Run>> {
        let run = sqlx::query_as::<_, Run>(&format!("SELECT {RUN_COLUMNS} FROM runs WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(run)
    }

    async fn list_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Run>> {
        let runs = sqlx::query_as::<_, Run>(&format!(
            r#"
            SELECT {RUN_COLUMNS}
            FROM runs
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(runs)
    }

    async fn update(&self, id: i64, input: RunInput) -> RepositoryResult<bool> {
        let result = sqlx::query(
            "UPDATE runs SET distance = ?, run_time = ?, calories_burned = ? WHERE id = ?",
        )
        .bind(input.distance)
        .bind(input.run_time)
        .bind(input.calories_burned)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM runs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn totals_for_user(&self, user_id: i64) -> RepositoryResult<RunTotals> {
        let totals = sqlx::query_as::<_, RunTotals>(&format!("{TOTALS_SELECT} WHERE user_id = ?"))
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(totals)
    }

    async fn totals_all(&self) -> RepositoryResult<RunTotals> {
        let totals = sqlx::query_as::<_, RunTotals>(TOTALS_SELECT)
            .fetch_one(&self.pool)
            .await?;

        Ok(totals)
    }
}
