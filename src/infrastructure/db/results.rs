use crate::domain::error::{AppError, Result};
use crate::domain::result::{AnswerResult, ResultSummary, ResultWrite, RESULT_TYPE, SUMMARY_TYPE};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Answer results and per-execution summaries share one table, told apart
/// by `record_type`. Summary rows carry an empty question id.
pub struct ResultRepository {
    pool: SqlitePool,
}

impl ResultRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::StorageError(format!("Failed to parse results DB URL: {e}"))
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to connect results DB: {e}")))?;

        let repository = Self { pool };
        repository.init_schema().await?;
        info!(database_url, "Results database ready");
        Ok(repository)
    }

    /// Private in-memory database. A single connection keeps every caller on
    /// the same database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::StorageError(format!("Failed to parse results DB URL: {e}")))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to open results DB: {e}")))?;

        let repository = Self { pool };
        repository.init_schema().await?;
        Ok(repository)
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS results (
                execution_id TEXT NOT NULL,
                record_type TEXT NOT NULL CHECK (record_type IN ('result', 'summary')),
                question_id TEXT NOT NULL DEFAULT '',
                event_name TEXT NOT NULL,
                answer TEXT,
                trace_id TEXT,
                score INTEGER,
                total_score INTEGER,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,
                PRIMARY KEY (execution_id, record_type, question_id)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to create results table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_results_event_type_score
             ON results (event_name, record_type, total_score DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to create results index: {e}")))?;

        Ok(())
    }

    /// Appends the answer row and bumps the execution's running total in one
    /// transaction, so a dropped call leaves either both writes or neither.
    ///
    /// A repeated answer to the same question is ignored and does not count
    /// towards the total. A failed summary update is rolled back to a
    /// savepoint, logged and reported as [`ResultWrite::RecordedWithoutSummary`];
    /// the answer row stays.
    pub async fn add_result(
        &self,
        execution_id: &str,
        event_name: &str,
        question_id: &str,
        answer: &str,
        trace_id: &str,
        score: i64,
    ) -> Result<ResultWrite> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to start result transaction: {e}")))?;

        let now = chrono::Utc::now();
        let inserted = sqlx::query(
            "INSERT INTO results (execution_id, record_type, question_id, event_name, answer, trace_id, score, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (execution_id, record_type, question_id) DO NOTHING",
        )
        .bind(execution_id)
        .bind(RESULT_TYPE)
        .bind(question_id)
        .bind(event_name)
        .bind(answer)
        .bind(trace_id)
        .bind(score)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to insert result: {e}")))?;

        if inserted.rows_affected() == 0 {
            warn!(
                execution_id,
                question_id, "Answer already recorded for this question, keeping the first one"
            );
            return Ok(ResultWrite::Duplicate);
        }

        sqlx::query("SAVEPOINT summary_increment")
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to open summary savepoint: {e}")))?;

        let write = match increment_summary(&mut *tx, execution_id, event_name, score).await {
            Ok(()) => ResultWrite::Recorded,
            Err(err) => {
                warn!(
                    execution_id,
                    error = %err,
                    "Couldn't update result summary; it can be rebuilt with recompute_summary"
                );
                sqlx::query("ROLLBACK TO SAVEPOINT summary_increment")
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::StorageError(format!("Failed to roll back summary update: {e}"))
                    })?;
                ResultWrite::RecordedWithoutSummary
            }
        };

        sqlx::query("RELEASE SAVEPOINT summary_increment")
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to release summary savepoint: {e}")))?;
        tx.commit()
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to commit result: {e}")))?;

        debug!(execution_id, question_id, score, write = ?write, "Result recorded");
        Ok(write)
    }

    /// Whether the execution already has an answer for the question.
    pub async fn has_result(&self, execution_id: &str, question_id: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM results WHERE execution_id = ? AND record_type = ? AND question_id = ?",
        )
        .bind(execution_id)
        .bind(RESULT_TYPE)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to look up result: {e}")))?;

        Ok(found.is_some())
    }

    pub async fn get_execution_results(&self, execution_id: &str) -> Result<Vec<AnswerResult>> {
        let rows = sqlx::query_as::<_, AnswerResultEntity>(
            "SELECT execution_id, record_type, event_name, question_id, answer, trace_id, score, created_at
             FROM results WHERE execution_id = ? AND record_type = ?
             ORDER BY created_at ASC, question_id ASC",
        )
        .bind(execution_id)
        .bind(RESULT_TYPE)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to fetch execution results: {e}")))?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    /// Summaries for an event, highest total first.
    pub async fn get_all_results_for_event(&self, event_name: &str) -> Result<Vec<ResultSummary>> {
        let rows = sqlx::query_as::<_, ResultSummaryEntity>(
            "SELECT execution_id, record_type, event_name, total_score, updated_at
             FROM results WHERE event_name = ? AND record_type = ?
             ORDER BY total_score DESC, execution_id ASC",
        )
        .bind(event_name)
        .bind(SUMMARY_TYPE)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to fetch event results: {e}")))?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    pub async fn get_summary(&self, execution_id: &str) -> Result<Option<ResultSummary>> {
        let row = sqlx::query_as::<_, ResultSummaryEntity>(
            "SELECT execution_id, record_type, event_name, total_score, updated_at
             FROM results WHERE execution_id = ? AND record_type = ? AND question_id = ''",
        )
        .bind(execution_id)
        .bind(SUMMARY_TYPE)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to fetch result summary: {e}")))?;

        Ok(row.map(|row| row.into()))
    }

    /// Rebuilds the summary from the execution's result rows.
    pub async fn recompute_summary(&self, execution_id: &str) -> Result<Option<ResultSummary>> {
        let now = chrono::Utc::now();
        sqlx::query(
            "INSERT INTO results (execution_id, record_type, question_id, event_name, total_score, created_at, updated_at)
             SELECT execution_id, ?, '', MIN(event_name), SUM(score), ?, ?
             FROM results WHERE execution_id = ? AND record_type = ?
             GROUP BY execution_id
             ON CONFLICT (execution_id, record_type, question_id) DO UPDATE SET
                total_score = excluded.total_score,
                updated_at = excluded.updated_at",
        )
        .bind(SUMMARY_TYPE)
        .bind(now)
        .bind(now)
        .bind(execution_id)
        .bind(RESULT_TYPE)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to recompute result summary: {e}")))?;

        info!(execution_id, "Result summary recomputed");
        self.get_summary(execution_id).await
    }
}

async fn increment_summary(
    conn: &mut SqliteConnection,
    execution_id: &str,
    event_name: &str,
    score: i64,
) -> Result<()> {
    let now = chrono::Utc::now();
    sqlx::query(
        "INSERT INTO results (execution_id, record_type, question_id, event_name, total_score, created_at, updated_at)
         VALUES (?, ?, '', ?, ?, ?, ?)
         ON CONFLICT (execution_id, record_type, question_id) DO UPDATE SET
            total_score = total_score + excluded.total_score,
            updated_at = excluded.updated_at",
    )
    .bind(execution_id)
    .bind(SUMMARY_TYPE)
    .bind(event_name)
    .bind(score)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::StorageError(format!("Failed to update result summary: {e}")))?;

    Ok(())
}

#[derive(sqlx::FromRow)]
struct AnswerResultEntity {
    execution_id: String,
    record_type: String,
    event_name: String,
    question_id: String,
    answer: Option<String>,
    trace_id: Option<String>,
    score: Option<i64>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AnswerResultEntity> for AnswerResult {
    fn from(e: AnswerResultEntity) -> Self {
        Self {
            execution_id: e.execution_id,
            record_type: e.record_type,
            event_name: e.event_name,
            question_id: e.question_id,
            answer: e.answer.unwrap_or_default(),
            trace_id: e.trace_id.unwrap_or_default(),
            score: e.score.unwrap_or_default(),
            created_at: Some(e.created_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ResultSummaryEntity {
    execution_id: String,
    record_type: String,
    event_name: String,
    total_score: Option<i64>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ResultSummaryEntity> for ResultSummary {
    fn from(e: ResultSummaryEntity) -> Self {
        Self {
            execution_id: e.execution_id,
            record_type: e.record_type,
            event_name: e.event_name,
            total_score: e.total_score.unwrap_or_default(),
            updated_at: Some(e.updated_at),
        }
    }
}
