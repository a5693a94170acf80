//! SQLite database operations

pub mod date_utils;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use date_utils::to_millis;

const PROGRESS_COLUMNS: &str = r#"
    id, user_id, opening_id, line_id, current_move_index, correct_count,
    incorrect_count, ease_factor, interval_days, next_review_at_ms,
    last_review_at_ms, is_active, revision
"#;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) a SQLite database and build the pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        if database_url.contains(":memory:") {
            return Self::connect_in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Private in-memory database; a single connection so every query sees
    /// the same data
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    // === Opening Repository ===

    pub async fn count_openings(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM openings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert an opening with its main line
    pub async fn insert_opening(&self, opening: &Opening) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO openings (id, name, eco, moves, side, description, difficulty,
                                  owner_id, created_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(opening.id)
        .bind(&opening.name)
        .bind(&opening.eco)
        .bind(serde_json::to_string(&opening.moves)?)
        .bind(opening.side.as_str())
        .bind(&opening.description)
        .bind(opening.difficulty.as_str())
        .bind(opening.owner_id)
        .bind(to_millis(chrono::Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_opening(&self, opening_id: Uuid) -> Result<Option<DbOpening>> {
        let opening = sqlx::query_as::<_, DbOpening>(
            r#"
            SELECT id, name, eco, moves, side, description, difficulty, owner_id, created_at_ms
            FROM openings
            WHERE id = ?1
            "#,
        )
        .bind(opening_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(opening)
    }

    /// All openings in insertion order
    pub async fn list_openings(&self) -> Result<Vec<DbOpening>> {
        let openings = sqlx::query_as::<_, DbOpening>(
            r#"
            SELECT id, name, eco, moves, side, description, difficulty, owner_id, created_at_ms
            FROM openings
            ORDER BY created_at_ms, rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(openings)
    }

    // === Line Repository ===

    /// Append a line to an opening, after its existing lines
    pub async fn insert_line(&self, opening_id: Uuid, name: &str, moves: &[String]) -> Result<Line> {
        let mut tx = self.pool.begin().await?;

        let max_order = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT MAX(display_order) FROM lines WHERE opening_id = ?1",
        )
        .bind(opening_id)
        .fetch_one(&mut *tx)
        .await?;

        let line = Line {
            id: Uuid::new_v4(),
            opening_id,
            name: name.to_string(),
            moves: moves.to_vec(),
            order: max_order.unwrap_or(0) as u32 + 1,
        };

        sqlx::query(
            r#"
            INSERT INTO lines (id, opening_id, name, moves, display_order)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(line.id)
        .bind(line.opening_id)
        .bind(&line.name)
        .bind(serde_json::to_string(&line.moves)?)
        .bind(i64::from(line.order))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(line)
    }

    pub async fn get_line(&self, line_id: Uuid) -> Result<Option<DbLine>> {
        let line = sqlx::query_as::<_, DbLine>(
            r#"
            SELECT id, opening_id, name, moves, display_order
            FROM lines
            WHERE id = ?1
            "#,
        )
        .bind(line_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(line)
    }

    /// Lines of one opening in display order
    pub async fn lines_for_opening(&self, opening_id: Uuid) -> Result<Vec<DbLine>> {
        let lines = sqlx::query_as::<_, DbLine>(
            r#"
            SELECT id, opening_id, name, moves, display_order
            FROM lines
            WHERE opening_id = ?1
            ORDER BY display_order
            "#,
        )
        .bind(opening_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Every line, grouped by opening in display order
    pub async fn list_lines(&self) -> Result<Vec<DbLine>> {
        let lines = sqlx::query_as::<_, DbLine>(
            r#"
            SELECT id, opening_id, name, moves, display_order
            FROM lines
            ORDER BY opening_id, display_order
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    // === Progress Repository ===

    /// Progress row for one item, if it was ever activated
    pub async fn get_progress(&self, item: &TrackableItem) -> Result<Option<DbProgress>> {
        let progress = match item.line {
            LineRef::MainLine => {
                sqlx::query_as::<_, DbProgress>(&format!(
                    "SELECT {} FROM user_progress
                     WHERE user_id = ?1 AND opening_id = ?2 AND line_id IS NULL",
                    PROGRESS_COLUMNS
                ))
                .bind(item.user_id)
                .bind(item.opening_id)
                .fetch_optional(&self.pool)
                .await?
            }
            LineRef::Variation(line_id) => {
                sqlx::query_as::<_, DbProgress>(&format!(
                    "SELECT {} FROM user_progress WHERE user_id = ?1 AND line_id = ?2",
                    PROGRESS_COLUMNS
                ))
                .bind(item.user_id)
                .bind(line_id)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(progress)
    }

    /// All progress rows for a user, active or not
    pub async fn progress_for_user(&self, user_id: Uuid) -> Result<Vec<DbProgress>> {
        let rows = sqlx::query_as::<_, DbProgress>(&format!(
            "SELECT {} FROM user_progress WHERE user_id = ?1",
            PROGRESS_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Active progress rows for a user, the input to due selection
    pub async fn active_progress_for_user(&self, user_id: Uuid) -> Result<Vec<DbProgress>> {
        let rows = sqlx::query_as::<_, DbProgress>(&format!(
            "SELECT {} FROM user_progress WHERE user_id = ?1 AND is_active = 1",
            PROGRESS_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert the first progress row for an item.
    ///
    /// Returns false when a row for the item already exists.
    pub async fn insert_progress(&self, item: &TrackableItem, state: &ProgressState) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_progress (id, user_id, opening_id, line_id, current_move_index,
                                       correct_count, incorrect_count, ease_factor, interval_days,
                                       next_review_at_ms, last_review_at_ms, is_active, revision)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(item.user_id)
        .bind(item.opening_id)
        .bind(item.line.line_id())
        .bind(i64::from(state.current_move_index))
        .bind(i64::from(state.correct_count))
        .bind(i64::from(state.incorrect_count))
        .bind(state.ease_factor)
        .bind(i64::from(state.interval))
        .bind(to_millis(state.next_review_date))
        .bind(state.last_review_date.map(to_millis))
        .bind(state.is_active)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Overwrite a progress row if nobody wrote it since `revision` was read.
    ///
    /// Returns false when the revision no longer matches.
    pub async fn update_progress(
        &self,
        progress_id: Uuid,
        revision: i64,
        state: &ProgressState,
    ) -> Result<bool> {
        let result = update_progress_query(progress_id, revision, state)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Store the outcome of an attempt: the new progress and its history
    /// record commit together or not at all.
    ///
    /// Returns false when the progress row changed since `revision` was read.
    pub async fn commit_attempt(
        &self,
        progress_id: Uuid,
        revision: i64,
        state: &ProgressState,
        attempt: &AttemptRecord,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = update_progress_query(progress_id, revision, state)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO practice_history (id, user_id, opening_id, line_id, move_index,
                                          was_correct, time_spent_ms, created_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(attempt.user_id)
        .bind(attempt.opening_id)
        .bind(attempt.line.line_id())
        .bind(i64::from(attempt.move_index))
        .bind(attempt.was_correct)
        .bind(i64::try_from(attempt.time_spent_ms).unwrap_or(i64::MAX))
        .bind(to_millis(attempt.created_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    // === History Repository ===

    /// Attempt history for a user, oldest first
    pub async fn attempts_for_user(&self, user_id: Uuid) -> Result<Vec<DbAttempt>> {
        let attempts = sqlx::query_as::<_, DbAttempt>(
            r#"
            SELECT id, user_id, opening_id, line_id, move_index, was_correct,
                   time_spent_ms, created_at_ms
            FROM practice_history
            WHERE user_id = ?1
            ORDER BY created_at_ms, rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }
}

fn update_progress_query(
    progress_id: Uuid,
    revision: i64,
    state: &ProgressState,
) -> sqlx::query::Query<'static, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'static>> {
    sqlx::query(
        r#"
        UPDATE user_progress
        SET current_move_index = ?1,
            correct_count = ?2,
            incorrect_count = ?3,
            ease_factor = ?4,
            interval_days = ?5,
            next_review_at_ms = ?6,
            last_review_at_ms = ?7,
            is_active = ?8,
            revision = revision + 1
        WHERE id = ?9 AND revision = ?10
        "#,
    )
    .bind(i64::from(state.current_move_index))
    .bind(i64::from(state.correct_count))
    .bind(i64::from(state.incorrect_count))
    .bind(state.ease_factor)
    .bind(i64::from(state.interval))
    .bind(to_millis(state.next_review_date))
    .bind(state.last_review_date.map(to_millis))
    .bind(state.is_active)
    .bind(progress_id)
    .bind(revision)
}
