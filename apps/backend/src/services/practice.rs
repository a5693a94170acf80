//! Practice flow: activation, next-due lookup and attempt submission.
//!
//! Each write is a read-modify-write against one progress row. The row's
//! revision is checked on write; when another request got there first the
//! state is re-read and the scheduler runs again on the fresh snapshot.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use repertoire_core::{check_move_index, select_next_due, Scheduler, SchedulerError};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::catalog::resolve_sequence;

/// Write attempts per request before giving up with a conflict.
pub const MAX_WRITE_ATTEMPTS: usize = 5;

/// Base pause after a lost write; grows linearly with the attempt number.
const RETRY_BASE_DELAY_MS: u64 = 5;
const RETRY_JITTER_MS: u64 = 10;

fn retry_delay(attempt: usize) -> Duration {
    let base = RETRY_BASE_DELAY_MS * attempt as u64;
    Duration::from_millis(base + rand::random_range(0..=RETRY_JITTER_MS))
}

/// Run `write` until it reports success with `Some`, at most
/// [`MAX_WRITE_ATTEMPTS`] times.
///
/// `None` means the row changed under the write. Each retry re-runs the whole
/// closure, so it must re-read the state it schedules from.
pub async fn write_with_retry<T, F, Fut>(item: &TrackableItem, mut write: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        if let Some(written) = write().await? {
            return Ok(written);
        }

        tracing::warn!(%item, attempt, "Progress changed during write, retrying");
        if attempt < MAX_WRITE_ATTEMPTS {
            tokio::time::sleep(retry_delay(attempt)).await;
        }
    }

    Err(ApiError::Conflict(format!("{} is being updated concurrently", item)))
}

/// Activate an item on first use, otherwise flip its active flag.
pub async fn toggle_active(
    db: &Database,
    scheduler: &Scheduler,
    item: TrackableItem,
    now: DateTime<Utc>,
) -> Result<ProgressView> {
    resolve_sequence(db, &item).await?;

    let state = write_with_retry(&item, || async {
        match db.get_progress(&item).await? {
            Some(row) => {
                let state = scheduler.toggle_active(Some(row.to_core_state()?), now);
                Ok::<_, ApiError>(db
                    .update_progress(row.id, row.revision, &state)
                    .await?
                    .then_some(state))
            }
            None => {
                let state = scheduler.toggle_active(None, now);
                Ok::<_, ApiError>(db.insert_progress(&item, &state).await?.then_some(state))
            }
        }
    })
    .await?;

    tracing::info!(%item, is_active = state.is_active, "Toggled practice item");
    Ok(ProgressView { item, state })
}

/// The item to practise next and the moves it drills, if anything is due.
pub async fn next_due(
    db: &Database,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<NextPracticeResponse>> {
    let items = db
        .active_progress_for_user(user_id)
        .await?
        .iter()
        .map(|row| -> Result<(TrackableItem, ProgressState)> {
            Ok((row.item(), row.to_core_state()?))
        })
        .collect::<Result<Vec<_>>>()?;

    let Some(chosen) = select_next_due(&items, now) else {
        return Ok(None);
    };
    let Some((item, state)) = items.iter().find(|entry| &entry.0 == chosen).cloned() else {
        return Ok(None);
    };

    let (opening, line) = resolve_sequence(db, &item).await?;
    let (moves, line_name) = match line {
        Some(line) => (line.moves, Some(line.name)),
        None => (opening.moves.clone(), None),
    };

    Ok(Some(NextPracticeResponse {
        move_index: state.current_move_index,
        progress: ProgressView { item, state },
        opening,
        moves,
        line_name,
    }))
}

/// Record one practice attempt and reschedule the item.
pub async fn submit(
    db: &Database,
    scheduler: &Scheduler,
    user_id: Uuid,
    request: &SubmitPracticeRequest,
    now: DateTime<Utc>,
) -> Result<ProgressView> {
    let item = TrackableItem {
        user_id,
        opening_id: request.opening_id,
        line: LineRef::from_line_id(request.line_id),
    };

    let (opening, line) = resolve_sequence(db, &item).await?;
    let sequence_length = line.map(|l| l.moves.len()).unwrap_or(opening.moves.len());
    check_move_index(request.move_index, sequence_length)?;

    let attempt_record = AttemptRecord {
        user_id,
        opening_id: request.opening_id,
        line: item.line,
        move_index: request.move_index,
        was_correct: request.was_correct,
        time_spent_ms: request.time_spent_ms,
        created_at: now,
    };

    let next = write_with_retry(&item, || async {
        let row = db
            .get_progress(&item)
            .await?
            .ok_or_else(|| SchedulerError::NotFound(item.to_string()))?;

        let current = row.to_core_state()?;
        let next = scheduler.record_attempt(&current, sequence_length, request.was_correct, now)?;

        Ok::<_, ApiError>(db
            .commit_attempt(row.id, row.revision, &next, &attempt_record)
            .await?
            .then_some(next))
    })
    .await?;

    tracing::debug!(
        %item,
        was_correct = request.was_correct,
        interval = next.interval,
        ease_factor = next.ease_factor,
        move_index = next.current_move_index,
        "Scheduled next review"
    );

    Ok(ProgressView { item, state: next })
}

/// Dashboard statistics over the user's progress.
pub async fn stats(db: &Database, user_id: Uuid, now: DateTime<Utc>) -> Result<PracticeStats> {
    let states = db
        .progress_for_user(user_id)
        .await?
        .iter()
        .map(DbProgress::to_core_state)
        .collect::<Result<Vec<_>>>()?;

    Ok(PracticeStats::collect(&states, now))
}
