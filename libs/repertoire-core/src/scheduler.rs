//! Review scheduler for opening lines.
//!
//! A simplified SM-2 curve: correct answers raise the ease factor and grow the
//! interval 1 → 6 → interval × ease, wrong answers lower the ease and reset the
//! interval so the line is due again at once. Every third cumulative correct
//! answer unlocks the next move of the sequence. Wrong answers never move the
//! cursor back.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, SchedulerError};
use crate::types::ProgressState;

/// Scheduler with configurable parameters.
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub ease_bonus: f64,
    pub ease_penalty: f64,
    /// Interval in days after the first correct answer from a reset state.
    pub first_interval: u32,
    /// Interval in days after the second consecutive correct answer.
    pub second_interval: u32,
    /// Cumulative correct answers per unlocked move.
    pub advance_every: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            ease_bonus: 0.1,
            ease_penalty: 0.2,
            first_interval: 1,
            second_interval: 6,
            advance_every: 3,
        }
    }
}

impl Scheduler {
    /// State for a freshly activated item, due immediately.
    pub fn initial_state(&self, now: DateTime<Utc>) -> ProgressState {
        ProgressState {
            current_move_index: 0,
            correct_count: 0,
            incorrect_count: 0,
            ease_factor: self.initial_ease,
            interval: 0,
            next_review_date: now,
            last_review_date: None,
            is_active: true,
        }
    }

    /// Create the state on first activation, otherwise flip `is_active` only.
    pub fn toggle_active(&self, state: Option<ProgressState>, now: DateTime<Utc>) -> ProgressState {
        match state {
            Some(mut existing) => {
                existing.is_active = !existing.is_active;
                existing
            }
            None => self.initial_state(now),
        }
    }

    /// Apply one practice outcome and return the complete new state.
    pub fn record_attempt(
        &self,
        state: &ProgressState,
        sequence_length: usize,
        was_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<ProgressState> {
        if sequence_length == 0 {
            return Err(SchedulerError::InvalidArgument(
                "sequence length must be at least 1".to_string(),
            ));
        }

        let mut next = state.clone();
        next.last_review_date = Some(now);

        if was_correct {
            // At u32::MAX the count stops and unlocks no further moves
            let counted = state.correct_count.checked_add(1);
            next.correct_count = counted.unwrap_or(state.correct_count);
            next.ease_factor = (state.ease_factor + self.ease_bonus).max(self.minimum_ease);
            next.interval = self.grow_interval(state.interval, next.ease_factor);
            next.next_review_date = add_days(now, next.interval);

            let has_next_move = (state.current_move_index as usize) < sequence_length - 1;
            if has_next_move && counted.is_some_and(|count| self.unlocks_move(count)) {
                next.current_move_index = state.current_move_index + 1;
            }
        } else {
            next.incorrect_count = state.incorrect_count.saturating_add(1);
            next.ease_factor = (state.ease_factor - self.ease_penalty).max(self.minimum_ease);
            next.interval = 0;
            next.next_review_date = now;
        }

        Ok(next)
    }

    fn grow_interval(&self, interval: u32, ease: f64) -> u32 {
        match interval {
            0 => self.first_interval,
            1 => self.second_interval,
            // `as` saturates at u32::MAX
            n => (f64::from(n) * ease).round() as u32,
        }
    }

    fn unlocks_move(&self, correct_count: u32) -> bool {
        correct_count.checked_rem(self.advance_every) == Some(0)
    }
}

/// Reject a move index outside `[0, sequence_length)`.
pub fn check_move_index(move_index: u32, sequence_length: usize) -> Result<()> {
    if sequence_length == 0 {
        return Err(SchedulerError::InvalidArgument(
            "sequence length must be at least 1".to_string(),
        ));
    }
    if move_index as usize >= sequence_length {
        return Err(SchedulerError::InvalidArgument(format!(
            "move index {} outside sequence of length {}",
            move_index, sequence_length
        )));
    }
    Ok(())
}

fn add_days(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
