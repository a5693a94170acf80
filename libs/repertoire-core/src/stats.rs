//! Aggregate practice statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ProgressState;

/// Dashboard numbers over a user's active items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeStats {
    pub active_items: usize,
    pub due_for_review: usize,
    pub total_practiced: u64,
    /// Share of correct attempts in percent, rounded; 0 with no attempts.
    pub accuracy: u32,
}

impl PracticeStats {
    /// Inactive states are skipped.
    pub fn collect<'a, I>(states: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a ProgressState>,
    {
        let mut stats = Self::default();
        let mut correct: u64 = 0;

        for state in states.into_iter().filter(|s| s.is_active) {
            stats.active_items += 1;
            if state.is_due(now) {
                stats.due_for_review += 1;
            }
            correct += u64::from(state.correct_count);
            stats.total_practiced += state.total_attempts();
        }

        if stats.total_practiced > 0 {
            stats.accuracy = (correct as f64 / stats.total_practiced as f64 * 100.0).round() as u32;
        }

        stats
    }
}
