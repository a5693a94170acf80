//! Next-due selection across a user's active items.

use chrono::{DateTime, Utc};

use crate::types::{ProgressState, TrackableItem};

/// Pick the item to present next: the active item whose review has been due
/// the longest. Equal due dates fall back to item order so repeated calls
/// without an intervening attempt return the same item.
pub fn select_next_due(
    items: &[(TrackableItem, ProgressState)],
    now: DateTime<Utc>,
) -> Option<&TrackableItem> {
    items
        .iter()
        .filter(|entry| entry.1.is_active && entry.1.is_due(now))
        .min_by(|a, b| {
            a.1.next_review_date
                .cmp(&b.1.next_review_date)
                .then_with(|| a.0.cmp(&b.0))
        })
        .map(|entry| &entry.0)
}
