//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::date_utils::{from_millis, from_millis_opt};
use crate::error::{ApiError, Result};

// Re-export shared types from repertoire-core
pub use repertoire_core::types::{
    AttemptRecord, Difficulty, Line, LineRef, Opening, ProgressState, Side, TrackableItem,
};
pub use repertoire_core::PracticeStats;

// === Database Entity Types ===

/// Opening stored in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct DbOpening {
    pub id: Uuid,
    pub name: String,
    pub eco: String,
    pub moves: String,
    pub side: String,
    pub description: String,
    pub difficulty: String,
    pub owner_id: Option<Uuid>,
    pub created_at_ms: i64,
}

impl DbOpening {
    /// Convert to core Opening
    pub fn to_core(&self) -> Result<Opening> {
        Ok(Opening {
            id: self.id,
            name: self.name.clone(),
            eco: self.eco.clone(),
            moves: serde_json::from_str(&self.moves)?,
            side: Side::from_str(&self.side)
                .ok_or_else(|| ApiError::Internal(format!("unknown side '{}'", self.side)))?,
            description: self.description.clone(),
            difficulty: Difficulty::from_str(&self.difficulty).ok_or_else(|| {
                ApiError::Internal(format!("unknown difficulty '{}'", self.difficulty))
            })?,
            owner_id: self.owner_id,
        })
    }
}

/// Variation line stored in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct DbLine {
    pub id: Uuid,
    pub opening_id: Uuid,
    pub name: String,
    pub moves: String,
    pub display_order: i64,
}

impl DbLine {
    /// Convert to core Line
    pub fn to_core(&self) -> Result<Line> {
        Ok(Line {
            id: self.id,
            opening_id: self.opening_id,
            name: self.name.clone(),
            moves: serde_json::from_str(&self.moves)?,
            order: self.display_order as u32,
        })
    }
}

/// Progress row; `revision` guards read-modify-write cycles
#[derive(Debug, Clone, FromRow)]
pub struct DbProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub opening_id: Uuid,
    pub line_id: Option<Uuid>,
    pub current_move_index: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub ease_factor: f64,
    pub interval_days: i64,
    pub next_review_at_ms: i64,
    pub last_review_at_ms: Option<i64>,
    pub is_active: bool,
    pub revision: i64,
}

impl DbProgress {
    pub fn item(&self) -> TrackableItem {
        TrackableItem {
            user_id: self.user_id,
            opening_id: self.opening_id,
            line: LineRef::from_line_id(self.line_id),
        }
    }

    /// Convert to core ProgressState
    pub fn to_core_state(&self) -> Result<ProgressState> {
        Ok(ProgressState {
            current_move_index: self.current_move_index as u32,
            correct_count: self.correct_count as u32,
            incorrect_count: self.incorrect_count as u32,
            ease_factor: self.ease_factor,
            interval: self.interval_days as u32,
            next_review_date: from_millis(self.next_review_at_ms)?,
            last_review_date: from_millis_opt(self.last_review_at_ms)?,
            is_active: self.is_active,
        })
    }
}

/// Attempt history row
#[derive(Debug, Clone, FromRow)]
pub struct DbAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub opening_id: Uuid,
    pub line_id: Option<Uuid>,
    pub move_index: i64,
    pub was_correct: bool,
    pub time_spent_ms: i64,
    pub created_at_ms: i64,
}

impl DbAttempt {
    /// Convert to core AttemptRecord
    pub fn to_core(&self) -> Result<AttemptRecord> {
        Ok(AttemptRecord {
            user_id: self.user_id,
            opening_id: self.opening_id,
            line: LineRef::from_line_id(self.line_id),
            move_index: self.move_index as u32,
            was_correct: self.was_correct,
            time_spent_ms: self.time_spent_ms as u64,
            created_at: from_millis(self.created_at_ms)?,
        })
    }
}

// === API Request/Response Types ===

/// Progress of one item as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressView {
    pub item: TrackableItem,
    #[serde(flatten)]
    pub state: ProgressState,
}

// Catalogue types
#[derive(Debug, Serialize, Deserialize)]
pub struct SeedResponse {
    pub inserted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LineOverview {
    #[serde(flatten)]
    pub line: Line,
    pub is_active: bool,
    pub current_move_index: u32,
    pub total_moves: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpeningOverview {
    #[serde(flatten)]
    pub opening: Opening,
    pub lines: Vec<LineOverview>,
    pub is_active: bool,
    pub current_move_index: u32,
    pub total_moves: usize,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub next_review_date: Option<DateTime<Utc>>,
    pub is_user_created: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpeningDetail {
    #[serde(flatten)]
    pub opening: Opening,
    pub lines: Vec<Line>,
}

// Progress types
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleActiveRequest {
    pub opening_id: Uuid,
    pub line_id: Option<Uuid>,
}

// Practice types
#[derive(Debug, Serialize, Deserialize)]
pub struct NextPracticeResponse {
    pub opening: Opening,
    pub progress: ProgressView,
    pub move_index: u32,
    /// Moves being drilled: the variation's when practising a line
    pub moves: Vec<String>,
    pub line_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitPracticeRequest {
    pub opening_id: Uuid,
    pub line_id: Option<Uuid>,
    pub move_index: u32,
    pub was_correct: bool,
    pub time_spent_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitPracticeResponse {
    pub progress: ProgressView,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress_row() -> DbProgress {
        DbProgress {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            opening_id: Uuid::new_v4(),
            line_id: None,
            current_move_index: 2,
            correct_count: 7,
            incorrect_count: 1,
            ease_factor: 2.4,
            interval_days: 6,
            next_review_at_ms: 1_700_000_000_000,
            last_review_at_ms: Some(1_699_000_000_000),
            is_active: true,
            revision: 3,
        }
    }

    #[test]
    fn test_progress_row_to_core() {
        let row = progress_row();
        let state = row.to_core_state().unwrap();
        assert_eq!(state.current_move_index, 2);
        assert_eq!(state.interval, 6);
        assert_eq!(state.next_review_date.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(
            state.last_review_date.map(|d| d.timestamp_millis()),
            Some(1_699_000_000_000)
        );
        assert_eq!(row.item().line, LineRef::MainLine);
    }

    #[test]
    fn test_progress_row_variation_item() {
        let line_id = Uuid::new_v4();
        let row = DbProgress {
            line_id: Some(line_id),
            ..progress_row()
        };
        assert_eq!(row.item().line, LineRef::Variation(line_id));
    }

    #[test]
    fn test_opening_with_bad_side() {
        let row = DbOpening {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            eco: "A00".to_string(),
            moves: r#"["e4"]"#.to_string(),
            side: "green".to_string(),
            description: String::new(),
            difficulty: "beginner".to_string(),
            owner_id: None,
            created_at_ms: 0,
        };
        assert!(matches!(row.to_core(), Err(ApiError::Internal(_))));
    }

    #[test]
    fn test_line_moves_parse() {
        let row = DbLine {
            id: Uuid::new_v4(),
            opening_id: Uuid::new_v4(),
            name: "Evans Gambit".to_string(),
            moves: r#"["e4","e5","Nf3","Nc6","Bc4","Bc5","b4"]"#.to_string(),
            display_order: 1,
        };
        let line = row.to_core().unwrap();
        assert_eq!(line.moves.len(), 7);
        assert_eq!(line.order, 1);
    }
}
