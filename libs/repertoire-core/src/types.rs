//! Core types for the opening trainer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which move sequence of an opening an item drills.
///
/// Variants order `MainLine` before any `Variation`, which keeps due-selection
/// tie-breaks stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "line_id", rename_all = "snake_case")]
pub enum LineRef {
    MainLine,
    Variation(Uuid),
}

impl LineRef {
    /// Build from a nullable line id, where `None` means the main line.
    pub fn from_line_id(line_id: Option<Uuid>) -> Self {
        match line_id {
            Some(id) => Self::Variation(id),
            None => Self::MainLine,
        }
    }

    /// The line id for storage, `None` for the main line.
    pub fn line_id(self) -> Option<Uuid> {
        match self {
            Self::MainLine => None,
            Self::Variation(id) => Some(id),
        }
    }
}

/// One unit a user can practise: an opening's main line or one variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackableItem {
    pub user_id: Uuid,
    pub opening_id: Uuid,
    pub line: LineRef,
}

impl TrackableItem {
    pub fn main_line(user_id: Uuid, opening_id: Uuid) -> Self {
        Self {
            user_id,
            opening_id,
            line: LineRef::MainLine,
        }
    }

    pub fn variation(user_id: Uuid, opening_id: Uuid, line_id: Uuid) -> Self {
        Self {
            user_id,
            opening_id,
            line: LineRef::Variation(line_id),
        }
    }
}

impl fmt::Display for TrackableItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            LineRef::MainLine => write!(f, "opening {} main line", self.opening_id),
            LineRef::Variation(line_id) => {
                write!(f, "opening {} line {}", self.opening_id, line_id)
            }
        }
    }
}

/// Mastery state of one trackable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    /// How far into the sequence the user has been drilled.
    pub current_move_index: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub ease_factor: f64,
    /// Days until the next review; 0 means due immediately.
    pub interval: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub next_review_date: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_review_date: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl ProgressState {
    /// Whether the item is eligible for review at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date <= now
    }

    pub fn total_attempts(&self) -> u64 {
        u64::from(self.correct_count) + u64::from(self.incorrect_count)
    }
}

/// One submitted practice attempt. Append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub user_id: Uuid,
    pub opening_id: Uuid,
    pub line: LineRef,
    pub move_index: u32,
    pub was_correct: bool,
    pub time_spent_ms: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Side the user plays in an opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "white" => Some(Self::White),
            "black" => Some(Self::Black),
            _ => None,
        }
    }
}

/// Difficulty label of an opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// Opening with its main line in SAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub id: Uuid,
    pub name: String,
    /// ECO classification code, e.g. "C50".
    pub eco: String,
    pub moves: Vec<String>,
    pub side: Side,
    pub description: String,
    pub difficulty: Difficulty,
    /// Owner of a user-created opening. Built-in openings have none, and the
    /// HTTP service never sets one; owned openings come from storage inserts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
}

/// Named variation of an opening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: Uuid,
    pub opening_id: Uuid,
    pub name: String,
    pub moves: Vec<String>,
    /// Display order within the opening, starting at 1.
    pub order: u32,
}
