//! Core library for the opening repertoire trainer.
//!
//! Provides:
//! - The review scheduler (simplified SM-2 with a move-index cursor)
//! - Due-item selection across a user's active lines
//! - Practice statistics for the dashboard
//! - Shared types (TrackableItem, ProgressState, Opening, etc.)

pub mod error;
pub mod scheduler;
pub mod selection;
pub mod stats;
pub mod types;

pub use error::{Result, SchedulerError};
pub use scheduler::{check_move_index, Scheduler};
pub use selection::select_next_due;
pub use stats::PracticeStats;
pub use types::{
    AttemptRecord, Difficulty, Line, LineRef, Opening, ProgressState, Side, TrackableItem,
};
