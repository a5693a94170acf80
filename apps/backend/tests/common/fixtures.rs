//! Request bodies for practice and progress endpoints.

use serde_json::{json, Value};
use uuid::Uuid;

/// Body for POST /api/progress/toggle on an opening's main line.
pub fn toggle_main_line(opening_id: Uuid) -> Value {
    json!({ "opening_id": opening_id })
}

/// Body for POST /api/progress/toggle on a variation.
pub fn toggle_line(opening_id: Uuid, line_id: Uuid) -> Value {
    json!({ "opening_id": opening_id, "line_id": line_id })
}

/// Body for POST /api/practice/submit.
pub fn submission(
    opening_id: Uuid,
    line_id: Option<Uuid>,
    move_index: u32,
    was_correct: bool,
) -> Value {
    json!({
        "opening_id": opening_id,
        "line_id": line_id,
        "move_index": move_index,
        "was_correct": was_correct,
        "time_spent_ms": 1500,
    })
}
