//! Conversions between chrono timestamps and the millisecond columns.

use chrono::{DateTime, Utc};

use crate::error::{ApiError, Result};

/// Milliseconds since the Unix epoch, as stored in `*_ms` columns.
pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Read a `*_ms` column back into a timestamp.
pub fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| ApiError::Internal(format!("timestamp out of range: {}", ms)))
}

pub fn from_millis_opt(ms: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    ms.map(from_millis).transpose()
}
