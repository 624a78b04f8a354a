use sqlx::Row;
use study_core::model::{CardId, Grade, ProgressRecord};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Reads an integer counter, mapping NULL, wrong types, negatives and
/// overflow to 0.
fn counter(row: &sqlx::sqlite::SqliteRow, column: &str) -> u32 {
    row.try_get_unchecked::<Option<i64>, _>(column)
        .ok()
        .flatten()
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Reads a millisecond timestamp; negatives and unreadable values become 0.
fn timestamp(row: &sqlx::sqlite::SqliteRow, column: &str) -> i64 {
    row.try_get_unchecked::<Option<i64>, _>(column)
        .ok()
        .flatten()
        .filter(|v| *v >= 0)
        .unwrap_or(0)
}

pub(crate) fn grade_to_str(grade: Option<Grade>) -> Option<&'static str> {
    grade.map(Grade::as_str)
}

/// Unknown grade text reads as "no grade" rather than an error.
pub(crate) fn grade_from_str(value: Option<&str>) -> Option<Grade> {
    value.and_then(|s| s.parse().ok())
}

pub(crate) fn counter_to_i64(v: u32) -> i64 {
    i64::from(v)
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<(CardId, ProgressRecord), StorageError> {
    let id = CardId::new(row.try_get::<String, _>("card_id").map_err(ser)?).map_err(ser)?;

    // Non-finite weights are kept as-is; `get_weight` neutralises them.
    let weight = row
        .try_get_unchecked::<Option<f64>, _>("weight")
        .ok()
        .flatten()
        .unwrap_or(1.0);

    let last_grade: Option<String> = row.try_get_unchecked("last_grade").ok().flatten();

    let record = ProgressRecord {
        weight,
        interval_days: counter(row, "interval_days"),
        streak: counter(row, "streak"),
        fails: counter(row, "fails"),
        pass_count: counter(row, "pass_count"),
        fail_streak: counter(row, "fail_streak"),
        pass_streak: counter(row, "pass_streak"),
        due_at_ms: timestamp(row, "due_at_ms"),
        last_grade: grade_from_str(last_grade.as_deref()),
        last_seen_at_ms: timestamp(row, "last_seen_at_ms"),
    };
    Ok((id, record))
}
