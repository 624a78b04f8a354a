use study_core::model::{CardId, ProgressMap, ProgressRecord};

use super::{
    SqliteRepository,
    mapping::{counter_to_i64, grade_to_str, map_progress_row},
};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get(&self, id: &CardId) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    card_id, weight, interval_days, streak, fails, pass_count,
                    fail_streak, pass_streak, due_at_ms, last_grade, last_seen_at_ms
                FROM progress
                WHERE card_id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| map_progress_row(&r).map(|(_, record)| record))
            .transpose()
    }

    async fn set(&self, id: &CardId, record: &ProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO progress (
                card_id, weight, interval_days, streak, fails, pass_count,
                fail_streak, pass_streak, due_at_ms, last_grade, last_seen_at_ms
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(card_id) DO UPDATE SET
                weight = excluded.weight,
                interval_days = excluded.interval_days,
                streak = excluded.streak,
                fails = excluded.fails,
                pass_count = excluded.pass_count,
                fail_streak = excluded.fail_streak,
                pass_streak = excluded.pass_streak,
                due_at_ms = excluded.due_at_ms,
                last_grade = excluded.last_grade,
                last_seen_at_ms = excluded.last_seen_at_ms
            ",
        )
        .bind(id.as_str())
        .bind(record.weight)
        .bind(counter_to_i64(record.interval_days))
        .bind(counter_to_i64(record.streak))
        .bind(counter_to_i64(record.fails))
        .bind(counter_to_i64(record.pass_count))
        .bind(counter_to_i64(record.fail_streak))
        .bind(counter_to_i64(record.pass_streak))
        .bind(record.due_at_ms)
        .bind(grade_to_str(record.last_grade))
        .bind(record.last_seen_at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_all(&self) -> Result<ProgressMap, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    card_id, weight, interval_days, streak, fails, pass_count,
                    fail_streak, pass_streak, due_at_ms, last_grade, last_seen_at_ms
                FROM progress
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = ProgressMap::with_capacity(rows.len());
        for row in rows {
            let (id, record) = map_progress_row(&row)?;
            out.insert(id, record);
        }
        Ok(out)
    }
}
