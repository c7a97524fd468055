use playtest_core::model::{QuestionId, QuestionStats, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_stats_row};
use crate::repository::{AttemptRecord, AttemptRepository, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn record_attempt(&self, attempt: &AttemptRecord) -> Result<QuestionStats, StorageError> {
        let user_id = id_i64("user_id", attempt.user_id.value())?;
        let question_id = id_i64("question_id", attempt.question_id.value())?;

        let mut tx = self.pool.begin().await.map_err(conn)?;

        let exists = sqlx::query("SELECT 1 FROM questions WHERE id = ?1")
            .bind(question_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        sqlx::query(
            r"
            INSERT INTO question_attempts (user_id, question_id, answer, correct, answered_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(user_id)
        .bind(question_id)
        .bind(attempt.answer.as_str())
        .bind(attempt.correct)
        .bind(attempt.answered_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        let current = sqlx::query(
            r"
            SELECT attempts_total, correct_total, accuracy_percent
            FROM question_stats
            WHERE user_id = ?1 AND question_id = ?2
            ",
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?;

        let mut stats = match current {
            Some(row) => map_stats_row(&row)?,
            None => QuestionStats::unattempted(),
        };
        stats.record_attempt(attempt.correct);

        sqlx::query(
            r"
            INSERT INTO question_stats (
                user_id, question_id, attempts_total, correct_total,
                accuracy_percent, last_answer_correct, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id, question_id) DO UPDATE SET
                attempts_total = excluded.attempts_total,
                correct_total = excluded.correct_total,
                accuracy_percent = excluded.accuracy_percent,
                last_answer_correct = excluded.last_answer_correct,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(question_id)
        .bind(i64::from(stats.attempts_total()))
        .bind(i64::from(stats.correct_total()))
        .bind(stats.accuracy_percent())
        .bind(attempt.correct)
        .bind(attempt.answered_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(stats)
    }

    async fn question_stats(
        &self,
        user_id: UserId,
        question_id: QuestionId,
    ) -> Result<QuestionStats, StorageError> {
        let row = sqlx::query(
            r"
            SELECT attempts_total, correct_total, accuracy_percent
            FROM question_stats
            WHERE user_id = ?1 AND question_id = ?2
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .bind(id_i64("question_id", question_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        match row {
            Some(row) => map_stats_row(&row),
            None => Ok(QuestionStats::unattempted()),
        }
    }
}
