use playtest_core::model::{BlockId, Question, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_question_row, ser};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let content = question.content();
        let options = content.options();
        sqlx::query(
            r"
            INSERT INTO questions (
                id, block_id, topic_id, question_text,
                option_a, option_b, option_c, option_d,
                correct_answer, explanation
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                block_id = excluded.block_id,
                topic_id = excluded.topic_id,
                question_text = excluded.question_text,
                option_a = excluded.option_a,
                option_b = excluded.option_b,
                option_c = excluded.option_c,
                option_d = excluded.option_d,
                correct_answer = excluded.correct_answer,
                explanation = excluded.explanation
            ",
        )
        .bind(id_i64("question_id", question.id().value())?)
        .bind(id_i64("block_id", question.block_id().value())?)
        .bind(
            question
                .topic_id()
                .map(|t| id_i64("topic_id", t.value()))
                .transpose()?,
        )
        .bind(content.text())
        .bind(options[0].as_str())
        .bind(options[1].as_str())
        .bind(options[2].as_str())
        .bind(options[3].as_str())
        .bind(content.correct().as_str())
        .bind(content.explanation())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn questions_for_block(
        &self,
        user_id: UserId,
        block_id: BlockId,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                q.id, q.block_id, q.topic_id, q.question_text,
                q.option_a, q.option_b, q.option_c, q.option_d,
                q.correct_answer, q.explanation,
                s.attempts_total, s.correct_total, s.accuracy_percent
            FROM questions q
            LEFT JOIN question_stats s
                ON s.question_id = q.id AND s.user_id = ?1
            WHERE q.block_id = ?2
            ORDER BY q.id
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .bind(id_i64("block_id", block_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_question_row(&row)?);
        }
        Ok(out)
    }

    async fn count_block_questions(&self, block_id: BlockId) -> Result<u32, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE block_id = ?1")
            .bind(id_i64("block_id", block_id.value())?)
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        u32::try_from(count).map_err(ser)
    }
}
