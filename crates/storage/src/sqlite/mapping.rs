use playtest_core::model::{
    AnswerKey, BlockId, LuminariasTransaction, Question, QuestionContent, QuestionId,
    QuestionStats, RewardMetadata, TopicId, TransactionKind, UserId,
};
use sqlx::Row;

use crate::repository::{StorageError, TransactionRow};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn parse_answer_key(s: &str) -> Result<AnswerKey, StorageError> {
    s.parse::<AnswerKey>().map_err(ser)
}

/// Stats columns come from a LEFT JOIN; all-null means never attempted.
fn map_stats(row: &sqlx::sqlite::SqliteRow) -> Result<QuestionStats, StorageError> {
    let attempts: Option<i64> = row.try_get("attempts_total").map_err(ser)?;
    let Some(attempts) = attempts else {
        return Ok(QuestionStats::unattempted());
    };
    let correct: Option<i64> = row.try_get("correct_total").map_err(ser)?;
    let accuracy: Option<f64> = row.try_get("accuracy_percent").map_err(ser)?;
    Ok(QuestionStats::from_persisted(
        u32_from_i64("attempts_total", attempts)?,
        u32_from_i64("correct_total", correct.unwrap_or(0))?,
        accuracy,
    ))
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = QuestionId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?);
    let block_id = BlockId::new(i64_to_u64(
        "block_id",
        row.try_get::<i64, _>("block_id").map_err(ser)?,
    )?);
    let topic_id = row
        .try_get::<Option<i64>, _>("topic_id")
        .map_err(ser)?
        .map(|v| i64_to_u64("topic_id", v).map(TopicId::new))
        .transpose()?;

    let options = [
        row.try_get::<String, _>("option_a").map_err(ser)?,
        row.try_get::<String, _>("option_b").map_err(ser)?,
        row.try_get::<String, _>("option_c").map_err(ser)?,
        row.try_get::<String, _>("option_d").map_err(ser)?,
    ];
    let correct_raw: String = row.try_get("correct_answer").map_err(ser)?;
    let content = QuestionContent::new(
        row.try_get::<String, _>("question_text").map_err(ser)?,
        options,
        parse_answer_key(&correct_raw)?,
        row.try_get::<Option<String>, _>("explanation").map_err(ser)?,
    )
    .map_err(ser)?;

    Ok(Question::with_stats(
        id,
        block_id,
        topic_id,
        content,
        map_stats(row)?,
    ))
}

pub(crate) fn map_stats_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuestionStats, StorageError> {
    map_stats(row)
}

pub(crate) fn metadata_to_json(tx: &LuminariasTransaction) -> Result<Option<String>, StorageError> {
    tx.metadata()
        .map(|m| serde_json::to_string(m).map_err(ser))
        .transpose()
}

pub(crate) fn map_transaction_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<TransactionRow, StorageError> {
    let kind: String = row.try_get("kind").map_err(ser)?;
    let kind: TransactionKind = kind.parse().map_err(ser)?;
    let amount = u32_from_i64("amount", row.try_get::<i64, _>("amount").map_err(ser)?)?;
    let user_id = UserId::new(i64_to_u64(
        "user_id",
        row.try_get::<i64, _>("user_id").map_err(ser)?,
    )?);

    let tx = LuminariasTransaction::new(
        user_id,
        kind,
        amount,
        row.try_get::<String, _>("category").map_err(ser)?,
        row.try_get::<String, _>("subcategory").map_err(ser)?,
        row.try_get::<String, _>("action_type").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)?;

    let metadata: Option<String> = row.try_get("metadata").map_err(ser)?;
    let tx = match metadata {
        Some(raw) => tx.with_metadata(serde_json::from_str::<RewardMetadata>(&raw).map_err(ser)?),
        None => tx,
    };

    Ok(TransactionRow {
        id: row.try_get("id").map_err(ser)?,
        transaction: tx,
    })
}
