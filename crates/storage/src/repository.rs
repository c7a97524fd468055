use async_trait::async_trait;
use chrono::{DateTime, Utc};
use playtest_core::model::{
    AnswerKey, BlockId, LuminariasTransaction, Question, QuestionId, QuestionStats,
    TransactionKind, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("insufficient balance: have {balance}, need {requested}")]
    InsufficientBalance { balance: i64, requested: u32 },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One answered question, as persisted in the attempt history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub answer: AnswerKey,
    pub correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// A ledger entry together with its storage id.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub id: i64,
    pub transaction: LuminariasTransaction,
}

/// Question bank access.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist or update a question's content. Stats carried by `question` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// All questions of a block, with `user_id`'s stats attached, ordered by id.
    ///
    /// Questions the user never answered come back unattempted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn questions_for_block(
        &self,
        user_id: UserId,
        block_id: BlockId,
    ) -> Result<Vec<Question>, StorageError>;

    /// Number of questions in a block.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn count_block_questions(&self, block_id: BlockId) -> Result<u32, StorageError>;
}

/// Per-user answer history and derived stats.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append an attempt and fold it into the user's stats for that question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question does not exist.
    async fn record_attempt(&self, attempt: &AttemptRecord) -> Result<QuestionStats, StorageError>;

    /// Current stats, unattempted if the user never answered the question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn question_stats(
        &self,
        user_id: UserId,
        question_id: QuestionId,
    ) -> Result<QuestionStats, StorageError>;
}

/// Luminarias ledger.
#[async_trait]
pub trait LuminariasRepository: Send + Sync {
    /// Sum of earnings minus spending for a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn balance(&self, user_id: UserId) -> Result<i64, StorageError>;

    /// Append a ledger entry and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InsufficientBalance` if a spend exceeds the balance.
    async fn append_transaction(&self, tx: &LuminariasTransaction) -> Result<i64, StorageError>;

    /// Most recent entries first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_transactions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<TransactionRow>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<HashMap<QuestionId, Question>>>,
    stats: Arc<Mutex<HashMap<(UserId, QuestionId), QuestionStats>>>,
    attempts: Arc<Mutex<Vec<AttemptRecord>>>,
    ledger: Arc<Mutex<Vec<TransactionRow>>>,
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts recorded so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn attempts(&self) -> Result<Vec<AttemptRecord>, StorageError> {
        Ok(self.attempts.lock().map_err(poisoned)?.clone())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut stored = question.clone();
        stored.set_stats(QuestionStats::unattempted());
        self.questions
            .lock()
            .map_err(poisoned)?
            .insert(question.id(), stored);
        Ok(())
    }

    async fn questions_for_block(
        &self,
        user_id: UserId,
        block_id: BlockId,
    ) -> Result<Vec<Question>, StorageError> {
        let questions = self.questions.lock().map_err(poisoned)?;
        let stats = self.stats.lock().map_err(poisoned)?;
        let mut found: Vec<Question> = questions
            .values()
            .filter(|q| q.block_id() == block_id)
            .map(|q| {
                let mut q = q.clone();
                if let Some(s) = stats.get(&(user_id, q.id())) {
                    q.set_stats(*s);
                }
                q
            })
            .collect();
        found.sort_by_key(Question::id);
        Ok(found)
    }

    async fn count_block_questions(&self, block_id: BlockId) -> Result<u32, StorageError> {
        let questions = self.questions.lock().map_err(poisoned)?;
        let count = questions.values().filter(|q| q.block_id() == block_id).count();
        u32::try_from(count).map_err(|_| StorageError::Serialization("count overflow".into()))
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn record_attempt(&self, attempt: &AttemptRecord) -> Result<QuestionStats, StorageError> {
        if !self
            .questions
            .lock()
            .map_err(poisoned)?
            .contains_key(&attempt.question_id)
        {
            return Err(StorageError::NotFound);
        }

        let updated = {
            let mut stats = self.stats.lock().map_err(poisoned)?;
            let entry = stats
                .entry((attempt.user_id, attempt.question_id))
                .or_default();
            entry.record_attempt(attempt.correct);
            *entry
        };
        self.attempts.lock().map_err(poisoned)?.push(attempt.clone());
        Ok(updated)
    }

    async fn question_stats(
        &self,
        user_id: UserId,
        question_id: QuestionId,
    ) -> Result<QuestionStats, StorageError> {
        let stats = self.stats.lock().map_err(poisoned)?;
        Ok(stats.get(&(user_id, question_id)).copied().unwrap_or_default())
    }
}

fn ledger_balance(rows: &[TransactionRow], user_id: UserId) -> i64 {
    rows.iter()
        .filter(|row| row.transaction.user_id() == user_id)
        .map(|row| row.transaction.signed_amount())
        .sum()
}

#[async_trait]
impl LuminariasRepository for InMemoryRepository {
    async fn balance(&self, user_id: UserId) -> Result<i64, StorageError> {
        let ledger = self.ledger.lock().map_err(poisoned)?;
        Ok(ledger_balance(&ledger, user_id))
    }

    async fn append_transaction(&self, tx: &LuminariasTransaction) -> Result<i64, StorageError> {
        let mut ledger = self.ledger.lock().map_err(poisoned)?;
        if tx.kind() == TransactionKind::Spend {
            let balance = ledger_balance(&ledger, tx.user_id());
            if balance < i64::from(tx.amount()) {
                return Err(StorageError::InsufficientBalance {
                    balance,
                    requested: tx.amount(),
                });
            }
        }
        let id = ledger.last().map_or(1, |row| row.id + 1);
        ledger.push(TransactionRow {
            id,
            transaction: tx.clone(),
        });
        Ok(id)
    }

    async fn list_transactions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<TransactionRow>, StorageError> {
        let ledger = self.ledger.lock().map_err(poisoned)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(ledger
            .iter()
            .rev()
            .filter(|row| row.transaction.user_id() == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub luminarias: Arc<dyn LuminariasRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            questions: Arc::new(repo.clone()),
            attempts: Arc::new(repo.clone()),
            luminarias: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playtest_core::model::{QuestionContent, TopicId};
    use playtest_core::time::fixed_now;

    fn build_question(id: u64, block: u64) -> Question {
        let content = QuestionContent::new(
            format!("Q{id}"),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            AnswerKey::B,
            None,
        )
        .unwrap();
        Question::new(
            QuestionId::new(id),
            BlockId::new(block),
            Some(TopicId::new(1)),
            content,
        )
    }

    fn attempt(user: u64, question: u64, correct: bool) -> AttemptRecord {
        AttemptRecord {
            user_id: UserId::new(user),
            question_id: QuestionId::new(question),
            answer: if correct { AnswerKey::B } else { AnswerKey::A },
            correct,
            answered_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn block_questions_carry_per_user_stats() {
        let repo = InMemoryRepository::new();
        for id in [3, 1, 2] {
            repo.upsert_question(&build_question(id, 10)).await.unwrap();
        }
        repo.upsert_question(&build_question(9, 11)).await.unwrap();

        repo.record_attempt(&attempt(1, 2, false)).await.unwrap();
        repo.record_attempt(&attempt(1, 2, true)).await.unwrap();
        repo.record_attempt(&attempt(2, 1, true)).await.unwrap();

        let questions = repo
            .questions_for_block(UserId::new(1), BlockId::new(10))
            .await
            .unwrap();
        let ids: Vec<u64> = questions.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!questions[0].stats().is_attempted());
        assert_eq!(questions[1].stats().attempts_total(), 2);
        assert_eq!(questions[1].stats().accuracy_percent(), Some(50.0));

        assert_eq!(repo.count_block_questions(BlockId::new(10)).await.unwrap(), 3);
        assert_eq!(repo.attempts().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn attempt_on_unknown_question_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.record_attempt(&attempt(1, 404, true)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn ledger_tracks_balance_and_rejects_overdraft() {
        let repo = InMemoryRepository::new();
        let user = UserId::new(5);
        let earn = LuminariasTransaction::new(
            user,
            TransactionKind::Earn,
            20,
            "user_earning",
            "study_activity",
            "complete_session",
            "test",
            fixed_now(),
        )
        .unwrap();
        let spend = LuminariasTransaction::new(
            user,
            TransactionKind::Spend,
            15,
            "user_spending",
            "shop",
            "buy_item",
            "test",
            fixed_now(),
        )
        .unwrap();

        repo.append_transaction(&earn).await.unwrap();
        repo.append_transaction(&spend).await.unwrap();
        assert_eq!(repo.balance(user).await.unwrap(), 5);

        let err = repo.append_transaction(&spend).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::InsufficientBalance {
                balance: 5,
                requested: 15
            }
        ));

        let history = repo.list_transactions(user, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].transaction.kind(), TransactionKind::Spend);
        assert!(history[0].id > history[1].id);
    }
}
