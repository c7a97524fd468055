use std::sync::Arc;

use playtest_core::model::{AnswerKey, BlockId, GameMode, QuestionStats, UserId};
use storage::repository::{AttemptRecord, AttemptRepository, QuestionRepository};

use super::plan::{PracticePlanner, SessionLength};
use super::session::{PracticeAnswer, PracticeSession};
use crate::Clock;
use crate::error::PracticeError;
use crate::luminarias::{LuminariasService, RewardReceipt};

/// Result of answering a single question in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeAnswerResult {
    pub answer: PracticeAnswer,
    /// The user's stats for the question after this attempt.
    pub stats: QuestionStats,
    pub is_complete: bool,
    pub reward: Option<RewardReceipt>,
}

/// Orchestrates session start, persisted answering and the completion reward.
#[derive(Clone)]
pub struct PracticeLoopService {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn AttemptRepository>,
    wallet: LuminariasService,
}

impl PracticeLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionRepository>,
        attempts: Arc<dyn AttemptRepository>,
        wallet: LuminariasService,
    ) -> Self {
        Self {
            clock,
            questions,
            attempts,
            wallet,
        }
    }

    #[must_use]
    pub fn wallet(&self) -> &LuminariasService {
        &self.wallet
    }

    /// Start an adaptive session over `block_id` for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::EmptyPool` when the block has no questions,
    /// `PracticeError::Storage` on repository failures.
    pub async fn start_session(
        &self,
        user_id: UserId,
        block_id: BlockId,
        length: SessionLength,
        game_mode: GameMode,
    ) -> Result<PracticeSession, PracticeError> {
        let pool = self.questions.questions_for_block(user_id, block_id).await?;
        let plan = PracticePlanner::new(length).plan(pool)?;
        tracing::info!(
            user = %user_id,
            block = %block_id,
            %length,
            drawn = plan.total(),
            failed = plan.composition.failed,
            new = plan.composition.new,
            learning = plan.composition.learning,
            mastered = plan.composition.mastered,
            backfilled = plan.backfilled,
            "starting practice session"
        );
        PracticeSession::new(user_id, block_id, game_mode, plan, self.clock.now())
    }

    /// Answer the current question, persist the attempt and credit the reward
    /// when the session completes.
    ///
    /// The attempt is stored before the session advances, so a storage failure
    /// leaves the question current.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Completed` if the session is finished, or
    /// storage/wallet errors.
    pub async fn answer_current(
        &self,
        session: &mut PracticeSession,
        answer: AnswerKey,
    ) -> Result<PracticeAnswerResult, PracticeError> {
        if session.is_complete() {
            return Err(PracticeError::Completed);
        }
        let Some(question) = session.current_question() else {
            return Err(PracticeError::Completed);
        };

        let answered_at = self.clock.now();
        let record = AttemptRecord {
            user_id: session.user_id(),
            question_id: question.id(),
            answer,
            correct: question.content().is_correct(answer),
            answered_at,
        };
        let stats = self.attempts.record_attempt(&record).await?;
        tracing::debug!(
            user = %record.user_id,
            question = %record.question_id,
            correct = record.correct,
            attempts = stats.attempts_total(),
            "recorded attempt"
        );

        let graded = session.answer_current(answer, answered_at)?.clone();

        if session.is_complete() && session.reward().is_none() {
            self.finalize_reward(session).await?;
        }

        Ok(PracticeAnswerResult {
            answer: graded,
            stats,
            is_complete: session.is_complete(),
            reward: session.reward(),
        })
    }

    /// Credit the reward of a completed session, once.
    ///
    /// Returns the existing receipt when the reward was already credited, so it
    /// can be retried after a failed credit.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Completed` if the session is not complete,
    /// `PracticeError::Luminarias` if the credit fails.
    pub async fn finalize_reward(
        &self,
        session: &mut PracticeSession,
    ) -> Result<RewardReceipt, PracticeError> {
        if let Some(receipt) = session.reward() {
            return Ok(receipt);
        }
        let outcome = session.outcome().ok_or(PracticeError::Completed)?;
        let receipt = self
            .wallet
            .reward_session(session.user_id(), &outcome)
            .await?;
        session.set_reward(receipt);
        Ok(receipt)
    }
}
