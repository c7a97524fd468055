use chrono::{DateTime, Utc};
use serde::Serialize;

use playtest_core::model::{
    AnswerKey, BlockId, BlockProgress, GameMode, PerformanceBand, Question, QuestionId,
    SessionOutcome, UserId,
};
use playtest_core::CategoryCounts;

use super::plan::PracticePlan;
use super::progress::SessionProgress;
use crate::error::PracticeError;
use crate::luminarias::RewardReceipt;

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// A graded answer within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PracticeAnswer {
    pub question_id: QuestionId,
    pub answer: AnswerKey,
    pub expected: AnswerKey,
    pub correct: bool,
    /// Shown as feedback after answering, right or wrong.
    pub explanation: Option<String>,
    pub answered_at: DateTime<Utc>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory practice session for one user and block.
///
/// Steps through the planned questions in order, grading each answer against
/// the question's key.
pub struct PracticeSession {
    user_id: UserId,
    block_id: BlockId,
    game_mode: GameMode,
    questions: Vec<Question>,
    composition: CategoryCounts,
    block_progress: BlockProgress,
    current: usize,
    answers: Vec<PracticeAnswer>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    reward: Option<RewardReceipt>,
}

impl PracticeSession {
    /// Create a session from a plan.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::EmptyPool` if the plan has no questions.
    pub fn new(
        user_id: UserId,
        block_id: BlockId,
        game_mode: GameMode,
        plan: PracticePlan,
        started_at: DateTime<Utc>,
    ) -> Result<Self, PracticeError> {
        if plan.is_empty() {
            return Err(PracticeError::EmptyPool);
        }

        Ok(Self {
            user_id,
            block_id,
            game_mode,
            questions: plan.questions,
            composition: plan.composition,
            block_progress: plan.progress,
            current: 0,
            answers: Vec::new(),
            started_at,
            completed_at: None,
            reward: None,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    #[must_use]
    pub fn game_mode(&self) -> &GameMode {
        &self.game_mode
    }

    #[must_use]
    pub fn composition(&self) -> CategoryCounts {
        self.composition
    }

    /// Block progress at the time the session was planned.
    #[must_use]
    pub fn block_progress(&self) -> BlockProgress {
        self.block_progress
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn answers(&self) -> &[PracticeAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn reward(&self) -> Option<RewardReceipt> {
        self.reward
    }

    pub(crate) fn set_reward(&mut self, reward: RewardReceipt) {
        self.reward = Some(reward);
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.correct).count()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.questions.len().saturating_sub(self.current)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_questions(),
            answered: self.answers.len(),
            correct: self.correct_count(),
            remaining: self.remaining(),
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Grade `answer` against the current question and advance.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Completed` if the session is already finished.
    pub fn answer_current(
        &mut self,
        answer: AnswerKey,
        answered_at: DateTime<Utc>,
    ) -> Result<&PracticeAnswer, PracticeError> {
        if self.is_complete() {
            return Err(PracticeError::Completed);
        }
        let Some(question) = self.questions.get(self.current) else {
            return Err(PracticeError::Completed);
        };

        let expected = question.content().correct();
        self.answers.push(PracticeAnswer {
            question_id: question.id(),
            answer,
            expected,
            correct: answer == expected,
            explanation: question.content().explanation().map(str::to_owned),
            answered_at,
        });

        self.current += 1;
        if self.current >= self.questions.len() {
            self.completed_at = Some(answered_at);
        }

        self.answers.last().ok_or(PracticeError::Completed)
    }

    /// Outcome fed to the reward calculator; `None` until the session is complete.
    #[must_use]
    pub fn outcome(&self) -> Option<SessionOutcome> {
        if !self.is_complete() {
            return None;
        }
        let correct = u32::try_from(self.correct_count()).unwrap_or(u32::MAX);
        let total = u32::try_from(self.answers.len()).unwrap_or(u32::MAX);
        Some(SessionOutcome::new(self.game_mode.clone(), correct, total))
    }

    #[must_use]
    pub fn performance(&self) -> Option<PerformanceBand> {
        self.outcome().as_ref().map(PerformanceBand::for_outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playtest_core::model::{QuestionContent, QuestionStats};
    use playtest_core::time::fixed_now;

    fn build_question(id: u64, key: AnswerKey) -> Question {
        let content = QuestionContent::new(
            format!("Q{id}"),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            key,
            (id == 2).then(|| "C es la buena".to_string()),
        )
        .unwrap();
        Question::with_stats(
            QuestionId::new(id),
            BlockId::new(1),
            None,
            content,
            QuestionStats::unattempted(),
        )
    }

    fn plan(questions: Vec<Question>) -> PracticePlan {
        PracticePlan {
            composition: CategoryCounts {
                new: questions.len(),
                ..CategoryCounts::default()
            },
            backfilled: 0,
            progress: BlockProgress::default(),
            questions,
        }
    }

    fn session(questions: Vec<Question>) -> Result<PracticeSession, PracticeError> {
        PracticeSession::new(
            UserId::new(1),
            BlockId::new(1),
            GameMode::Classic,
            plan(questions),
            fixed_now(),
        )
    }

    #[test]
    fn empty_plan_is_rejected() {
        assert!(matches!(session(Vec::new()), Err(PracticeError::EmptyPool)));
    }

    #[test]
    fn answers_are_graded_and_session_completes() {
        let mut s = session(vec![
            build_question(1, AnswerKey::A),
            build_question(2, AnswerKey::C),
            build_question(3, AnswerKey::D),
        ])
        .unwrap();

        assert!(s.answer_current(AnswerKey::A, fixed_now()).unwrap().correct);
        assert_eq!(s.answers()[0].explanation, None);
        let second = s.answer_current(AnswerKey::B, fixed_now()).unwrap().clone();
        assert!(!second.correct);
        assert_eq!(second.expected, AnswerKey::C);
        assert_eq!(second.explanation.as_deref(), Some("C es la buena"));
        assert!(s.outcome().is_none());

        s.answer_current(AnswerKey::D, fixed_now()).unwrap();
        assert!(s.is_complete());
        assert_eq!(s.completed_at(), Some(fixed_now()));

        let progress = s.progress();
        assert_eq!(progress.answered, 3);
        assert_eq!(progress.correct, 2);
        assert_eq!(progress.remaining, 0);

        let outcome = s.outcome().unwrap();
        assert_eq!(outcome.correct_answers, 2);
        assert_eq!(outcome.total_questions, 3);
        assert_eq!(s.performance(), Some(PerformanceBand::Good));

        let err = s.answer_current(AnswerKey::A, fixed_now()).unwrap_err();
        assert!(matches!(err, PracticeError::Completed));
    }
}
