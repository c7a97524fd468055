use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{BlockId, QuestionId, TopicId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("correct option {0} is empty")]
    EmptyCorrectOption(AnswerKey),

    #[error("invalid answer key: {0:?}")]
    InvalidAnswerKey(String),

    #[error("correct answers ({correct}) exceed attempts ({attempts})")]
    InconsistentStats { attempts: u32, correct: u32 },
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// One of the four options of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    pub const ALL: [AnswerKey; 4] = [AnswerKey::A, AnswerKey::B, AnswerKey::C, AnswerKey::D];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            AnswerKey::A => 0,
            AnswerKey::B => 1,
            AnswerKey::C => 2,
            AnswerKey::D => 3,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerKey::A => "a",
            AnswerKey::B => "b",
            AnswerKey::C => "c",
            AnswerKey::D => "d",
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys are case-insensitive (`"B"` and `"b"` both parse).
impl FromStr for AnswerKey {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(AnswerKey::A),
            "b" => Ok(AnswerKey::B),
            "c" => Ok(AnswerKey::C),
            "d" => Ok(AnswerKey::D),
            _ => Err(QuestionError::InvalidAnswerKey(s.to_owned())),
        }
    }
}

//
// ─── CONTENT ───────────────────────────────────────────────────────────────────
//

/// Prompt, options and explanation of a question.
///
/// The sampler never looks inside this; it travels with the question unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionContent {
    text: String,
    options: [String; 4],
    correct: AnswerKey,
    explanation: Option<String>,
}

impl QuestionContent {
    /// Build validated content.
    ///
    /// Blank options are allowed so true/false and three-way questions fit the
    /// same four slots; they are simply not offered.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` when the prompt is blank and
    /// `QuestionError::EmptyCorrectOption` when `correct` points at a blank option.
    pub fn new(
        text: impl Into<String>,
        options: [String; 4],
        correct: AnswerKey,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options[correct.index()].trim().is_empty() {
            return Err(QuestionError::EmptyCorrectOption(correct));
        }
        let explanation = explanation.filter(|e| !e.trim().is_empty());
        Ok(Self {
            text,
            options,
            correct,
            explanation,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn option(&self, key: AnswerKey) -> &str {
        &self.options[key.index()]
    }

    #[must_use]
    pub fn options(&self) -> &[String; 4] {
        &self.options
    }

    /// Non-blank options in key order.
    pub fn available_options(&self) -> impl Iterator<Item = (AnswerKey, &str)> + '_ {
        AnswerKey::ALL
            .into_iter()
            .map(move |key| (key, self.option(key)))
            .filter(|(_, text)| !text.trim().is_empty())
    }

    #[must_use]
    pub fn correct(&self) -> AnswerKey {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self, answer: AnswerKey) -> bool {
        self.correct == answer
    }
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// A learner's history with one question.
///
/// `accuracy_percent` is `None` for questions never attempted. Persisted rows
/// may also lack it; readers go through [`QuestionStats::effective_accuracy`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuestionStats {
    attempts_total: u32,
    correct_total: u32,
    accuracy_percent: Option<f64>,
}

impl QuestionStats {
    /// Stats for a question that has never been attempted.
    #[must_use]
    pub fn unattempted() -> Self {
        Self::default()
    }

    /// Build stats from raw counters, deriving accuracy.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InconsistentStats` if `correct > attempts`.
    pub fn from_counts(attempts: u32, correct: u32) -> Result<Self, QuestionError> {
        if correct > attempts {
            return Err(QuestionError::InconsistentStats { attempts, correct });
        }
        Ok(Self {
            attempts_total: attempts,
            correct_total: correct,
            accuracy_percent: accuracy_of(attempts, correct),
        })
    }

    /// Rehydrate stats exactly as stored, including a missing accuracy.
    #[must_use]
    pub fn from_persisted(attempts: u32, correct: u32, accuracy_percent: Option<f64>) -> Self {
        Self {
            attempts_total: attempts,
            correct_total: correct,
            accuracy_percent,
        }
    }

    #[must_use]
    pub fn attempts_total(&self) -> u32 {
        self.attempts_total
    }

    #[must_use]
    pub fn correct_total(&self) -> u32 {
        self.correct_total
    }

    #[must_use]
    pub fn accuracy_percent(&self) -> Option<f64> {
        self.accuracy_percent
    }

    /// Accuracy used for classification: missing or non-finite values count as 0.
    #[must_use]
    pub fn effective_accuracy(&self) -> f64 {
        match self.accuracy_percent {
            Some(value) if value.is_finite() => value,
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn is_attempted(&self) -> bool {
        self.attempts_total > 0
    }

    /// Fold one more answer into the history.
    pub fn record_attempt(&mut self, correct: bool) {
        self.attempts_total = self.attempts_total.saturating_add(1);
        if correct {
            self.correct_total = self.correct_total.saturating_add(1);
        }
        self.accuracy_percent = accuracy_of(self.attempts_total, self.correct_total);
    }
}

fn accuracy_of(attempts: u32, correct: u32) -> Option<f64> {
    if attempts == 0 {
        return None;
    }
    Some(f64::from(correct) / f64::from(attempts) * 100.0)
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A question as seen by one learner: content plus that learner's stats.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    block_id: BlockId,
    topic_id: Option<TopicId>,
    content: QuestionContent,
    stats: QuestionStats,
}

impl Question {
    /// A question the learner has not attempted yet.
    #[must_use]
    pub fn new(
        id: QuestionId,
        block_id: BlockId,
        topic_id: Option<TopicId>,
        content: QuestionContent,
    ) -> Self {
        Self::with_stats(id, block_id, topic_id, content, QuestionStats::unattempted())
    }

    #[must_use]
    pub fn with_stats(
        id: QuestionId,
        block_id: BlockId,
        topic_id: Option<TopicId>,
        content: QuestionContent,
        stats: QuestionStats,
    ) -> Self {
        Self {
            id,
            block_id,
            topic_id,
            content,
            stats,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    #[must_use]
    pub fn topic_id(&self) -> Option<TopicId> {
        self.topic_id
    }

    #[must_use]
    pub fn content(&self) -> &QuestionContent {
        &self.content
    }

    #[must_use]
    pub fn stats(&self) -> &QuestionStats {
        &self.stats
    }

    pub fn set_stats(&mut self, stats: QuestionStats) {
        self.stats = stats;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
