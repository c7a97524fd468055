use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use playtest_core::model::{BlockProgress, Question};
use playtest_core::{AdaptiveSampler, CategoryCounts, MasteryBuckets};

use crate::error::PracticeError;

/// How many questions a practice session asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionLength {
    Quick,
    #[default]
    Recommended,
    Intensive,
    /// Every question of the block.
    All,
    Custom(u32),
}

impl SessionLength {
    /// Number of questions to draw from a pool of `pool_size`.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::InvalidSessionLength` for `Custom(0)`.
    pub fn resolve(self, pool_size: usize) -> Result<usize, PracticeError> {
        let count = match self {
            SessionLength::Quick => 10,
            SessionLength::Recommended => 20,
            SessionLength::Intensive => 30,
            SessionLength::All => return Ok(pool_size),
            SessionLength::Custom(0) => {
                return Err(PracticeError::InvalidSessionLength("0".into()));
            }
            SessionLength::Custom(n) => usize::try_from(n).unwrap_or(usize::MAX),
        };
        Ok(count)
    }
}

impl fmt::Display for SessionLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionLength::Quick => f.write_str("quick"),
            SessionLength::Recommended => f.write_str("recommended"),
            SessionLength::Intensive => f.write_str("intensive"),
            SessionLength::All => f.write_str("all"),
            SessionLength::Custom(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for SessionLength {
    type Err = PracticeError;

    /// Accepts a preset name or a positive question count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "quick" => Ok(SessionLength::Quick),
            "recommended" => Ok(SessionLength::Recommended),
            "intensive" => Ok(SessionLength::Intensive),
            "all" => Ok(SessionLength::All),
            other => match other.parse::<u32>() {
                Ok(n) if n > 0 => Ok(SessionLength::Custom(n)),
                _ => Err(PracticeError::InvalidSessionLength(trimmed.to_owned())),
            },
        }
    }
}

/// Questions selected for a session plus the context they were drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticePlan {
    pub questions: Vec<Question>,
    pub composition: CategoryCounts,
    pub backfilled: usize,
    /// Progress of the whole block, not just the drawn questions.
    pub progress: BlockProgress,
}

impl PracticePlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Classifies a block's questions and draws an adaptive session from them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PracticePlanner {
    length: SessionLength,
}

impl PracticePlanner {
    #[must_use]
    pub fn new(length: SessionLength) -> Self {
        Self { length }
    }

    #[must_use]
    pub fn length(&self) -> SessionLength {
        self.length
    }

    /// Build a plan using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::InvalidSessionLength` for a zero custom length.
    pub fn plan(&self, pool: Vec<Question>) -> Result<PracticePlan, PracticeError> {
        let mut rng = rand::rng();
        self.plan_with_rng(pool, &mut rng)
    }

    /// Build a plan with a caller-provided RNG.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::InvalidSessionLength` for a zero custom length.
    pub fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        pool: Vec<Question>,
        rng: &mut R,
    ) -> Result<PracticePlan, PracticeError> {
        let buckets = MasteryBuckets::classify(pool);
        let progress = BlockProgress::from_buckets(&buckets);
        let count = self.length.resolve(buckets.len())?;
        let draw = AdaptiveSampler::new(count).draw_with_rng(buckets, rng);

        Ok(PracticePlan {
            questions: draw.questions,
            composition: draw.composition,
            backfilled: draw.backfilled,
            progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playtest_core::model::{
        AnswerKey, BlockId, QuestionContent, QuestionId, QuestionStats,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn build_question(id: u64, attempts: u32, correct: u32) -> Question {
        let content = QuestionContent::new(
            format!("Q{id}"),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            AnswerKey::A,
            None,
        )
        .unwrap();
        Question::with_stats(
            QuestionId::new(id),
            BlockId::new(1),
            None,
            content,
            QuestionStats::from_counts(attempts, correct).unwrap(),
        )
    }

    #[test]
    fn length_presets_resolve() {
        assert_eq!(SessionLength::Quick.resolve(100).unwrap(), 10);
        assert_eq!(SessionLength::Recommended.resolve(100).unwrap(), 20);
        assert_eq!(SessionLength::Intensive.resolve(100).unwrap(), 30);
        assert_eq!(SessionLength::All.resolve(42).unwrap(), 42);
        assert_eq!(SessionLength::Custom(7).resolve(3).unwrap(), 7);
        assert!(matches!(
            SessionLength::Custom(0).resolve(3),
            Err(PracticeError::InvalidSessionLength(_))
        ));
    }

    #[test]
    fn length_parses_names_and_counts() {
        assert_eq!("Quick".parse::<SessionLength>().unwrap(), SessionLength::Quick);
        assert_eq!("all".parse::<SessionLength>().unwrap(), SessionLength::All);
        assert_eq!(" 15 ".parse::<SessionLength>().unwrap(), SessionLength::Custom(15));
        assert!("0".parse::<SessionLength>().is_err());
        assert!("lots".parse::<SessionLength>().is_err());
        assert_eq!(SessionLength::Custom(15).to_string(), "15");
    }

    #[test]
    fn plan_reports_whole_block_progress() {
        let mut pool = Vec::new();
        for id in 1..=6 {
            pool.push(build_question(id, 2, 2));
        }
        for id in 7..=10 {
            pool.push(build_question(id, 0, 0));
        }

        let mut rng = StdRng::seed_from_u64(11);
        let plan = PracticePlanner::new(SessionLength::Custom(4))
            .plan_with_rng(pool, &mut rng)
            .unwrap();

        assert_eq!(plan.total(), 4);
        assert_eq!(plan.composition.total(), 4);
        assert_eq!(plan.progress.total, 10);
        assert_eq!(plan.progress.mastered, 6);
        assert_eq!(plan.progress.new, 4);
    }

    #[test]
    fn all_length_takes_every_question() {
        let pool: Vec<Question> = (1..=13).map(|id| build_question(id, 1, 0)).collect();
        let plan = PracticePlanner::new(SessionLength::All).plan(pool).unwrap();
        assert_eq!(plan.total(), 13);
        assert_eq!(plan.composition.failed, 13);
    }

    #[test]
    fn empty_pool_gives_empty_plan() {
        let plan = PracticePlanner::default().plan(Vec::new()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.progress.percent(), 0.0);
    }
}
