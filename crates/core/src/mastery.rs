//! Mastery classification of a question pool.
//!
//! Categories are derived from stats on every call and never stored.

use serde::{Deserialize, Serialize};

use crate::model::{Question, QuestionStats};

/// Accuracy below this (in percent) marks an attempted question as failed.
pub const FAILED_BELOW_PERCENT: f64 = 40.0;

/// Accuracy at or above this (in percent) marks a question as mastered.
pub const MASTERED_FROM_PERCENT: f64 = 80.0;

/// How well a learner knows a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryCategory {
    Failed,
    New,
    Learning,
    Mastered,
}

impl MasteryCategory {
    /// Sampling priority order, weakest material first.
    pub const ALL: [MasteryCategory; 4] = [
        MasteryCategory::Failed,
        MasteryCategory::New,
        MasteryCategory::Learning,
        MasteryCategory::Mastered,
    ];

    /// Classify a single question's history.
    ///
    /// Unattempted questions are always `New`, whatever accuracy is stored.
    #[must_use]
    pub fn of(stats: &QuestionStats) -> Self {
        if !stats.is_attempted() {
            return MasteryCategory::New;
        }
        let accuracy = stats.effective_accuracy();
        if accuracy < FAILED_BELOW_PERCENT {
            MasteryCategory::Failed
        } else if accuracy < MASTERED_FROM_PERCENT {
            MasteryCategory::Learning
        } else {
            MasteryCategory::Mastered
        }
    }
}

/// Per-category counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub failed: usize,
    pub new: usize,
    pub learning: usize,
    pub mastered: usize,
}

impl CategoryCounts {
    pub fn increment(&mut self, category: MasteryCategory) {
        match category {
            MasteryCategory::Failed => self.failed += 1,
            MasteryCategory::New => self.new += 1,
            MasteryCategory::Learning => self.learning += 1,
            MasteryCategory::Mastered => self.mastered += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.failed + self.new + self.learning + self.mastered
    }
}

/// A pool split into four disjoint mastery buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasteryBuckets {
    pub failed: Vec<Question>,
    pub new: Vec<Question>,
    pub learning: Vec<Question>,
    pub mastered: Vec<Question>,
}

impl MasteryBuckets {
    /// Partition a pool. Every input question lands in exactly one bucket.
    #[must_use]
    pub fn classify(pool: impl IntoIterator<Item = Question>) -> Self {
        let mut buckets = Self::default();
        for question in pool {
            let category = MasteryCategory::of(question.stats());
            buckets.bucket_mut(category).push(question);
        }
        buckets
    }

    #[must_use]
    pub fn bucket(&self, category: MasteryCategory) -> &[Question] {
        match category {
            MasteryCategory::Failed => &self.failed,
            MasteryCategory::New => &self.new,
            MasteryCategory::Learning => &self.learning,
            MasteryCategory::Mastered => &self.mastered,
        }
    }

    fn bucket_mut(&mut self, category: MasteryCategory) -> &mut Vec<Question> {
        match category {
            MasteryCategory::Failed => &mut self.failed,
            MasteryCategory::New => &mut self.new,
            MasteryCategory::Learning => &mut self.learning,
            MasteryCategory::Mastered => &mut self.mastered,
        }
    }

    #[must_use]
    pub fn counts(&self) -> CategoryCounts {
        CategoryCounts {
            failed: self.failed.len(),
            new: self.new.len(),
            learning: self.learning.len(),
            mastered: self.mastered.len(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts().total()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand back the buckets tagged with their category, in sampling order.
    #[must_use]
    pub fn into_tagged(self) -> [(MasteryCategory, Vec<Question>); 4] {
        [
            (MasteryCategory::Failed, self.failed),
            (MasteryCategory::New, self.new),
            (MasteryCategory::Learning, self.learning),
            (MasteryCategory::Mastered, self.mastered),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerKey, BlockId, QuestionContent, QuestionId};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn question(id: u64, stats: QuestionStats) -> Question {
        let content = QuestionContent::new(
            format!("Q{id}"),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            AnswerKey::A,
            None,
        )
        .unwrap();
        Question::with_stats(QuestionId::new(id), BlockId::new(1), None, content, stats)
    }

    #[test]
    fn unattempted_is_new_regardless_of_accuracy() {
        let stats = QuestionStats::from_persisted(0, 0, Some(95.0));
        assert_eq!(MasteryCategory::of(&stats), MasteryCategory::New);
    }

    #[test]
    fn thresholds_follow_priority_order() {
        let of = |acc| MasteryCategory::of(&QuestionStats::from_persisted(5, 0, Some(acc)));
        assert_eq!(of(35.0), MasteryCategory::Failed);
        assert_eq!(of(39.99), MasteryCategory::Failed);
        assert_eq!(of(40.0), MasteryCategory::Learning);
        assert_eq!(of(79.9), MasteryCategory::Learning);
        assert_eq!(of(80.0), MasteryCategory::Mastered);
        assert_eq!(of(100.0), MasteryCategory::Mastered);
    }

    #[test]
    fn attempted_without_accuracy_is_failed() {
        let stats = QuestionStats::from_persisted(5, 3, None);
        assert_eq!(MasteryCategory::of(&stats), MasteryCategory::Failed);
    }

    #[test]
    fn classify_keeps_every_question() {
        let pool = vec![
            question(1, QuestionStats::unattempted()),
            question(2, QuestionStats::from_counts(10, 2).unwrap()),
            question(3, QuestionStats::from_counts(10, 6).unwrap()),
            question(4, QuestionStats::from_counts(10, 9).unwrap()),
            question(5, QuestionStats::unattempted()),
        ];
        let buckets = MasteryBuckets::classify(pool);
        assert_eq!(
            buckets.counts(),
            CategoryCounts {
                failed: 1,
                new: 2,
                learning: 1,
                mastered: 1
            }
        );
        assert_eq!(buckets.failed[0].id(), QuestionId::new(2));
        assert_eq!(buckets.mastered[0].id(), QuestionId::new(4));
    }

    fn arb_stats() -> impl Strategy<Value = QuestionStats> {
        (0u32..20, proptest::option::of(0u32..=1000)).prop_map(|(attempts, acc)| {
            QuestionStats::from_persisted(attempts, 0, acc.map(|v| f64::from(v) / 10.0))
        })
    }

    proptest! {
        #[test]
        fn classification_is_a_partition(stats in proptest::collection::vec(arb_stats(), 0..60)) {
            let pool: Vec<Question> = stats
                .into_iter()
                .enumerate()
                .map(|(i, s)| question(i as u64, s))
                .collect();
            let expected: HashSet<_> = pool.iter().map(Question::id).collect();

            let buckets = MasteryBuckets::classify(pool.clone());
            prop_assert_eq!(buckets.len(), pool.len());

            let mut seen = HashSet::new();
            for category in MasteryCategory::ALL {
                for q in buckets.bucket(category) {
                    prop_assert!(seen.insert(q.id()));
                    prop_assert_eq!(MasteryCategory::of(q.stats()), category);
                }
            }
            prop_assert_eq!(seen, expected);
        }
    }
}
