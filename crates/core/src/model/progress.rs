use serde::{Deserialize, Serialize};

use crate::mastery::MasteryBuckets;

/// Study-plan progress for one block: how much of it the learner has mastered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockProgress {
    pub total: usize,
    pub mastered: usize,
    pub learning: usize,
    pub failed: usize,
    pub new: usize,
}

impl BlockProgress {
    #[must_use]
    pub fn from_buckets(buckets: &MasteryBuckets) -> Self {
        let counts = buckets.counts();
        Self {
            total: counts.total(),
            mastered: counts.mastered,
            learning: counts.learning,
            failed: counts.failed,
            new: counts.new,
        }
    }

    /// Mastered share in percent, 0 for an empty block.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.mastered as f64 / self.total as f64 * 100.0
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.mastered == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_has_zero_progress() {
        let progress = BlockProgress::default();
        assert!((progress.percent() - 0.0).abs() < f64::EPSILON);
        assert!(!progress.is_complete());
    }

    #[test]
    fn percent_counts_only_mastered() {
        let progress = BlockProgress {
            total: 8,
            mastered: 2,
            learning: 3,
            failed: 1,
            new: 2,
        };
        assert!((progress.percent() - 25.0).abs() < f64::EPSILON);
    }
}
