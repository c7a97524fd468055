use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::mastery::{CategoryCounts, MasteryBuckets, MasteryCategory};
use crate::model::{Question, QuestionId};

//
// ─── QUOTAS ────────────────────────────────────────────────────────────────────
//

/// Per-category share of a session, in tenths.
const FAILED_TENTHS: usize = 4;
const NEW_TENTHS: usize = 3;
const LEARNING_TENTHS: usize = 2;
const MASTERED_TENTHS: usize = 1;

/// Target number of questions drawn from each bucket.
///
/// Quotas round up, so for small sessions they can add up to more than the
/// requested count. The surplus is cut after the final shuffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionQuotas {
    pub failed: usize,
    pub new: usize,
    pub learning: usize,
    pub mastered: usize,
}

impl SessionQuotas {
    #[must_use]
    pub fn for_count(requested: usize) -> Self {
        let share = |tenths: usize| requested.saturating_mul(tenths).div_ceil(10);
        Self {
            failed: share(FAILED_TENTHS),
            new: share(NEW_TENTHS),
            learning: share(LEARNING_TENTHS),
            mastered: share(MASTERED_TENTHS),
        }
    }

    #[must_use]
    pub fn get(&self, category: MasteryCategory) -> usize {
        match category {
            MasteryCategory::Failed => self.failed,
            MasteryCategory::New => self.new,
            MasteryCategory::Learning => self.learning,
            MasteryCategory::Mastered => self.mastered,
        }
    }
}

//
// ─── DRAW ──────────────────────────────────────────────────────────────────────
//

/// Questions selected for one practice session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDraw {
    pub questions: Vec<Question>,
    /// Mastery category of each selected question, counted after truncation.
    pub composition: CategoryCounts,
    /// How many of the selected questions came from backfill.
    pub backfilled: usize,
}

impl SessionDraw {
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// An empty draw means the pool had nothing to offer; callers must not
    /// start a session from it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(Question::id).collect()
    }
}

struct Picked {
    category: MasteryCategory,
    backfill: bool,
    question: Question,
}

//
// ─── SAMPLER ───────────────────────────────────────────────────────────────────
//

/// Draws a session weighted 40/30/20/10 towards failed, new, learning and
/// mastered questions, backfilling from whatever is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveSampler {
    requested: usize,
}

impl AdaptiveSampler {
    #[must_use]
    pub fn new(requested: usize) -> Self {
        Self { requested }
    }

    #[must_use]
    pub fn requested(&self) -> usize {
        self.requested
    }

    #[must_use]
    pub fn quotas(&self) -> SessionQuotas {
        SessionQuotas::for_count(self.requested)
    }

    /// Classify `pool` and draw from it using the thread-local RNG.
    #[must_use]
    pub fn draw_from_pool(&self, pool: impl IntoIterator<Item = Question>) -> SessionDraw {
        self.draw(MasteryBuckets::classify(pool))
    }

    /// Draw from pre-classified buckets using the thread-local RNG.
    #[must_use]
    pub fn draw(&self, buckets: MasteryBuckets) -> SessionDraw {
        let mut rng = rand::rng();
        self.draw_with_rng(buckets, &mut rng)
    }

    /// Draw with a caller-provided RNG.
    ///
    /// Returns exactly `min(requested, pool size)` questions with no repeated
    /// ids, in shuffled order.
    pub fn draw_with_rng<R: Rng + ?Sized>(&self, buckets: MasteryBuckets, rng: &mut R) -> SessionDraw {
        let quotas = self.quotas();
        let mut picked: Vec<Picked> = Vec::with_capacity(self.requested.min(buckets.len()));
        let mut selected_ids: HashSet<QuestionId> = HashSet::new();
        let mut remaining: Vec<(MasteryCategory, Question)> = Vec::new();

        for (category, mut bucket) in buckets.into_tagged() {
            bucket.as_mut_slice().shuffle(rng);
            let quota = quotas.get(category);
            let mut taken = 0;
            for question in bucket {
                if taken < quota && selected_ids.insert(question.id()) {
                    taken += 1;
                    picked.push(Picked {
                        category,
                        backfill: false,
                        question,
                    });
                } else {
                    remaining.push((category, question));
                }
            }
        }

        if picked.len() < self.requested {
            remaining.as_mut_slice().shuffle(rng);
            for (category, question) in remaining {
                if picked.len() >= self.requested {
                    break;
                }
                if selected_ids.insert(question.id()) {
                    picked.push(Picked {
                        category,
                        backfill: true,
                        question,
                    });
                }
            }
        }

        picked.as_mut_slice().shuffle(rng);
        picked.truncate(self.requested);

        let mut composition = CategoryCounts::default();
        let mut backfilled = 0;
        let questions = picked
            .into_iter()
            .map(|p| {
                composition.increment(p.category);
                if p.backfill {
                    backfilled += 1;
                }
                p.question
            })
            .collect();

        SessionDraw {
            questions,
            composition,
            backfilled,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
