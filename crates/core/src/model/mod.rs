mod ids;
mod luminarias;
mod outcome;
mod progress;
mod question;

pub use ids::{BlockId, ParseIdError, QuestionId, TopicId, UserId};

pub use luminarias::{LuminariasTransaction, RewardMetadata, TransactionError, TransactionKind};
pub use outcome::{GameMode, PerformanceBand, SessionOutcome};
pub use progress::BlockProgress;
pub use question::{AnswerKey, Question, QuestionContent, QuestionError, QuestionStats};
