mod plan;
mod progress;
mod session;
mod workflow;

// Public API of the practice subsystem.
pub use crate::error::PracticeError;
pub use plan::{PracticePlan, PracticePlanner, SessionLength};
pub use progress::SessionProgress;
pub use session::{PracticeAnswer, PracticeSession};
pub use workflow::{PracticeAnswerResult, PracticeLoopService};
