#![forbid(unsafe_code)]
//! Pure domain logic for PLAYTEST adaptive practice: question mastery
//! classification, weighted session sampling and Luminarias rewards.

pub mod mastery;
pub mod model;
pub mod reward;
pub mod sampler;
pub mod time;

pub use mastery::{CategoryCounts, MasteryBuckets, MasteryCategory};
pub use reward::calculate_reward;
pub use sampler::{AdaptiveSampler, SessionDraw, SessionQuotas};
pub use time::Clock;
