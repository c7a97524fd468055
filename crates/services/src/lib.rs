#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod luminarias;
pub mod practice;

pub use playtest_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, LuminariasError, PracticeError};
pub use luminarias::{LuminariasService, RewardReceipt};
pub use practice::{
    PracticeAnswer, PracticeAnswerResult, PracticeLoopService, PracticePlan, PracticePlanner,
    PracticeSession, SessionLength, SessionProgress,
};
