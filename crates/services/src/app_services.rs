use std::sync::Arc;

use storage::repository::{QuestionRepository, Storage};

use crate::Clock;
use crate::error::AppServicesError;
use crate::luminarias::LuminariasService;
use crate::practice::PracticeLoopService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    questions: Arc<dyn QuestionRepository>,
    practice_loop: Arc<PracticeLoopService>,
    luminarias: Arc<LuminariasService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let luminarias = LuminariasService::new(clock, Arc::clone(&storage.luminarias));
        let practice_loop = PracticeLoopService::new(
            clock,
            Arc::clone(&storage.questions),
            Arc::clone(&storage.attempts),
            luminarias.clone(),
        );
        Self {
            questions: Arc::clone(&storage.questions),
            practice_loop: Arc::new(practice_loop),
            luminarias: Arc::new(luminarias),
        }
    }

    #[must_use]
    pub fn questions(&self) -> Arc<dyn QuestionRepository> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn practice_loop(&self) -> Arc<PracticeLoopService> {
        Arc::clone(&self.practice_loop)
    }

    #[must_use]
    pub fn luminarias(&self) -> Arc<LuminariasService> {
        Arc::clone(&self.luminarias)
    }
}
