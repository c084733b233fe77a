use std::sync::Arc;

use interclub_core::{Division, Fixture, SeasonId};
use thiserror::Error;

use crate::domain::fixture::FixtureRepository;

#[async_trait::async_trait]
pub trait ListFixturesUseCase {
    async fn list_fixtures(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<Fixture>, ListFixturesError>;
}

#[derive(Debug, Error)]
pub enum ListFixturesError {
    #[error("storage failure")]
    StorageError,
}

pub struct ListFixturesUseCaseImpl<F: FixtureRepository> {
    fixture_repository: Arc<F>,
}

impl<F: FixtureRepository> ListFixturesUseCaseImpl<F> {
    pub fn new(fixture_repository: Arc<F>) -> Self {
        Self { fixture_repository }
    }
}

#[async_trait::async_trait]
impl<F: FixtureRepository + Send + Sync + 'static> ListFixturesUseCase
    for ListFixturesUseCaseImpl<F>
{
    async fn list_fixtures(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<Fixture>, ListFixturesError> {
        self.fixture_repository
            .list_fixtures(season, division)
            .await
            .map_err(|e| {
                log::error!("Failed to list fixtures of division {}: {}", division, e);
                ListFixturesError::StorageError
            })
    }
}
