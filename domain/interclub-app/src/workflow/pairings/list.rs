use std::sync::Arc;

use interclub_core::{FixtureId, IndividualMatch};
use thiserror::Error;

use crate::domain::{RepoRetrieveError, fixture::FixtureRepository};

#[async_trait::async_trait]
pub trait ListPairingsUseCase {
    async fn list_pairings(
        &self,
        fixture: FixtureId,
    ) -> Result<Vec<IndividualMatch>, ListPairingsError>;
}

#[derive(Debug, Error)]
pub enum ListPairingsError {
    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),
    #[error("storage failure")]
    StorageError,
}

pub struct ListPairingsUseCaseImpl<F: FixtureRepository> {
    fixture_repository: Arc<F>,
}

impl<F: FixtureRepository> ListPairingsUseCaseImpl<F> {
    pub fn new(fixture_repository: Arc<F>) -> Self {
        Self { fixture_repository }
    }
}

#[async_trait::async_trait]
impl<F: FixtureRepository + Send + Sync + 'static> ListPairingsUseCase
    for ListPairingsUseCaseImpl<F>
{
    async fn list_pairings(
        &self,
        fixture: FixtureId,
    ) -> Result<Vec<IndividualMatch>, ListPairingsError> {
        match self.fixture_repository.get_individual_matches(fixture).await {
            Ok(matches) => Ok(matches),
            Err(RepoRetrieveError::NotFound) => Err(ListPairingsError::FixtureNotFound(fixture)),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to load matches of fixture {}: {}", fixture, e);
                Err(ListPairingsError::StorageError)
            }
        }
    }
}
