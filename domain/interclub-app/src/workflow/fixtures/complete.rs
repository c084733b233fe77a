use std::sync::Arc;

use interclub_core::{FixtureId, pairing::CompletionError};
use thiserror::Error;

use crate::domain::{
    Actor,
    fixture::{FixturePoints, FixtureRepository, FixtureWriteError},
};

#[async_trait::async_trait]
pub trait CompleteFixtureUseCase {
    async fn complete_fixture(
        &self,
        actor: Actor,
        fixture: FixtureId,
    ) -> Result<FixturePoints, CompleteFixtureError>;
}

#[derive(Debug, Error)]
pub enum CompleteFixtureError {
    #[error("only administrators may complete fixtures")]
    Forbidden,
    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),
    #[error("fixture {0} is already completed")]
    AlreadyCompleted(FixtureId),
    #[error("fixture {0} has no pairings yet")]
    NotPaired(FixtureId),
    #[error("matches {slots:?} of fixture {fixture} still await a result")]
    PendingMatches { fixture: FixtureId, slots: Vec<u8> },
    #[error("storage failure")]
    StorageError,
}

pub struct CompleteFixtureUseCaseImpl<F: FixtureRepository> {
    fixture_repository: Arc<F>,
}

impl<F: FixtureRepository> CompleteFixtureUseCaseImpl<F> {
    pub fn new(fixture_repository: Arc<F>) -> Self {
        Self { fixture_repository }
    }
}

#[async_trait::async_trait]
impl<F: FixtureRepository + Send + Sync + 'static> CompleteFixtureUseCase
    for CompleteFixtureUseCaseImpl<F>
{
    async fn complete_fixture(
        &self,
        actor: Actor,
        fixture_id: FixtureId,
    ) -> Result<FixturePoints, CompleteFixtureError> {
        if !actor.is_admin() {
            return Err(CompleteFixtureError::Forbidden);
        }

        match self.fixture_repository.complete_fixture(fixture_id).await {
            Ok(points) => {
                log::info!(
                    "Fixture {} completed {} - {}",
                    fixture_id,
                    points.0,
                    points.1
                );
                Ok(points)
            }
            Err(FixtureWriteError::NotFound) => {
                Err(CompleteFixtureError::FixtureNotFound(fixture_id))
            }
            Err(FixtureWriteError::Completed) => {
                Err(CompleteFixtureError::AlreadyCompleted(fixture_id))
            }
            Err(FixtureWriteError::Refused(CompletionError::NotPaired)) => {
                Err(CompleteFixtureError::NotPaired(fixture_id))
            }
            Err(FixtureWriteError::Refused(CompletionError::PendingMatches(slots))) => {
                Err(CompleteFixtureError::PendingMatches {
                    fixture: fixture_id,
                    slots,
                })
            }
            Err(FixtureWriteError::StorageError(e)) => {
                log::error!("Failed to complete fixture {}: {}", fixture_id, e);
                Err(CompleteFixtureError::StorageError)
            }
        }
    }
}
