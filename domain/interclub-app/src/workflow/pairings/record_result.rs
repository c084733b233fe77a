use std::sync::Arc;

use interclub_core::{FixtureId, MatchResult, pairing::ResultEntryError};
use thiserror::Error;

use crate::domain::{
    Actor,
    fixture::{FixturePoints, FixtureRepository, FixtureWriteError},
};

#[async_trait::async_trait]
pub trait RecordMatchResultUseCase {
    /// Records the outcome of one slot and returns the fixture's new points.
    async fn record_result(
        &self,
        actor: Actor,
        fixture: FixtureId,
        slot: u8,
        result: MatchResult,
    ) -> Result<FixturePoints, RecordMatchResultError>;
}

#[derive(Debug, Error)]
pub enum RecordMatchResultError {
    #[error("only administrators may record results")]
    Forbidden,
    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),
    #[error("fixture {0} is completed, its results are final")]
    FixtureCompleted(FixtureId),
    #[error("fixture {fixture} has no match {slot}")]
    SlotNotFound { fixture: FixtureId, slot: u8 },
    #[error(transparent)]
    Refused(#[from] ResultEntryError),
    #[error("storage failure")]
    StorageError,
}

pub struct RecordMatchResultUseCaseImpl<F: FixtureRepository> {
    fixture_repository: Arc<F>,
}

impl<F: FixtureRepository> RecordMatchResultUseCaseImpl<F> {
    pub fn new(fixture_repository: Arc<F>) -> Self {
        Self { fixture_repository }
    }
}

#[async_trait::async_trait]
impl<F: FixtureRepository + Send + Sync + 'static> RecordMatchResultUseCase
    for RecordMatchResultUseCaseImpl<F>
{
    async fn record_result(
        &self,
        actor: Actor,
        fixture_id: FixtureId,
        slot: u8,
        result: MatchResult,
    ) -> Result<FixturePoints, RecordMatchResultError> {
        if !actor.is_admin() {
            return Err(RecordMatchResultError::Forbidden);
        }

        let points = self
            .fixture_repository
            .record_slot_result(fixture_id, slot, result)
            .await
            .map_err(|e| match e {
                FixtureWriteError::NotFound => RecordMatchResultError::FixtureNotFound(fixture_id),
                FixtureWriteError::Completed => {
                    RecordMatchResultError::FixtureCompleted(fixture_id)
                }
                FixtureWriteError::Refused(ResultEntryError::UnknownSlot(slot)) => {
                    RecordMatchResultError::SlotNotFound {
                        fixture: fixture_id,
                        slot,
                    }
                }
                FixtureWriteError::Refused(refusal) => RecordMatchResultError::Refused(refusal),
                FixtureWriteError::StorageError(e) => {
                    log::error!(
                        "Failed to record match {} of fixture {}: {}",
                        slot,
                        fixture_id,
                        e
                    );
                    RecordMatchResultError::StorageError
                }
            })?;

        log::info!(
            "Recorded {} for match {} of fixture {}",
            result.as_str(),
            slot,
            fixture_id
        );
        Ok(points)
    }
}
