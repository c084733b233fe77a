use std::sync::Arc;

use chrono::{DateTime, Utc};
use interclub_core::FixtureId;
use thiserror::Error;

use crate::domain::{Actor, RepoUpdateError, fixture::FixtureRepository};

#[async_trait::async_trait]
pub trait SetSelectionOverrideUseCase {
    /// Reopens selections of a fixture for both teams until `until`, or
    /// revokes a previous override when `until` is `None`.
    async fn set_selection_override(
        &self,
        actor: Actor,
        fixture: FixtureId,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), SetSelectionOverrideError>;
}

#[derive(Debug, Error)]
pub enum SetSelectionOverrideError {
    #[error("only administrators may override selection deadlines")]
    Forbidden,
    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),
    #[error("storage failure")]
    StorageError,
}

pub struct SetSelectionOverrideUseCaseImpl<F: FixtureRepository> {
    fixture_repository: Arc<F>,
}

impl<F: FixtureRepository> SetSelectionOverrideUseCaseImpl<F> {
    pub fn new(fixture_repository: Arc<F>) -> Self {
        Self { fixture_repository }
    }
}

#[async_trait::async_trait]
impl<F: FixtureRepository + Send + Sync + 'static> SetSelectionOverrideUseCase
    for SetSelectionOverrideUseCaseImpl<F>
{
    async fn set_selection_override(
        &self,
        actor: Actor,
        fixture: FixtureId,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), SetSelectionOverrideError> {
        if !actor.is_admin() {
            return Err(SetSelectionOverrideError::Forbidden);
        }
        match self
            .fixture_repository
            .set_selection_override(fixture, until)
            .await
        {
            Ok(()) => {
                match until {
                    Some(until) => log::info!(
                        "Selections of fixture {} reopened until {}",
                        fixture,
                        until
                    ),
                    None => log::info!("Selection override of fixture {} revoked", fixture),
                }
                Ok(())
            }
            Err(RepoUpdateError::NotFound) => {
                Err(SetSelectionOverrideError::FixtureNotFound(fixture))
            }
            Err(e) => {
                log::error!(
                    "Failed to set selection override of fixture {}: {}",
                    fixture,
                    e
                );
                Err(SetSelectionOverrideError::StorageError)
            }
        }
    }
}
