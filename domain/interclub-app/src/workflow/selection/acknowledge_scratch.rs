use std::sync::Arc;

use chrono::{DateTime, Utc};
use interclub_core::{FixtureId, TeamId};
use thiserror::Error;

use crate::domain::{Actor, RepoUpdateError, selection::ScratchNoticeRepository};

#[async_trait::async_trait]
pub trait AcknowledgeScratchNoticeUseCase {
    /// Grants the team a standing permission to edit its selection for the
    /// fixture, regardless of the deadline.
    async fn acknowledge_scratch_notice(
        &self,
        actor: Actor,
        fixture: FixtureId,
        team: TeamId,
        now: DateTime<Utc>,
    ) -> Result<(), AcknowledgeScratchNoticeError>;
}

#[derive(Debug, Error)]
pub enum AcknowledgeScratchNoticeError {
    #[error("only administrators may acknowledge scratch notices")]
    Forbidden,
    #[error("team {team} has no scratch notice for fixture {fixture}")]
    NoticeNotFound { fixture: FixtureId, team: TeamId },
    #[error("storage failure")]
    StorageError,
}

pub struct AcknowledgeScratchNoticeUseCaseImpl<N: ScratchNoticeRepository> {
    notice_repository: Arc<N>,
}

impl<N: ScratchNoticeRepository> AcknowledgeScratchNoticeUseCaseImpl<N> {
    pub fn new(notice_repository: Arc<N>) -> Self {
        Self { notice_repository }
    }
}

#[async_trait::async_trait]
impl<N: ScratchNoticeRepository + Send + Sync + 'static> AcknowledgeScratchNoticeUseCase
    for AcknowledgeScratchNoticeUseCaseImpl<N>
{
    async fn acknowledge_scratch_notice(
        &self,
        actor: Actor,
        fixture: FixtureId,
        team: TeamId,
        now: DateTime<Utc>,
    ) -> Result<(), AcknowledgeScratchNoticeError> {
        if !actor.is_admin() {
            return Err(AcknowledgeScratchNoticeError::Forbidden);
        }
        match self
            .notice_repository
            .acknowledge_scratch_notice(fixture, team, now)
            .await
        {
            Ok(()) => {
                log::info!(
                    "Scratch notice of team {} for fixture {} acknowledged",
                    team,
                    fixture
                );
                Ok(())
            }
            Err(RepoUpdateError::NotFound) => {
                Err(AcknowledgeScratchNoticeError::NoticeNotFound { fixture, team })
            }
            Err(e) => {
                log::error!(
                    "Failed to acknowledge scratch notice for fixture {}: {}",
                    fixture,
                    e
                );
                Err(AcknowledgeScratchNoticeError::StorageError)
            }
        }
    }
}
