use std::sync::Arc;

use chrono::{DateTime, Utc};
use interclub_core::{FixtureId, FixtureStatus, TeamId};
use thiserror::Error;

use crate::domain::{
    Actor, RepoRetrieveError,
    fixture::FixtureRepository,
    selection::{ScratchNotice, ScratchNoticeRepository},
};

pub const MAX_MESSAGE_LENGTH: usize = 2000;

#[async_trait::async_trait]
pub trait SubmitScratchNoticeUseCase {
    async fn submit_scratch_notice(
        &self,
        actor: Actor,
        fixture: FixtureId,
        team: TeamId,
        message: String,
        now: DateTime<Utc>,
    ) -> Result<(), SubmitScratchNoticeError>;
}

#[derive(Debug, Error)]
pub enum SubmitScratchNoticeError {
    #[error("not allowed to act for team {0}")]
    Forbidden(TeamId),
    #[error("a scratch notice needs a message")]
    EmptyMessage,
    #[error("a scratch notice is limited to {max} characters")]
    MessageTooLong { max: usize },
    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),
    #[error("team {team} does not play in fixture {fixture}")]
    TeamNotInFixture { fixture: FixtureId, team: TeamId },
    #[error("fixture {0} is already completed")]
    FixtureCompleted(FixtureId),
    #[error("storage failure")]
    StorageError,
}

pub struct SubmitScratchNoticeUseCaseImpl<F: FixtureRepository, N: ScratchNoticeRepository> {
    fixture_repository: Arc<F>,
    notice_repository: Arc<N>,
}

impl<F: FixtureRepository, N: ScratchNoticeRepository> SubmitScratchNoticeUseCaseImpl<F, N> {
    pub fn new(fixture_repository: Arc<F>, notice_repository: Arc<N>) -> Self {
        Self {
            fixture_repository,
            notice_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    F: FixtureRepository + Send + Sync + 'static,
    N: ScratchNoticeRepository + Send + Sync + 'static,
> SubmitScratchNoticeUseCase for SubmitScratchNoticeUseCaseImpl<F, N>
{
    async fn submit_scratch_notice(
        &self,
        actor: Actor,
        fixture_id: FixtureId,
        team: TeamId,
        message: String,
        now: DateTime<Utc>,
    ) -> Result<(), SubmitScratchNoticeError> {
        if !actor.may_act_for(team) {
            return Err(SubmitScratchNoticeError::Forbidden(team));
        }
        let message = message.trim().to_string();
        if message.is_empty() {
            return Err(SubmitScratchNoticeError::EmptyMessage);
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(SubmitScratchNoticeError::MessageTooLong {
                max: MAX_MESSAGE_LENGTH,
            });
        }

        let fixture = match self.fixture_repository.get_fixture(fixture_id).await {
            Ok(fixture) => fixture,
            Err(RepoRetrieveError::NotFound) => {
                return Err(SubmitScratchNoticeError::FixtureNotFound(fixture_id));
            }
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to load fixture {}: {}", fixture_id, e);
                return Err(SubmitScratchNoticeError::StorageError);
            }
        };
        if fixture.side_of(team).is_none() {
            return Err(SubmitScratchNoticeError::TeamNotInFixture {
                fixture: fixture_id,
                team,
            });
        }
        if fixture.status == FixtureStatus::Completed {
            return Err(SubmitScratchNoticeError::FixtureCompleted(fixture_id));
        }

        // a resubmission keeps an acknowledgement already granted
        let acknowledged_at = match self
            .notice_repository
            .get_scratch_notice(fixture_id, team)
            .await
        {
            Ok(existing) => existing.acknowledged_at,
            Err(RepoRetrieveError::NotFound) => None,
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to load scratch notice for fixture {}: {}", fixture_id, e);
                return Err(SubmitScratchNoticeError::StorageError);
            }
        };

        let notice = ScratchNotice {
            fixture: fixture_id,
            team,
            message,
            submitted_at: now,
            acknowledged_at,
        };
        self.notice_repository
            .save_scratch_notice(notice)
            .await
            .map_err(|e| {
                log::error!("Failed to save scratch notice for fixture {}: {}", fixture_id, e);
                SubmitScratchNoticeError::StorageError
            })?;

        log::info!(
            "Team {} filed a scratch notice for fixture {}",
            team,
            fixture_id
        );
        Ok(())
    }
}
