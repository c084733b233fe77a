use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use interclub_core::{
    FixtureId, TeamId,
    lock::{LockContext, SelectionLockState, selection_lock_state},
};
use thiserror::Error;

use crate::domain::{
    Actor, RepoRetrieveError, fixture::FixtureRepository, selection::ScratchNoticeRepository,
};

#[async_trait::async_trait]
pub trait GetSelectionLockUseCase {
    async fn get_selection_lock(
        &self,
        actor: Actor,
        fixture: FixtureId,
        team: TeamId,
        now: DateTime<Utc>,
    ) -> Result<SelectionLockState, GetSelectionLockError>;
}

#[derive(Debug, Error)]
pub enum GetSelectionLockError {
    #[error("not allowed to act for team {0}")]
    Forbidden(TeamId),
    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),
    #[error("team {team} does not play in fixture {fixture}")]
    TeamNotInFixture { fixture: FixtureId, team: TeamId },
    #[error("storage failure")]
    StorageError,
}

pub struct GetSelectionLockUseCaseImpl<F: FixtureRepository, N: ScratchNoticeRepository> {
    fixture_repository: Arc<F>,
    notice_repository: Arc<N>,
    time_zone: Tz,
}

impl<F: FixtureRepository, N: ScratchNoticeRepository> GetSelectionLockUseCaseImpl<F, N> {
    pub fn new(fixture_repository: Arc<F>, notice_repository: Arc<N>, time_zone: Tz) -> Self {
        Self {
            fixture_repository,
            notice_repository,
            time_zone,
        }
    }
}

#[async_trait::async_trait]
impl<
    F: FixtureRepository + Send + Sync + 'static,
    N: ScratchNoticeRepository + Send + Sync + 'static,
> GetSelectionLockUseCase for GetSelectionLockUseCaseImpl<F, N>
{
    async fn get_selection_lock(
        &self,
        actor: Actor,
        fixture_id: FixtureId,
        team: TeamId,
        now: DateTime<Utc>,
    ) -> Result<SelectionLockState, GetSelectionLockError> {
        if !actor.may_act_for(team) {
            return Err(GetSelectionLockError::Forbidden(team));
        }

        let fixture = match self.fixture_repository.get_fixture(fixture_id).await {
            Ok(fixture) => fixture,
            Err(RepoRetrieveError::NotFound) => {
                return Err(GetSelectionLockError::FixtureNotFound(fixture_id));
            }
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to load fixture {}: {}", fixture_id, e);
                return Err(GetSelectionLockError::StorageError);
            }
        };
        if fixture.side_of(team).is_none() {
            return Err(GetSelectionLockError::TeamNotInFixture {
                fixture: fixture_id,
                team,
            });
        }

        let exception_acknowledged = match self
            .notice_repository
            .get_scratch_notice(fixture_id, team)
            .await
        {
            Ok(notice) => notice.is_acknowledged(),
            Err(RepoRetrieveError::NotFound) => false,
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!(
                    "Failed to load scratch notice of team {} for fixture {}: {}",
                    team,
                    fixture_id,
                    e
                );
                return Err(GetSelectionLockError::StorageError);
            }
        };

        let context = LockContext {
            match_date: fixture.date,
            override_until: fixture.selection_override_until,
            exception_acknowledged,
            is_platform_admin: actor.is_admin(),
        };
        Ok(selection_lock_state(now, &context, &self.time_zone))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use interclub_core::lock::OverrideSource;

    use crate::{
        domain::selection::ScratchNotice,
        memory::{MemoryStore, testing::*},
    };

    use super::*;

    fn zone() -> Tz {
        chrono_tz::Europe::Paris
    }

    fn use_case(store: &Arc<MemoryStore>) -> GetSelectionLockUseCaseImpl<MemoryStore, MemoryStore> {
        GetSelectionLockUseCaseImpl::new(store.clone(), store.clone(), zone())
    }

    // first round is played on Sunday 2025-04-06, selections close Friday 17:00
    fn saturday() -> DateTime<Utc> {
        zone()
            .with_ymd_and_hms(2025, 4, 5, 10, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn test_lock_follows_deadline() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        let lock = use_case(&store);

        let thursday = zone()
            .with_ymd_and_hms(2025, 4, 3, 20, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let state = lock
            .get_selection_lock(Actor::Captain(TeamId(1)), fixture.id, TeamId(1), thursday)
            .await
            .unwrap();
        assert!(matches!(state, SelectionLockState::Open { .. }));

        let state = lock
            .get_selection_lock(Actor::Captain(TeamId(1)), fixture.id, TeamId(1), saturday())
            .await
            .unwrap();
        assert!(matches!(state, SelectionLockState::Locked { .. }));

        let state = lock
            .get_selection_lock(Actor::Administrator, fixture.id, TeamId(1), saturday())
            .await
            .unwrap();
        assert_eq!(
            state,
            SelectionLockState::OverrideOpen(OverrideSource::Administrator)
        );
    }

    #[tokio::test]
    async fn test_deadline_follows_summer_time() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        let lock = use_case(&store);

        // Paris is on UTC+2 by April, so Friday 17:00 is 15:00 UTC
        let before = Utc.with_ymd_and_hms(2025, 4, 4, 14, 59, 0).unwrap();
        let state = lock
            .get_selection_lock(Actor::Captain(TeamId(1)), fixture.id, TeamId(1), before)
            .await
            .unwrap();
        assert_eq!(
            state,
            SelectionLockState::Open {
                deadline: Utc.with_ymd_and_hms(2025, 4, 4, 15, 0, 0).unwrap()
            }
        );

        let after = Utc.with_ymd_and_hms(2025, 4, 4, 15, 30, 0).unwrap();
        let state = lock
            .get_selection_lock(Actor::Captain(TeamId(1)), fixture.id, TeamId(1), after)
            .await
            .unwrap();
        assert!(!state.allows_edits());
    }

    #[tokio::test]
    async fn test_acknowledged_exception_reopens_only_that_team() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        store
            .save_scratch_notice(ScratchNotice {
                fixture: fixture.id,
                team: TeamId(2),
                message: "Two players injured".to_string(),
                submitted_at: saturday(),
                acknowledged_at: Some(saturday()),
            })
            .await
            .unwrap();
        let lock = use_case(&store);

        let team2 = lock
            .get_selection_lock(Actor::Captain(TeamId(2)), fixture.id, TeamId(2), saturday())
            .await
            .unwrap();
        assert_eq!(
            team2,
            SelectionLockState::OverrideOpen(OverrideSource::ScratchException)
        );
        let team1 = lock
            .get_selection_lock(Actor::Captain(TeamId(1)), fixture.id, TeamId(1), saturday())
            .await
            .unwrap();
        assert!(!team1.allows_edits());
    }

    #[tokio::test]
    async fn test_foreign_captain_and_team_are_rejected() {
        let store = Arc::new(seeded_store(3));
        let fixture = regular_fixture(&store).await;
        let lock = use_case(&store);

        assert!(matches!(
            lock.get_selection_lock(Actor::Captain(TeamId(2)), fixture.id, TeamId(1), saturday())
                .await,
            Err(GetSelectionLockError::Forbidden(_))
        ));
        assert!(matches!(
            lock.get_selection_lock(Actor::Administrator, fixture.id, TeamId(3), saturday())
                .await,
            Err(GetSelectionLockError::TeamNotInFixture { .. })
        ));
    }
}
