use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use interclub_core::{
    ClubId, FixtureId, FixtureStatus, PlayerId, SelectionEntry, TeamId,
    lock::SelectionLockState,
    pairing::{PairingError, check_selection},
};
use thiserror::Error;

use crate::{
    domain::{
        Actor, RepoRetrieveError, fixture::FixtureRepository, selection::SelectionRepository,
    },
    ports::{directory::PlayerDirectoryPort, season::SeasonConfigurationPort},
    workflow::{
        pairings::generate::{GeneratePairingsError, GeneratePairingsUseCase},
        selection::lock::{GetSelectionLockError, GetSelectionLockUseCase},
    },
};

#[async_trait::async_trait]
pub trait SubmitSelectionUseCase {
    /// Replaces a team's selection for a fixture and regenerates the
    /// fixture's pairings. Returns the number of matches generated.
    async fn submit_selection(
        &self,
        actor: Actor,
        fixture: FixtureId,
        team: TeamId,
        entries: Vec<SelectionEntry>,
        now: DateTime<Utc>,
    ) -> Result<usize, SubmitSelectionError>;
}

#[derive(Debug, Error)]
pub enum SubmitSelectionError {
    #[error("not allowed to act for team {0}")]
    Forbidden(TeamId),
    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),
    #[error("team {team} does not play in fixture {fixture}")]
    TeamNotInFixture { fixture: FixtureId, team: TeamId },
    #[error("team {0} is not configured for the season")]
    TeamNotFound(TeamId),
    #[error("fixture {0} is already completed")]
    FixtureCompleted(FixtureId),
    #[error("selections closed at {deadline}")]
    Locked { deadline: DateTime<Utc> },
    #[error(transparent)]
    InvalidSelection(#[from] PairingError),
    #[error("player {0} is not in the player directory")]
    UnknownPlayer(PlayerId),
    #[error("player {player} is not a member of club {club}")]
    PlayerNotInClub { player: PlayerId, club: ClubId },
    #[error("selection saved, but pairings could not be generated: {0}")]
    Pairings(GeneratePairingsError),
    #[error("storage failure")]
    StorageError,
}

impl From<GetSelectionLockError> for SubmitSelectionError {
    fn from(error: GetSelectionLockError) -> Self {
        match error {
            GetSelectionLockError::Forbidden(team) => SubmitSelectionError::Forbidden(team),
            GetSelectionLockError::FixtureNotFound(fixture) => {
                SubmitSelectionError::FixtureNotFound(fixture)
            }
            GetSelectionLockError::TeamNotInFixture { fixture, team } => {
                SubmitSelectionError::TeamNotInFixture { fixture, team }
            }
            GetSelectionLockError::StorageError => SubmitSelectionError::StorageError,
        }
    }
}

pub struct SubmitSelectionUseCaseImpl<
    F: FixtureRepository,
    S: SelectionRepository,
    C: SeasonConfigurationPort,
    P: PlayerDirectoryPort,
    L: GetSelectionLockUseCase,
    G: GeneratePairingsUseCase,
> {
    fixture_repository: Arc<F>,
    selection_repository: Arc<S>,
    season_port: Arc<C>,
    player_directory: Arc<P>,
    lock_use_case: Arc<L>,
    pairings_use_case: Arc<G>,
}

impl<
    F: FixtureRepository,
    S: SelectionRepository,
    C: SeasonConfigurationPort,
    P: PlayerDirectoryPort,
    L: GetSelectionLockUseCase,
    G: GeneratePairingsUseCase,
> SubmitSelectionUseCaseImpl<F, S, C, P, L, G>
{
    pub fn new(
        fixture_repository: Arc<F>,
        selection_repository: Arc<S>,
        season_port: Arc<C>,
        player_directory: Arc<P>,
        lock_use_case: Arc<L>,
        pairings_use_case: Arc<G>,
    ) -> Self {
        Self {
            fixture_repository,
            selection_repository,
            season_port,
            player_directory,
            lock_use_case,
            pairings_use_case,
        }
    }

    async fn check_club_membership(
        &self,
        team: TeamId,
        entries: &[SelectionEntry],
    ) -> Result<(), SubmitSelectionError> {
        let club = match self.season_port.get_team(team).await {
            Ok(team) => team.club,
            Err(RepoRetrieveError::NotFound) => return Err(SubmitSelectionError::TeamNotFound(team)),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to load team {}: {}", team, e);
                return Err(SubmitSelectionError::StorageError);
            }
        };

        let ids: Vec<PlayerId> = entries.iter().map(|e| e.player).collect();
        let clubs: HashMap<PlayerId, ClubId> = self
            .player_directory
            .get_players(&ids)
            .await
            .map_err(|e| {
                log::error!("Failed to look up selected players: {}", e);
                SubmitSelectionError::StorageError
            })?
            .into_iter()
            .map(|p| (p.id, p.club))
            .collect();

        for player in ids {
            match clubs.get(&player) {
                None => return Err(SubmitSelectionError::UnknownPlayer(player)),
                Some(member_of) if *member_of != club => {
                    return Err(SubmitSelectionError::PlayerNotInClub { player, club });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<
    F: FixtureRepository + Send + Sync + 'static,
    S: SelectionRepository + Send + Sync + 'static,
    C: SeasonConfigurationPort + Send + Sync + 'static,
    P: PlayerDirectoryPort + Send + Sync + 'static,
    L: GetSelectionLockUseCase + Send + Sync + 'static,
    G: GeneratePairingsUseCase + Send + Sync + 'static,
> SubmitSelectionUseCase for SubmitSelectionUseCaseImpl<F, S, C, P, L, G>
{
    async fn submit_selection(
        &self,
        actor: Actor,
        fixture_id: FixtureId,
        team: TeamId,
        entries: Vec<SelectionEntry>,
        now: DateTime<Utc>,
    ) -> Result<usize, SubmitSelectionError> {
        if !actor.may_act_for(team) {
            return Err(SubmitSelectionError::Forbidden(team));
        }

        let fixture = match self.fixture_repository.get_fixture(fixture_id).await {
            Ok(fixture) => fixture,
            Err(RepoRetrieveError::NotFound) => {
                return Err(SubmitSelectionError::FixtureNotFound(fixture_id));
            }
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to load fixture {}: {}", fixture_id, e);
                return Err(SubmitSelectionError::StorageError);
            }
        };
        let Some(side) = fixture.side_of(team) else {
            return Err(SubmitSelectionError::TeamNotInFixture {
                fixture: fixture_id,
                team,
            });
        };
        if fixture.status == FixtureStatus::Completed {
            return Err(SubmitSelectionError::FixtureCompleted(fixture_id));
        }

        let lock = self
            .lock_use_case
            .get_selection_lock(actor, fixture_id, team, now)
            .await?;
        if let SelectionLockState::Locked { deadline } = lock {
            log::warn!(
                "Rejected selection of team {} for fixture {}, closed at {}",
                team,
                fixture_id,
                deadline
            );
            return Err(SubmitSelectionError::Locked { deadline });
        }

        check_selection(fixture.kind, side, &entries)?;
        self.check_club_membership(team, &entries).await?;

        let count = entries.len();
        self.selection_repository
            .replace_selection(fixture_id, team, entries)
            .await
            .map_err(|e| {
                log::error!(
                    "Failed to store selection of team {} for fixture {}: {}",
                    team,
                    fixture_id,
                    e
                );
                SubmitSelectionError::StorageError
            })?;
        log::info!(
            "Team {} selected {} players for fixture {}",
            team,
            count,
            fixture_id
        );

        self.pairings_use_case
            .generate_pairings(fixture_id)
            .await
            .map_err(SubmitSelectionError::Pairings)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use interclub_core::{MatchResult, SlotLineup};

    use crate::{
        memory::{MemoryStore, testing::*},
        workflow::{
            fixtures::selection_override::{
                SetSelectionOverrideUseCase, SetSelectionOverrideUseCaseImpl,
            },
            pairings::generate::GeneratePairingsUseCaseImpl,
            selection::lock::GetSelectionLockUseCaseImpl,
        },
    };

    use super::*;

    type Lock = GetSelectionLockUseCaseImpl<MemoryStore, MemoryStore>;
    type Pairings = GeneratePairingsUseCaseImpl<MemoryStore, MemoryStore, MemoryStore>;

    fn use_case(
        store: &Arc<MemoryStore>,
    ) -> SubmitSelectionUseCaseImpl<MemoryStore, MemoryStore, MemoryStore, MemoryStore, Lock, Pairings>
    {
        SubmitSelectionUseCaseImpl::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(GetSelectionLockUseCaseImpl::new(
                store.clone(),
                store.clone(),
                chrono_tz::Europe::Paris,
            )),
            Arc::new(GeneratePairingsUseCaseImpl::new(
                store.clone(),
                store.clone(),
                store.clone(),
            )),
        )
    }

    fn wednesday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, 12, 0, 0).unwrap()
    }

    fn saturday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 5, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_submission_regenerates_pairings() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        let submit = use_case(&store);

        let count = submit
            .submit_selection(
                Actor::Captain(TeamId(1)),
                fixture.id,
                TeamId(1),
                entries(1, 8),
                wednesday(),
            )
            .await
            .unwrap();
        assert_eq!(count, 8);

        submit
            .submit_selection(
                Actor::Captain(TeamId(2)),
                fixture.id,
                TeamId(2),
                entries(2, 5),
                wednesday(),
            )
            .await
            .unwrap();

        let matches = store.get_individual_matches(fixture.id).await.unwrap();
        let played = matches
            .iter()
            .filter(|m| matches!(m.lineup, SlotLineup::BothPresent { .. }))
            .count();
        assert_eq!(played, 5);
        assert!(
            matches[5..]
                .iter()
                .all(|m| m.result == MatchResult::Side1 && m.forfeit_reason.is_some())
        );
    }

    #[tokio::test]
    async fn test_locked_selection_is_rejected_until_overridden() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        let submit = use_case(&store);

        let result = submit
            .submit_selection(
                Actor::Captain(TeamId(1)),
                fixture.id,
                TeamId(1),
                entries(1, 8),
                saturday(),
            )
            .await;
        assert!(matches!(result, Err(SubmitSelectionError::Locked { .. })));
        assert!(
            store
                .get_selection(fixture.id, TeamId(1))
                .await
                .unwrap()
                .is_empty()
        );

        SetSelectionOverrideUseCaseImpl::new(store.clone())
            .set_selection_override(
                Actor::Administrator,
                fixture.id,
                Some(saturday() + chrono::TimeDelta::hours(2)),
            )
            .await
            .unwrap();
        submit
            .submit_selection(
                Actor::Captain(TeamId(1)),
                fixture.id,
                TeamId(1),
                entries(1, 8),
                saturday(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejects_players_from_other_clubs() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;

        let result = use_case(&store)
            .submit_selection(
                Actor::Captain(TeamId(1)),
                fixture.id,
                TeamId(1),
                entries(2, 3),
                wednesday(),
            )
            .await;
        assert!(matches!(
            result,
            Err(SubmitSelectionError::PlayerNotInClub { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_malformed_selection() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        let mut gapped = entries(1, 3);
        gapped[2].order = 5;

        let result = use_case(&store)
            .submit_selection(
                Actor::Captain(TeamId(1)),
                fixture.id,
                TeamId(1),
                gapped,
                wednesday(),
            )
            .await;
        assert!(matches!(
            result,
            Err(SubmitSelectionError::InvalidSelection(
                PairingError::OrderNotDense { .. }
            ))
        ));
    }
}
