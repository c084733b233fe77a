use std::sync::Arc;

use interclub_core::{
    Division, SeasonId,
    schedule::{ScheduleError, schedule_round_robin},
};
use thiserror::Error;

use crate::{
    domain::{Actor, fixture::FixtureRepository},
    ports::season::SeasonConfigurationPort,
};

#[async_trait::async_trait]
pub trait GenerateFixturesUseCase {
    /// Rebuilds the regular calendar of a division and returns the number of
    /// fixtures created.
    async fn generate_fixtures(
        &self,
        actor: Actor,
        season: SeasonId,
        division: Division,
    ) -> Result<usize, GenerateFixturesError>;
}

#[derive(Debug, Error)]
pub enum GenerateFixturesError {
    #[error("only administrators may generate fixtures")]
    Forbidden,
    #[error("division {division} needs at least two teams, found {found}")]
    NotEnoughTeams { division: Division, found: usize },
    #[error(transparent)]
    InvalidConfiguration(#[from] ScheduleError),
    #[error("storage failure")]
    StorageError,
}

pub struct GenerateFixturesUseCaseImpl<S: SeasonConfigurationPort, F: FixtureRepository> {
    season_port: Arc<S>,
    fixture_repository: Arc<F>,
}

impl<S: SeasonConfigurationPort, F: FixtureRepository> GenerateFixturesUseCaseImpl<S, F> {
    pub fn new(season_port: Arc<S>, fixture_repository: Arc<F>) -> Self {
        Self {
            season_port,
            fixture_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    S: SeasonConfigurationPort + Send + Sync + 'static,
    F: FixtureRepository + Send + Sync + 'static,
> GenerateFixturesUseCase for GenerateFixturesUseCaseImpl<S, F>
{
    async fn generate_fixtures(
        &self,
        actor: Actor,
        season: SeasonId,
        division: Division,
    ) -> Result<usize, GenerateFixturesError> {
        if !actor.is_admin() {
            return Err(GenerateFixturesError::Forbidden);
        }

        let teams = self
            .season_port
            .list_teams(season, division)
            .await
            .map_err(|e| {
                log::error!("Failed to list teams of division {}: {}", division, e);
                GenerateFixturesError::StorageError
            })?;
        if teams.len() < 2 {
            return Err(GenerateFixturesError::NotEnoughTeams {
                division,
                found: teams.len(),
            });
        }

        let rounds = self
            .season_port
            .list_round_dates(season, division)
            .await
            .map_err(|e| {
                log::error!("Failed to list round dates of division {}: {}", division, e);
                GenerateFixturesError::StorageError
            })?;

        let planned = schedule_round_robin(&teams, &rounds)?;
        let created = self
            .fixture_repository
            .replace_regular_fixtures(season, division, planned)
            .await
            .map_err(|e| {
                log::error!("Failed to store fixtures of division {}: {}", division, e);
                GenerateFixturesError::StorageError
            })?;

        log::info!(
            "Generated {} fixtures for season {} division {}",
            created.len(),
            season,
            division
        );
        Ok(created.len())
    }
}

#[cfg(test)]
mod tests {
    use interclub_core::{ClubId, FixtureKind, KnockoutStage, PlannedFixture, TeamId};

    use crate::memory::{MemoryStore, testing::*};

    use super::*;

    fn use_case(store: Arc<MemoryStore>) -> GenerateFixturesUseCaseImpl<MemoryStore, MemoryStore> {
        GenerateFixturesUseCaseImpl::new(store.clone(), store)
    }

    #[tokio::test]
    async fn test_generates_full_round_robin() {
        let store = Arc::new(seeded_store(6));
        let created = use_case(store.clone())
            .generate_fixtures(Actor::Administrator, SEASON, Division::One)
            .await
            .unwrap();
        assert_eq!(created, 15);
    }

    #[tokio::test]
    async fn test_regeneration_leaves_other_division_and_finals_alone() {
        let store = Arc::new(seeded_store(6));
        let generate = use_case(store.clone());
        generate
            .generate_fixtures(Actor::Administrator, SEASON, Division::One)
            .await
            .unwrap();
        generate
            .generate_fixtures(Actor::Administrator, SEASON, Division::Two)
            .await
            .unwrap();
        store
            .create_knockout_fixtures(
                SEASON,
                Division::One,
                vec![PlannedFixture {
                    division: Division::One,
                    round: 6,
                    date: round_dates(1)[0].date,
                    host_club: ClubId(1),
                    team1: TeamId(1),
                    team2: TeamId(2),
                    kind: FixtureKind::Knockout(KnockoutStage::Championship),
                }],
            )
            .await
            .unwrap();
        let division_two = store.list_fixtures(SEASON, Division::Two).await.unwrap();

        generate
            .generate_fixtures(Actor::Administrator, SEASON, Division::One)
            .await
            .unwrap();

        let division_one = store.list_fixtures(SEASON, Division::One).await.unwrap();
        assert_eq!(division_one.len(), 16);
        assert_eq!(
            division_one.iter().filter(|f| f.kind.is_knockout()).count(),
            1
        );
        assert_eq!(
            store.list_fixtures(SEASON, Division::Two).await.unwrap(),
            division_two
        );
    }

    #[tokio::test]
    async fn test_single_team_is_rejected_without_touching_fixtures() {
        let store = Arc::new(MemoryStore::new());
        store.add_team(SEASON, team(1, Division::One));
        store.set_round_dates(SEASON, Division::One, round_dates(5));
        let existing = PlannedFixture {
            division: Division::One,
            round: 1,
            date: round_dates(1)[0].date,
            host_club: ClubId(1),
            team1: TeamId(1),
            team2: TeamId(9),
            kind: FixtureKind::Regular,
        };
        store
            .replace_regular_fixtures(SEASON, Division::One, vec![existing])
            .await
            .unwrap();

        let result = use_case(store.clone())
            .generate_fixtures(Actor::Administrator, SEASON, Division::One)
            .await;
        assert!(matches!(
            result,
            Err(GenerateFixturesError::NotEnoughTeams { found: 1, .. })
        ));
        assert_eq!(
            store.list_fixtures(SEASON, Division::One).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_captains_cannot_generate() {
        let store = Arc::new(seeded_store(4));
        let result = use_case(store)
            .generate_fixtures(Actor::Captain(TeamId(1)), SEASON, Division::One)
            .await;
        assert!(matches!(result, Err(GenerateFixturesError::Forbidden)));
    }
}
