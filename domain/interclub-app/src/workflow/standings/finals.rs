use std::sync::Arc;

use chrono::NaiveDate;
use interclub_core::{
    ClubId, Division, SeasonId,
    finals::{FinalsError, seed_finals},
};
use thiserror::Error;

use crate::{
    domain::{Actor, RepoCreateError, fixture::FixtureRepository},
    workflow::standings::compute::ComputeStandingsUseCase,
};

#[async_trait::async_trait]
pub trait GenerateFinalsUseCase {
    /// Seeds the finals day of a division from its current standings and
    /// returns the number of fixtures created.
    async fn generate_finals(
        &self,
        actor: Actor,
        season: SeasonId,
        division: Division,
        date: NaiveDate,
        host: ClubId,
    ) -> Result<usize, GenerateFinalsError>;
}

#[derive(Debug, Error)]
pub enum GenerateFinalsError {
    #[error("only administrators may generate finals")]
    Forbidden,
    #[error(transparent)]
    NotSeedable(#[from] FinalsError),
    #[error("finals of division {0} were already generated")]
    AlreadyGenerated(Division),
    #[error("storage failure")]
    StorageError,
}

pub struct GenerateFinalsUseCaseImpl<S: ComputeStandingsUseCase, F: FixtureRepository> {
    standings_use_case: Arc<S>,
    fixture_repository: Arc<F>,
}

impl<S: ComputeStandingsUseCase, F: FixtureRepository> GenerateFinalsUseCaseImpl<S, F> {
    pub fn new(standings_use_case: Arc<S>, fixture_repository: Arc<F>) -> Self {
        Self {
            standings_use_case,
            fixture_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    S: ComputeStandingsUseCase + Send + Sync + 'static,
    F: FixtureRepository + Send + Sync + 'static,
> GenerateFinalsUseCase for GenerateFinalsUseCaseImpl<S, F>
{
    async fn generate_finals(
        &self,
        actor: Actor,
        season: SeasonId,
        division: Division,
        date: NaiveDate,
        host: ClubId,
    ) -> Result<usize, GenerateFinalsError> {
        if !actor.is_admin() {
            return Err(GenerateFinalsError::Forbidden);
        }

        let standings = self
            .standings_use_case
            .compute_standings(season, division)
            .await
            .map_err(|_| GenerateFinalsError::StorageError)?;
        let planned = seed_finals(division, &standings, date, host)?;

        match self
            .fixture_repository
            .create_knockout_fixtures(season, division, planned)
            .await
        {
            Ok(created) => {
                log::info!(
                    "Seeded {} finals for season {} division {} on {}",
                    created.len(),
                    season,
                    division,
                    date
                );
                Ok(created.len())
            }
            Err(RepoCreateError::Conflict) => Err(GenerateFinalsError::AlreadyGenerated(division)),
            Err(RepoCreateError::StorageError(e)) => {
                log::error!("Failed to store finals of division {}: {}", division, e);
                Err(GenerateFinalsError::StorageError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use interclub_core::{
        FINALS_ROUND, FixtureId, FixtureKind, FixtureStatus, KnockoutStage, TeamId,
    };

    use crate::{
        memory::{MemoryStore, testing::*},
        workflow::{
            fixtures::generate::{GenerateFixturesUseCase, GenerateFixturesUseCaseImpl},
            standings::compute::ComputeStandingsUseCaseImpl,
        },
    };

    use super::*;

    fn use_case(
        store: &Arc<MemoryStore>,
    ) -> GenerateFinalsUseCaseImpl<ComputeStandingsUseCaseImpl<MemoryStore, MemoryStore>, MemoryStore>
    {
        GenerateFinalsUseCaseImpl::new(
            Arc::new(ComputeStandingsUseCaseImpl::new(store.clone(), store.clone())),
            store.clone(),
        )
    }

    /// Plays out every regular fixture: the team with the lower id wins 5-3.
    async fn play_season(store: &Arc<MemoryStore>, division: Division) {
        GenerateFixturesUseCaseImpl::new(store.clone(), store.clone())
            .generate_fixtures(Actor::Administrator, SEASON, division)
            .await
            .unwrap();
        let fixtures = store.list_fixtures(SEASON, division).await.unwrap();
        for fixture in fixtures {
            let side1_wins = if fixture.team1 < fixture.team2 { 5 } else { 3 };
            complete_with_wins(store, fixture.id, 8, side1_wins).await;
        }
    }

    fn finals_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 14).unwrap()
    }

    #[tokio::test]
    async fn test_finals_pair_the_top_six() {
        let store = Arc::new(seeded_store(6));
        play_season(&store, Division::One).await;

        let created = use_case(&store)
            .generate_finals(Actor::Administrator, SEASON, Division::One, finals_day(), ClubId(3))
            .await
            .unwrap();
        assert_eq!(created, 3);

        let finals: Vec<_> = store
            .list_fixtures(SEASON, Division::One)
            .await
            .unwrap()
            .into_iter()
            .filter(|f| f.round == FINALS_ROUND)
            .collect();
        let pairs: Vec<_> = finals
            .iter()
            .map(|f| (f.team1, f.team2, f.kind))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (
                    TeamId(1),
                    TeamId(2),
                    FixtureKind::Knockout(KnockoutStage::Championship)
                ),
                (
                    TeamId(3),
                    TeamId(4),
                    FixtureKind::Knockout(KnockoutStage::ThirdPlace)
                ),
                (
                    TeamId(5),
                    TeamId(6),
                    FixtureKind::Knockout(KnockoutStage::FifthPlace)
                ),
            ]
        );
        assert!(finals.iter().all(|f| f.status == FixtureStatus::Scheduled
            && f.host_club == ClubId(3)
            && f.date == finals_day()));

        assert!(matches!(
            use_case(&store)
                .generate_finals(Actor::Administrator, SEASON, Division::One, finals_day(), ClubId(3))
                .await,
            Err(GenerateFinalsError::AlreadyGenerated(Division::One))
        ));
    }

    #[tokio::test]
    async fn test_five_teams_cannot_seed_finals() {
        let store = Arc::new(seeded_store(5));
        play_season(&store, Division::Two).await;
        let before = store.list_fixtures(SEASON, Division::Two).await.unwrap();

        let result = use_case(&store)
            .generate_finals(Actor::Administrator, SEASON, Division::Two, finals_day(), ClubId(51))
            .await;
        assert!(matches!(
            result,
            Err(GenerateFinalsError::NotSeedable(FinalsError::NotEnoughTeams {
                available: 5,
                ..
            }))
        ));
        assert_eq!(store.list_fixtures(SEASON, Division::Two).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_knockout_results_do_not_count_in_standings() {
        let store = Arc::new(seeded_store(6));
        play_season(&store, Division::One).await;
        use_case(&store)
            .generate_finals(Actor::Administrator, SEASON, Division::One, finals_day(), ClubId(3))
            .await
            .unwrap();
        let before = ComputeStandingsUseCaseImpl::new(store.clone(), store.clone())
            .compute_standings(SEASON, Division::One)
            .await
            .unwrap();

        let finals: Vec<FixtureId> = store
            .list_fixtures(SEASON, Division::One)
            .await
            .unwrap()
            .into_iter()
            .filter(|f| f.kind.is_knockout())
            .map(|f| f.id)
            .collect();
        for id in finals {
            complete_with_wins(&store, id, 5, 0).await;
        }

        let after = ComputeStandingsUseCaseImpl::new(store.clone(), store.clone())
            .compute_standings(SEASON, Division::One)
            .await
            .unwrap();
        assert_eq!(before, after);
        assert_eq!(after[0].team, TeamId(1));
        assert_eq!(after[0].points, 10);
    }
}
