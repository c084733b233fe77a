use std::sync::Arc;

use interclub_core::{Division, Fixture, SeasonId, Standing, standings::compute_standings};
use thiserror::Error;

use crate::{domain::fixture::FixtureRepository, ports::season::SeasonConfigurationPort};

#[async_trait::async_trait]
pub trait ComputeStandingsUseCase {
    /// Ranks the division's teams on its completed regular fixtures.
    async fn compute_standings(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<Standing>, ComputeStandingsError>;
}

#[derive(Debug, Error)]
pub enum ComputeStandingsError {
    #[error("storage failure")]
    StorageError,
}

pub struct ComputeStandingsUseCaseImpl<C: SeasonConfigurationPort, F: FixtureRepository> {
    season_port: Arc<C>,
    fixture_repository: Arc<F>,
}

impl<C: SeasonConfigurationPort, F: FixtureRepository> ComputeStandingsUseCaseImpl<C, F> {
    pub fn new(season_port: Arc<C>, fixture_repository: Arc<F>) -> Self {
        Self {
            season_port,
            fixture_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    C: SeasonConfigurationPort + Send + Sync + 'static,
    F: FixtureRepository + Send + Sync + 'static,
> ComputeStandingsUseCase for ComputeStandingsUseCaseImpl<C, F>
{
    async fn compute_standings(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<Standing>, ComputeStandingsError> {
        let teams = self
            .season_port
            .list_teams(season, division)
            .await
            .map_err(|e| {
                log::error!("Failed to list teams of division {}: {}", division, e);
                ComputeStandingsError::StorageError
            })?;
        let regular: Vec<Fixture> = self
            .fixture_repository
            .list_fixtures(season, division)
            .await
            .map_err(|e| {
                log::error!("Failed to list fixtures of division {}: {}", division, e);
                ComputeStandingsError::StorageError
            })?
            .into_iter()
            .filter(Fixture::is_regular)
            .collect();

        Ok(compute_standings(&teams, &regular))
    }
}
