use interclub_core::{Division, RoundDate, SeasonId, Team, TeamId};

use crate::domain::{RepoError, RepoRetrieveError};

/// Read access to season configuration, which is owned elsewhere.
#[async_trait::async_trait]
pub trait SeasonConfigurationPort {
    /// Teams taking part in a division, in registration order.
    async fn list_teams(&self, season: SeasonId, division: Division)
    -> Result<Vec<Team>, RepoError>;
    async fn get_team(&self, team: TeamId) -> Result<Team, RepoRetrieveError>;
    /// Regular round descriptors of a division, in round order.
    async fn list_round_dates(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<RoundDate>, RepoError>;
}
