use interclub_app::{
    domain::{RepoError, RepoRetrieveError},
    ports::{directory::PlayerDirectoryPort, season::SeasonConfigurationPort},
};
use interclub_core::{ClubId, Division, Player, PlayerId, RoundDate, SeasonId, Team, TeamId};
use sqlx::{Row, sqlite::SqliteRow};

use crate::{SqliteStore, codec};

fn team_from_row(row: &SqliteRow) -> sqlx::Result<Team> {
    Ok(Team {
        id: TeamId(row.try_get("id")?),
        club: ClubId(row.try_get("club")?),
        division: codec::division(row.try_get("division")?)?,
        name: row.try_get("name")?,
    })
}

fn player_from_row(row: &SqliteRow) -> sqlx::Result<Player> {
    Ok(Player {
        id: PlayerId(row.try_get("id")?),
        club: ClubId(row.try_get("club")?),
        handicap_index: row.try_get("handicap_index")?,
        gender: codec::gender(row.try_get("gender")?)?,
        junior: row.try_get("junior")?,
        validated: row.try_get("validated")?,
    })
}

fn round_date_from_row(row: &SqliteRow) -> sqlx::Result<RoundDate> {
    let host: Option<i64> = row.try_get("host_club")?;
    Ok(RoundDate {
        round: codec::small(row.try_get("round")?, "round")?,
        date: codec::date(row.try_get("date")?)?,
        host: host.map(ClubId),
    })
}

#[async_trait::async_trait]
impl SeasonConfigurationPort for SqliteStore {
    async fn list_teams(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<Team>, RepoError> {
        let rows = sqlx::query("SELECT * FROM teams WHERE season = ? AND division = ? ORDER BY id")
            .bind(season.0)
            .bind(division.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        rows.iter()
            .map(team_from_row)
            .collect::<sqlx::Result<_>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn get_team(&self, team: TeamId) -> Result<Team, RepoRetrieveError> {
        let row = sqlx::query("SELECT * FROM teams WHERE id = ?")
            .bind(team.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        team_from_row(&row).map_err(|e| RepoRetrieveError::StorageError(e.to_string()))
    }

    async fn list_round_dates(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<RoundDate>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM round_dates WHERE season = ? AND division = ? ORDER BY round",
        )
        .bind(season.0)
        .bind(division.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::StorageError(e.to_string()))?;
        rows.iter()
            .map(round_date_from_row)
            .collect::<sqlx::Result<_>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl PlayerDirectoryPort for SqliteStore {
    async fn get_players(&self, players: &[PlayerId]) -> Result<Vec<Player>, RepoError> {
        if players.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; players.len()].join(", ");
        let statement = format!("SELECT * FROM players WHERE id IN ({})", placeholders);
        let mut query = sqlx::query(&statement);
        for player in players {
            query = query.bind(player.0);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        rows.iter()
            .map(player_from_row)
            .collect::<sqlx::Result<_>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::*;

    use super::*;

    #[tokio::test]
    async fn test_roster_and_round_dates_are_read_back() {
        let store = seeded_store(3).await;

        let teams = store.list_teams(SEASON, Division::One).await.unwrap();
        assert_eq!(teams, vec![team(1), team(2), team(3)]);
        assert!(
            store
                .list_teams(SEASON, Division::Two)
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(store.get_team(TeamId(2)).await.unwrap(), team(2));
        assert!(matches!(
            store.get_team(TeamId(9)).await,
            Err(RepoRetrieveError::NotFound)
        ));

        let dates = store.list_round_dates(SEASON, Division::One).await.unwrap();
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[4].round, 5);
        assert_eq!(dates[4].date.to_string(), "2025-06-01");
    }

    #[tokio::test]
    async fn test_unknown_players_are_left_out() {
        let store = seeded_store(1).await;

        let players = store
            .get_players(&[player_id(1, 3), PlayerId(999), player_id(1, 10)])
            .await
            .unwrap();
        assert_eq!(players.len(), 2);
        let junior = players.iter().find(|p| p.id == player_id(1, 10)).unwrap();
        assert!(junior.junior);
        assert_eq!(junior.handicap_index, 25.0);
        assert!(store.get_players(&[]).await.unwrap().is_empty());
    }
}
