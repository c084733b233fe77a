use std::str::FromStr;

use interclub_core::{Division, Player, RoundDate, SeasonId, Team};
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

mod codec;
pub mod fixtures;
pub mod season;
pub mod selections;

const SCHEMA: [&str; 7] = [
    "CREATE TABLE IF NOT EXISTS teams (
        id INTEGER PRIMARY KEY,
        season INTEGER NOT NULL,
        division TEXT NOT NULL,
        club INTEGER NOT NULL,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY,
        club INTEGER NOT NULL,
        handicap_index REAL NOT NULL,
        gender TEXT NOT NULL,
        junior INTEGER NOT NULL,
        validated INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS round_dates (
        season INTEGER NOT NULL,
        division TEXT NOT NULL,
        round INTEGER NOT NULL,
        date TEXT NOT NULL,
        host_club INTEGER,
        PRIMARY KEY (season, division, round)
    )",
    "CREATE TABLE IF NOT EXISTS fixtures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        season INTEGER NOT NULL,
        division TEXT NOT NULL,
        round INTEGER NOT NULL,
        date TEXT NOT NULL,
        host_club INTEGER NOT NULL,
        team1 INTEGER NOT NULL,
        team2 INTEGER NOT NULL,
        team1_points REAL NOT NULL DEFAULT 0,
        team2_points REAL NOT NULL DEFAULT 0,
        status TEXT NOT NULL,
        kind TEXT NOT NULL,
        selection_override_until TEXT
    )",
    "CREATE TABLE IF NOT EXISTS individual_matches (
        fixture INTEGER NOT NULL,
        slot INTEGER NOT NULL,
        side1_player INTEGER,
        side1_partner INTEGER,
        side1_handicap REAL,
        side2_player INTEGER,
        side2_partner INTEGER,
        side2_handicap REAL,
        strokes_given INTEGER NOT NULL,
        receiver INTEGER,
        result TEXT NOT NULL,
        points1 REAL NOT NULL,
        points2 REAL NOT NULL,
        forfeit_reason TEXT,
        PRIMARY KEY (fixture, slot)
    )",
    "CREATE TABLE IF NOT EXISTS selections (
        fixture INTEGER NOT NULL,
        team INTEGER NOT NULL,
        player INTEGER NOT NULL,
        position INTEGER NOT NULL,
        PRIMARY KEY (fixture, team, player)
    )",
    "CREATE TABLE IF NOT EXISTS scratch_notices (
        fixture INTEGER NOT NULL,
        team INTEGER NOT NULL,
        message TEXT NOT NULL,
        submitted_at TEXT NOT NULL,
        acknowledged_at TEXT,
        PRIMARY KEY (fixture, team)
    )",
];

/// Every port and repository of the interclub application backed by one
/// SQLite database.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub fn new(db_path: &str) -> Self {
        let conn_options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(conn_options);
        Self { pool }
    }

    /// A private database that lives as long as the store. The pool keeps
    /// exactly one connection open since every connection to `:memory:`
    /// would otherwise see its own empty database.
    pub async fn in_memory() -> sqlx::Result<Self> {
        let conn_options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(conn_options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> sqlx::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Registers a team for a season. Rosters are maintained by the season
    /// administration, the engine only reads them.
    pub async fn insert_team(&self, season: SeasonId, team: &Team) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO teams (id, season, division, club, name) VALUES (?, ?, ?, ?, ?)")
            .bind(team.id.0)
            .bind(season.0)
            .bind(team.division.as_str())
            .bind(team.club.0)
            .bind(team.name.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn upsert_player(&self, player: &Player) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO players (id, club, handicap_index, gender, junior, validated)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                club = excluded.club,
                handicap_index = excluded.handicap_index,
                gender = excluded.gender,
                junior = excluded.junior,
                validated = excluded.validated",
        )
        .bind(player.id.0)
        .bind(player.club.0)
        .bind(player.handicap_index)
        .bind(codec::gender_to_str(player.gender))
        .bind(player.junior)
        .bind(player.validated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_round_dates(
        &self,
        season: SeasonId,
        division: Division,
        dates: &[RoundDate],
    ) -> sqlx::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM round_dates WHERE season = ? AND division = ?")
            .bind(season.0)
            .bind(division.as_str())
            .execute(&mut *tx)
            .await?;
        for date in dates {
            sqlx::query(
                "INSERT INTO round_dates (season, division, round, date, host_club)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(season.0)
            .bind(division.as_str())
            .bind(i64::from(date.round))
            .bind(codec::date_to_str(date.date))
            .bind(date.host.map(|club| club.0))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{Duration, NaiveDate};
    use interclub_core::{ClubId, Gender, PlayerId, TeamId};

    use super::*;

    pub const SEASON: SeasonId = SeasonId(2025);

    pub fn team(id: i64) -> Team {
        Team {
            id: TeamId(id),
            club: ClubId(id),
            division: Division::One,
            name: format!("Club {} I", id),
        }
    }

    pub fn player_id(club: i64, n: i64) -> PlayerId {
        PlayerId(club * 100 + n)
    }

    /// Teams 1..=count in division one, each club with ten players and
    /// five Sundays of play.
    pub async fn seeded_store(count: i64) -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();
        for id in 1..=count {
            store.insert_team(SEASON, &team(id)).await.unwrap();
            for n in 1..=10 {
                store
                    .upsert_player(&Player {
                        id: player_id(id, n),
                        club: ClubId(id),
                        handicap_index: n as f64 * 2.5,
                        gender: if n % 2 == 0 { Gender::Female } else { Gender::Male },
                        junior: n == 10,
                        validated: true,
                    })
                    .await
                    .unwrap();
            }
        }
        let first = NaiveDate::from_ymd_opt(2025, 4, 6).unwrap();
        let dates: Vec<RoundDate> = (0..5)
            .map(|i| RoundDate {
                round: i as u8 + 1,
                date: first + Duration::days(14 * i),
                host: None,
            })
            .collect();
        store
            .set_round_dates(SEASON, Division::One, &dates)
            .await
            .unwrap();
        store
    }
}
