use chrono::{DateTime, Utc};
use std::convert::Infallible;

use interclub_app::domain::{
    RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError,
    fixture::{FixturePoints, FixtureRepository, FixtureWriteError},
};
use interclub_core::{
    ClubId, Division, Fixture, FixtureId, FixtureStatus, IndividualMatch, MatchResult,
    PlannedFixture, SeasonId, Side, SlotLineup, StrokeAllowance, TeamId,
    pairing::{
        CompletionError, ResultEntryError, final_points, fixture_points, merge_recorded_results,
        record_slot_result,
    },
};
use sqlx::{Row, Sqlite, Transaction, sqlite::SqliteRow};

use crate::{SqliteStore, codec};

const REGULAR_FIXTURES: &str =
    "SELECT id FROM fixtures WHERE season = ? AND division = ? AND kind = 'regular'";

fn fixture_from_row(row: &SqliteRow) -> sqlx::Result<Fixture> {
    let override_until: Option<&str> = row.try_get("selection_override_until")?;
    Ok(Fixture {
        id: FixtureId(row.try_get("id")?),
        season: SeasonId(row.try_get("season")?),
        division: codec::division(row.try_get("division")?)?,
        round: codec::small(row.try_get("round")?, "round")?,
        date: codec::date(row.try_get("date")?)?,
        host_club: ClubId(row.try_get("host_club")?),
        team1: TeamId(row.try_get("team1")?),
        team2: TeamId(row.try_get("team2")?),
        team1_points: row.try_get("team1_points")?,
        team2_points: row.try_get("team2_points")?,
        status: codec::status(row.try_get("status")?)?,
        kind: codec::kind(row.try_get("kind")?)?,
        selection_override_until: override_until.map(codec::timestamp).transpose()?,
    })
}

fn match_from_row(row: &SqliteRow) -> sqlx::Result<IndividualMatch> {
    let side1 = codec::entrant((
        row.try_get("side1_player")?,
        row.try_get("side1_partner")?,
        row.try_get("side1_handicap")?,
    ));
    let side2 = codec::entrant((
        row.try_get("side2_player")?,
        row.try_get("side2_partner")?,
        row.try_get("side2_handicap")?,
    ));
    let lineup = match (side1, side2) {
        (Some(side1), Some(side2)) => SlotLineup::BothPresent { side1, side2 },
        (Some(entrant), None) => SlotLineup::OneForfeited {
            present: Side::One,
            entrant,
        },
        (None, Some(entrant)) => SlotLineup::OneForfeited {
            present: Side::Two,
            entrant,
        },
        (None, None) => SlotLineup::NoneDesignated,
    };
    let strokes_given: i64 = row.try_get("strokes_given")?;
    let receiver: Option<i64> = row.try_get("receiver")?;
    Ok(IndividualMatch {
        slot: codec::small(row.try_get("slot")?, "slot")?,
        lineup,
        strokes: StrokeAllowance {
            strokes_given: u32::try_from(strokes_given)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            receiver: receiver.map(codec::side).transpose()?,
        },
        result: codec::result(row.try_get("result")?)?,
        points1: row.try_get("points1")?,
        points2: row.try_get("points2")?,
        forfeit_reason: row.try_get("forfeit_reason")?,
    })
}

async fn insert_fixture(
    tx: &mut Transaction<'_, Sqlite>,
    season: SeasonId,
    planned: PlannedFixture,
) -> sqlx::Result<Fixture> {
    let result = sqlx::query(
        "INSERT INTO fixtures
            (season, division, round, date, host_club, team1, team2, status, kind)
         VALUES (?, ?, ?, ?, ?, ?, ?, 'scheduled', ?)",
    )
    .bind(season.0)
    .bind(planned.division.as_str())
    .bind(i64::from(planned.round))
    .bind(codec::date_to_str(planned.date))
    .bind(planned.host_club.0)
    .bind(planned.team1.0)
    .bind(planned.team2.0)
    .bind(codec::kind_to_str(planned.kind))
    .execute(&mut **tx)
    .await?;
    Ok(Fixture::from_planned(
        FixtureId(result.last_insert_rowid()),
        season,
        planned,
    ))
}

async fn insert_match(
    tx: &mut Transaction<'_, Sqlite>,
    fixture: FixtureId,
    m: &IndividualMatch,
) -> sqlx::Result<()> {
    let (side1_player, side1_partner, side1_handicap) =
        codec::entrant_to_columns(m.lineup.entrant(Side::One));
    let (side2_player, side2_partner, side2_handicap) =
        codec::entrant_to_columns(m.lineup.entrant(Side::Two));
    sqlx::query(
        "INSERT INTO individual_matches
            (fixture, slot, side1_player, side1_partner, side1_handicap,
             side2_player, side2_partner, side2_handicap,
             strokes_given, receiver, result, points1, points2, forfeit_reason)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(fixture.0)
    .bind(i64::from(m.slot))
    .bind(side1_player)
    .bind(side1_partner)
    .bind(side1_handicap)
    .bind(side2_player)
    .bind(side2_partner)
    .bind(side2_handicap)
    .bind(i64::from(m.strokes.strokes_given))
    .bind(m.strokes.receiver.map(|side| i64::from(side.number())))
    .bind(m.result.as_str())
    .bind(m.points1)
    .bind(m.points2)
    .bind(m.forfeit_reason.as_deref())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn write_error<E>(e: sqlx::Error) -> FixtureWriteError<E> {
    FixtureWriteError::StorageError(e.to_string())
}

/// Fails unless the fixture exists and is still scheduled.
async fn ensure_scheduled<E>(
    tx: &mut Transaction<'_, Sqlite>,
    fixture: FixtureId,
) -> Result<(), FixtureWriteError<E>> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM fixtures WHERE id = ?")
        .bind(fixture.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(write_error::<E>)?;
    match status
        .as_deref()
        .map(codec::status)
        .transpose()
        .map_err(write_error::<E>)?
    {
        None => Err(FixtureWriteError::NotFound),
        Some(FixtureStatus::Completed) => Err(FixtureWriteError::Completed),
        Some(FixtureStatus::Scheduled) => Ok(()),
    }
}

async fn stored_matches(
    tx: &mut Transaction<'_, Sqlite>,
    fixture: FixtureId,
) -> sqlx::Result<Vec<IndividualMatch>> {
    let rows = sqlx::query("SELECT * FROM individual_matches WHERE fixture = ? ORDER BY slot")
        .bind(fixture.0)
        .fetch_all(&mut **tx)
        .await?;
    rows.iter().map(match_from_row).collect()
}

async fn update_points(
    tx: &mut Transaction<'_, Sqlite>,
    fixture: FixtureId,
    points: FixturePoints,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE fixtures SET team1_points = ?, team2_points = ? WHERE id = ?")
        .bind(points.0)
        .bind(points.1)
        .bind(fixture.0)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

impl SqliteStore {
    /// A transaction that takes the write lock up front, so nothing it reads
    /// can change before it commits.
    async fn begin_write(&self) -> sqlx::Result<Transaction<'static, Sqlite>> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }

    async fn fixture_exists(&self, fixture: FixtureId) -> sqlx::Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fixtures WHERE id = ?")
            .bind(fixture.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn store_regular_fixtures(
        &self,
        season: SeasonId,
        division: Division,
        planned: Vec<PlannedFixture>,
    ) -> sqlx::Result<Vec<Fixture>> {
        let mut tx = self.pool.begin().await?;
        for table in ["individual_matches", "selections", "scratch_notices"] {
            let statement = format!(
                "DELETE FROM {} WHERE fixture IN ({})",
                table, REGULAR_FIXTURES
            );
            sqlx::query(&statement)
                .bind(season.0)
                .bind(division.as_str())
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM fixtures WHERE season = ? AND division = ? AND kind = 'regular'")
            .bind(season.0)
            .bind(division.as_str())
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::with_capacity(planned.len());
        for fixture in planned {
            stored.push(insert_fixture(&mut tx, season, fixture).await?);
        }
        tx.commit().await?;
        Ok(stored)
    }
}

#[async_trait::async_trait]
impl FixtureRepository for SqliteStore {
    async fn get_fixture(&self, fixture: FixtureId) -> Result<Fixture, RepoRetrieveError> {
        let row = sqlx::query("SELECT * FROM fixtures WHERE id = ?")
            .bind(fixture.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        fixture_from_row(&row).map_err(|e| RepoRetrieveError::StorageError(e.to_string()))
    }

    async fn list_fixtures(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<Fixture>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM fixtures WHERE season = ? AND division = ? ORDER BY round, id",
        )
        .bind(season.0)
        .bind(division.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::StorageError(e.to_string()))?;
        rows.iter()
            .map(fixture_from_row)
            .collect::<sqlx::Result<_>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn replace_regular_fixtures(
        &self,
        season: SeasonId,
        division: Division,
        planned: Vec<PlannedFixture>,
    ) -> Result<Vec<Fixture>, RepoError> {
        self.store_regular_fixtures(season, division, planned)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn create_knockout_fixtures(
        &self,
        season: SeasonId,
        division: Division,
        planned: Vec<PlannedFixture>,
    ) -> Result<Vec<Fixture>, RepoCreateError> {
        let storage = |e: sqlx::Error| RepoCreateError::StorageError(e.to_string());

        let mut tx = self.pool.begin().await.map_err(storage)?;
        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM fixtures WHERE season = ? AND division = ? AND kind != 'regular'",
        )
        .bind(season.0)
        .bind(division.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(storage)?;
        if existing > 0 {
            return Err(RepoCreateError::Conflict);
        }

        let mut stored = Vec::with_capacity(planned.len());
        for fixture in planned {
            stored.push(
                insert_fixture(&mut tx, season, fixture)
                    .await
                    .map_err(storage)?,
            );
        }
        tx.commit().await.map_err(storage)?;
        Ok(stored)
    }

    async fn set_selection_override(
        &self,
        fixture: FixtureId,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), RepoUpdateError> {
        let result = sqlx::query("UPDATE fixtures SET selection_override_until = ? WHERE id = ?")
            .bind(until.map(codec::timestamp_to_str))
            .bind(fixture.0)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }

    async fn complete_fixture(
        &self,
        fixture: FixtureId,
    ) -> Result<FixturePoints, FixtureWriteError<CompletionError>> {
        let storage = write_error::<CompletionError>;
        let mut tx = self.begin_write().await.map_err(storage)?;
        ensure_scheduled::<CompletionError>(&mut tx, fixture).await?;
        let matches = stored_matches(&mut tx, fixture).await.map_err(storage)?;
        let points = final_points(&matches).map_err(FixtureWriteError::Refused)?;

        sqlx::query(
            "UPDATE fixtures SET status = 'completed', team1_points = ?, team2_points = ?
             WHERE id = ?",
        )
        .bind(points.0)
        .bind(points.1)
        .bind(fixture.0)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(points)
    }

    async fn get_individual_matches(
        &self,
        fixture: FixtureId,
    ) -> Result<Vec<IndividualMatch>, RepoRetrieveError> {
        let exists = self
            .fixture_exists(fixture)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?;
        if !exists {
            return Err(RepoRetrieveError::NotFound);
        }
        let rows = sqlx::query("SELECT * FROM individual_matches WHERE fixture = ? ORDER BY slot")
            .bind(fixture.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?;
        rows.iter()
            .map(match_from_row)
            .collect::<sqlx::Result<_>>()
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))
    }

    async fn store_pairings(
        &self,
        fixture: FixtureId,
        generated: Vec<IndividualMatch>,
    ) -> Result<Vec<IndividualMatch>, FixtureWriteError<Infallible>> {
        let storage = write_error::<Infallible>;
        let mut tx = self.begin_write().await.map_err(storage)?;
        ensure_scheduled::<Infallible>(&mut tx, fixture).await?;
        let previous = stored_matches(&mut tx, fixture).await.map_err(storage)?;
        let matches = merge_recorded_results(&previous, generated);

        sqlx::query("DELETE FROM individual_matches WHERE fixture = ?")
            .bind(fixture.0)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        for m in &matches {
            insert_match(&mut tx, fixture, m).await.map_err(storage)?;
        }
        update_points(&mut tx, fixture, fixture_points(&matches))
            .await
            .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(matches)
    }

    async fn record_slot_result(
        &self,
        fixture: FixtureId,
        slot: u8,
        result: MatchResult,
    ) -> Result<FixturePoints, FixtureWriteError<ResultEntryError>> {
        let storage = write_error::<ResultEntryError>;
        let mut tx = self.begin_write().await.map_err(storage)?;
        ensure_scheduled::<ResultEntryError>(&mut tx, fixture).await?;
        let mut matches = stored_matches(&mut tx, fixture).await.map_err(storage)?;
        record_slot_result(&mut matches, slot, result).map_err(FixtureWriteError::Refused)?;

        let (points1, points2) = result.points();
        sqlx::query(
            "UPDATE individual_matches SET result = ?, points1 = ?, points2 = ?
             WHERE fixture = ? AND slot = ?",
        )
        .bind(result.as_str())
        .bind(points1)
        .bind(points2)
        .bind(fixture.0)
        .bind(i64::from(slot))
        .execute(&mut *tx)
        .await
        .map_err(storage)?;
        let points = fixture_points(&matches);
        update_points(&mut tx, fixture, points)
            .await
            .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(points)
    }
}
