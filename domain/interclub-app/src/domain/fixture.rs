use chrono::{DateTime, Utc};
use interclub_core::{
    Division, Fixture, FixtureId, IndividualMatch, MatchResult, PlannedFixture, SeasonId,
    pairing::{CompletionError, ResultEntryError},
};

use crate::domain::{RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError};

/// Team points of a fixture, team1 first.
pub type FixturePoints = (f64, f64);

/// Failure of a write that is only allowed while a fixture is scheduled.
/// `Refused` carries the rule that rejected the stored state.
#[derive(Debug)]
pub enum FixtureWriteError<E> {
    NotFound,
    Completed,
    Refused(E),
    StorageError(String),
}

impl<E: std::fmt::Display> std::fmt::Display for FixtureWriteError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixtureWriteError::NotFound => write!(f, "Resource not found"),
            FixtureWriteError::Completed => write!(f, "Fixture already completed"),
            FixtureWriteError::Refused(e) => write!(f, "Refused: {}", e),
            FixtureWriteError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[async_trait::async_trait]
pub trait FixtureRepository {
    async fn get_fixture(&self, fixture: FixtureId) -> Result<Fixture, RepoRetrieveError>;

    /// All fixtures of a division, regular and knockout, ordered by round.
    async fn list_fixtures(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<Fixture>, RepoError>;

    /// Drops the division's regular fixtures together with their selections,
    /// scratch notices and individual matches, then stores `planned`. Runs as
    /// one atomic step. Knockout fixtures are left alone.
    async fn replace_regular_fixtures(
        &self,
        season: SeasonId,
        division: Division,
        planned: Vec<PlannedFixture>,
    ) -> Result<Vec<Fixture>, RepoError>;

    /// Stores finals fixtures. Fails with `Conflict` when the division
    /// already has knockout fixtures.
    async fn create_knockout_fixtures(
        &self,
        season: SeasonId,
        division: Division,
        planned: Vec<PlannedFixture>,
    ) -> Result<Vec<Fixture>, RepoCreateError>;

    async fn set_selection_override(
        &self,
        fixture: FixtureId,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), RepoUpdateError>;

    /// Marks a scheduled fixture completed with the points of its stored
    /// matches, provided every played match has a result.
    async fn complete_fixture(
        &self,
        fixture: FixtureId,
    ) -> Result<FixturePoints, FixtureWriteError<CompletionError>>;

    async fn get_individual_matches(
        &self,
        fixture: FixtureId,
    ) -> Result<Vec<IndividualMatch>, RepoRetrieveError>;

    /// Swaps in freshly generated matches and refreshes the fixture's team
    /// points. Slots whose players did not change keep the result stored for
    /// them. Reading the old matches and writing the new ones is one atomic
    /// step. Returns the matches as stored.
    async fn store_pairings(
        &self,
        fixture: FixtureId,
        generated: Vec<IndividualMatch>,
    ) -> Result<Vec<IndividualMatch>, FixtureWriteError<std::convert::Infallible>>;

    /// Records one slot's result and refreshes the fixture's team points in
    /// one atomic step.
    async fn record_slot_result(
        &self,
        fixture: FixtureId,
        slot: u8,
        result: MatchResult,
    ) -> Result<FixturePoints, FixtureWriteError<ResultEntryError>>;
}
