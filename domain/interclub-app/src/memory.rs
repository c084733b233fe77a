use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use interclub_core::{
    Division, Fixture, FixtureId, FixtureStatus, IndividualMatch, MatchResult, PlannedFixture,
    Player, PlayerId, RoundDate, SeasonId, SelectionEntry, Team, TeamId,
    pairing::{
        CompletionError, ResultEntryError, final_points, fixture_points, merge_recorded_results,
        record_slot_result,
    },
};
use tokio::sync::Mutex;

use crate::{
    domain::{
        RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError,
        fixture::{FixturePoints, FixtureRepository, FixtureWriteError},
        selection::{ScratchNotice, ScratchNoticeRepository, SelectionRepository},
    },
    ports::{directory::PlayerDirectoryPort, season::SeasonConfigurationPort},
};

/// Process-local implementation of every port and repository.
///
/// Writes that span several maps, or read before they write, are serialised
/// through `fixture_writes`.
pub struct MemoryStore {
    rosters: DashMap<(SeasonId, Division), Vec<Team>>,
    round_dates: DashMap<(SeasonId, Division), Vec<RoundDate>>,
    players: DashMap<PlayerId, Player>,
    fixtures: DashMap<FixtureId, Fixture>,
    matches: DashMap<FixtureId, Vec<IndividualMatch>>,
    selections: DashMap<(FixtureId, TeamId), Vec<SelectionEntry>>,
    notices: DashMap<(FixtureId, TeamId), ScratchNotice>,
    next_fixture_id: AtomicI64,
    fixture_writes: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rosters: DashMap::new(),
            round_dates: DashMap::new(),
            players: DashMap::new(),
            fixtures: DashMap::new(),
            matches: DashMap::new(),
            selections: DashMap::new(),
            notices: DashMap::new(),
            next_fixture_id: AtomicI64::new(1),
            fixture_writes: Mutex::new(()),
        }
    }

    pub fn add_team(&self, season: SeasonId, team: Team) {
        self.rosters
            .entry((season, team.division))
            .or_default()
            .push(team);
    }

    pub fn add_player(&self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn set_round_dates(&self, season: SeasonId, division: Division, rounds: Vec<RoundDate>) {
        self.round_dates.insert((season, division), rounds);
    }

    fn scheduled<E>(&self, fixture: FixtureId) -> Result<(), FixtureWriteError<E>> {
        match self.fixtures.get(&fixture) {
            None => Err(FixtureWriteError::NotFound),
            Some(stored) if stored.status == FixtureStatus::Completed => {
                Err(FixtureWriteError::Completed)
            }
            Some(_) => Ok(()),
        }
    }

    fn store_points(&self, fixture: FixtureId, points: FixturePoints) {
        if let Some(mut stored) = self.fixtures.get_mut(&fixture) {
            (stored.team1_points, stored.team2_points) = points;
        }
    }

    fn store_planned(&self, season: SeasonId, planned: Vec<PlannedFixture>) -> Vec<Fixture> {
        planned
            .into_iter()
            .map(|planned| {
                let id = FixtureId(self.next_fixture_id.fetch_add(1, Ordering::SeqCst));
                let fixture = Fixture::from_planned(id, season, planned);
                self.fixtures.insert(id, fixture.clone());
                fixture
            })
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SeasonConfigurationPort for MemoryStore {
    async fn list_teams(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<Team>, RepoError> {
        Ok(self
            .rosters
            .get(&(season, division))
            .map(|teams| teams.clone())
            .unwrap_or_default())
    }

    async fn get_team(&self, team: TeamId) -> Result<Team, RepoRetrieveError> {
        self.rosters
            .iter()
            .find_map(|roster| roster.iter().find(|t| t.id == team).cloned())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_round_dates(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<RoundDate>, RepoError> {
        let mut rounds = self
            .round_dates
            .get(&(season, division))
            .map(|rounds| rounds.clone())
            .unwrap_or_default();
        rounds.sort_by_key(|r| r.round);
        Ok(rounds)
    }
}

#[async_trait::async_trait]
impl PlayerDirectoryPort for MemoryStore {
    async fn get_players(&self, players: &[PlayerId]) -> Result<Vec<Player>, RepoError> {
        Ok(players
            .iter()
            .filter_map(|id| self.players.get(id).map(|p| p.clone()))
            .collect())
    }
}

#[async_trait::async_trait]
impl FixtureRepository for MemoryStore {
    async fn get_fixture(&self, fixture: FixtureId) -> Result<Fixture, RepoRetrieveError> {
        self.fixtures
            .get(&fixture)
            .map(|f| f.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_fixtures(
        &self,
        season: SeasonId,
        division: Division,
    ) -> Result<Vec<Fixture>, RepoError> {
        let mut fixtures: Vec<Fixture> = self
            .fixtures
            .iter()
            .filter(|f| f.season == season && f.division == division)
            .map(|f| f.clone())
            .collect();
        fixtures.sort_by_key(|f| (f.round, f.id));
        Ok(fixtures)
    }

    async fn replace_regular_fixtures(
        &self,
        season: SeasonId,
        division: Division,
        planned: Vec<PlannedFixture>,
    ) -> Result<Vec<Fixture>, RepoError> {
        let _guard = self.fixture_writes.lock().await;

        let stale: Vec<FixtureId> = self
            .fixtures
            .iter()
            .filter(|f| f.season == season && f.division == division && f.is_regular())
            .map(|f| f.id)
            .collect();
        for id in &stale {
            self.fixtures.remove(id);
            self.matches.remove(id);
        }
        self.selections
            .retain(|(fixture, _), _| !stale.contains(fixture));
        self.notices.retain(|(fixture, _), _| !stale.contains(fixture));

        Ok(self.store_planned(season, planned))
    }

    async fn create_knockout_fixtures(
        &self,
        season: SeasonId,
        division: Division,
        planned: Vec<PlannedFixture>,
    ) -> Result<Vec<Fixture>, RepoCreateError> {
        let _guard = self.fixture_writes.lock().await;

        let seeded = self
            .fixtures
            .iter()
            .any(|f| f.season == season && f.division == division && f.kind.is_knockout());
        if seeded {
            return Err(RepoCreateError::Conflict);
        }
        Ok(self.store_planned(season, planned))
    }

    async fn set_selection_override(
        &self,
        fixture: FixtureId,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), RepoUpdateError> {
        let mut stored = self
            .fixtures
            .get_mut(&fixture)
            .ok_or(RepoUpdateError::NotFound)?;
        stored.selection_override_until = until;
        Ok(())
    }

    async fn complete_fixture(
        &self,
        fixture: FixtureId,
    ) -> Result<FixturePoints, FixtureWriteError<CompletionError>> {
        let _guard = self.fixture_writes.lock().await;

        self.scheduled::<CompletionError>(fixture)?;
        let matches = self.matches.get(&fixture).map(|m| m.clone()).unwrap_or_default();
        let points = final_points(&matches).map_err(FixtureWriteError::Refused)?;

        let Some(mut stored) = self.fixtures.get_mut(&fixture) else {
            return Err(FixtureWriteError::NotFound);
        };
        stored.status = FixtureStatus::Completed;
        (stored.team1_points, stored.team2_points) = points;
        Ok(points)
    }

    async fn get_individual_matches(
        &self,
        fixture: FixtureId,
    ) -> Result<Vec<IndividualMatch>, RepoRetrieveError> {
        if !self.fixtures.contains_key(&fixture) {
            return Err(RepoRetrieveError::NotFound);
        }
        Ok(self
            .matches
            .get(&fixture)
            .map(|m| m.clone())
            .unwrap_or_default())
    }

    async fn store_pairings(
        &self,
        fixture: FixtureId,
        generated: Vec<IndividualMatch>,
    ) -> Result<Vec<IndividualMatch>, FixtureWriteError<std::convert::Infallible>> {
        let _guard = self.fixture_writes.lock().await;

        self.scheduled::<std::convert::Infallible>(fixture)?;
        let previous = self.matches.get(&fixture).map(|m| m.clone()).unwrap_or_default();
        let matches = merge_recorded_results(&previous, generated);
        self.store_points(fixture, fixture_points(&matches));
        self.matches.insert(fixture, matches.clone());
        Ok(matches)
    }

    async fn record_slot_result(
        &self,
        fixture: FixtureId,
        slot: u8,
        result: MatchResult,
    ) -> Result<FixturePoints, FixtureWriteError<ResultEntryError>> {
        let _guard = self.fixture_writes.lock().await;

        self.scheduled::<ResultEntryError>(fixture)?;
        let mut matches = self.matches.get(&fixture).map(|m| m.clone()).unwrap_or_default();
        record_slot_result(&mut matches, slot, result).map_err(FixtureWriteError::Refused)?;
        let points = fixture_points(&matches);
        self.store_points(fixture, points);
        self.matches.insert(fixture, matches);
        Ok(points)
    }
}

#[async_trait::async_trait]
impl SelectionRepository for MemoryStore {
    async fn get_selection(
        &self,
        fixture: FixtureId,
        team: TeamId,
    ) -> Result<Vec<SelectionEntry>, RepoError> {
        Ok(self
            .selections
            .get(&(fixture, team))
            .map(|s| s.clone())
            .unwrap_or_default())
    }

    async fn replace_selection(
        &self,
        fixture: FixtureId,
        team: TeamId,
        entries: Vec<SelectionEntry>,
    ) -> Result<(), RepoError> {
        self.selections.insert((fixture, team), entries);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ScratchNoticeRepository for MemoryStore {
    async fn get_scratch_notice(
        &self,
        fixture: FixtureId,
        team: TeamId,
    ) -> Result<ScratchNotice, RepoRetrieveError> {
        self.notices
            .get(&(fixture, team))
            .map(|n| n.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn save_scratch_notice(&self, notice: ScratchNotice) -> Result<(), RepoError> {
        self.notices.insert((notice.fixture, notice.team), notice);
        Ok(())
    }

    async fn acknowledge_scratch_notice(
        &self,
        fixture: FixtureId,
        team: TeamId,
        at: DateTime<Utc>,
    ) -> Result<(), RepoUpdateError> {
        let mut notice = self
            .notices
            .get_mut(&(fixture, team))
            .ok_or(RepoUpdateError::NotFound)?;
        notice.acknowledged_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::NaiveDate;
    use interclub_core::{ClubId, Entrant, Gender, SlotLineup, StrokeAllowance};

    use super::*;

    pub const SEASON: SeasonId = SeasonId(2025);

    pub fn team(id: i64, division: Division) -> Team {
        Team {
            id: TeamId(id),
            club: ClubId(id),
            division,
            name: format!("Team {}", id),
        }
    }

    /// Players of `club` get ids `club * 100 + n` for n in 1..=count.
    pub fn player_id(club: i64, n: i64) -> PlayerId {
        PlayerId(club * 100 + n)
    }

    pub fn round_dates(count: u8) -> Vec<RoundDate> {
        (1..=count)
            .map(|round| RoundDate {
                round,
                // Sundays, two weeks apart from 2025-04-06
                date: NaiveDate::from_ymd_opt(2025, 4, 6).unwrap()
                    + chrono::Days::new(14 * (round as u64 - 1)),
                host: None,
            })
            .collect()
    }

    /// A store with `teams` teams in each division, ten players per club and
    /// five round dates per division.
    pub fn seeded_store(teams: i64) -> MemoryStore {
        let store = MemoryStore::new();
        for (division, offset) in [(Division::One, 0), (Division::Two, 50)] {
            for id in 1..=teams {
                let club = id + offset;
                store.add_team(SEASON, team(club, division));
                for n in 1..=10 {
                    store.add_player(Player {
                        id: player_id(club, n),
                        club: ClubId(club),
                        handicap_index: n as f64 * 2.5,
                        gender: Gender::Male,
                        junior: false,
                        validated: true,
                    });
                }
            }
            store.set_round_dates(SEASON, division, round_dates(5));
        }
        store
    }

    /// Stores a single regular fixture of team 1 hosting team 2 on the first
    /// round date.
    pub async fn regular_fixture(store: &MemoryStore) -> Fixture {
        let planned = PlannedFixture {
            division: Division::One,
            round: 1,
            date: round_dates(1)[0].date,
            host_club: ClubId(1),
            team1: TeamId(1),
            team2: TeamId(2),
            kind: interclub_core::FixtureKind::Regular,
        };
        store
            .replace_regular_fixtures(SEASON, Division::One, vec![planned])
            .await
            .unwrap()
            .remove(0)
    }

    /// Plays `slots` two-sided matches, side 1 winning the first
    /// `side1_wins` and losing the rest, then completes the fixture.
    pub async fn complete_with_wins(
        store: &MemoryStore,
        fixture: FixtureId,
        slots: u8,
        side1_wins: u8,
    ) -> FixturePoints {
        let entrant = |player: i64| Entrant::Single {
            player: PlayerId(player),
            handicap: 10.0,
        };
        let matches = (1..=slots)
            .map(|slot| IndividualMatch {
                slot,
                lineup: SlotLineup::BothPresent {
                    side1: entrant(slot as i64),
                    side2: entrant(100 + slot as i64),
                },
                strokes: StrokeAllowance::none(),
                result: MatchResult::Pending,
                points1: 0.0,
                points2: 0.0,
                forfeit_reason: None,
            })
            .collect();
        store.store_pairings(fixture, matches).await.unwrap();
        for slot in 1..=slots {
            let result = if slot <= side1_wins {
                MatchResult::Side1
            } else {
                MatchResult::Side2
            };
            store.record_slot_result(fixture, slot, result).await.unwrap();
        }
        store.complete_fixture(fixture).await.unwrap()
    }

    pub fn entries(club: i64, count: u8) -> Vec<SelectionEntry> {
        (1..=count)
            .map(|order| SelectionEntry {
                player: player_id(club, order as i64),
                order,
            })
            .collect()
    }
}
