use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;
use interclub_core::{
    FixtureId, FixtureStatus, PlayerId, SelectedPlayer, SelectionEntry,
    pairing::{PairingError, generate_pairings},
};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    domain::{
        RepoRetrieveError,
        fixture::{FixtureRepository, FixtureWriteError},
        selection::SelectionRepository,
    },
    ports::directory::PlayerDirectoryPort,
};

#[async_trait::async_trait]
pub trait GeneratePairingsUseCase {
    /// Recomputes the individual matches of a fixture from both current
    /// selections and returns how many were generated.
    async fn generate_pairings(&self, fixture: FixtureId) -> Result<usize, GeneratePairingsError>;
}

#[derive(Debug, Error)]
pub enum GeneratePairingsError {
    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),
    #[error("fixture {0} is completed, its pairings are final")]
    FixtureCompleted(FixtureId),
    #[error("player {0} is not in the player directory")]
    UnknownPlayer(PlayerId),
    #[error(transparent)]
    InvalidSelection(#[from] PairingError),
    #[error("storage failure")]
    StorageError,
}

pub struct GeneratePairingsUseCaseImpl<
    F: FixtureRepository,
    S: SelectionRepository,
    P: PlayerDirectoryPort,
> {
    fixture_repository: Arc<F>,
    selection_repository: Arc<S>,
    player_directory: Arc<P>,
    // one regeneration per fixture at a time, so the last one reads both
    // latest selections
    fixture_guards: DashMap<FixtureId, Arc<Mutex<()>>>,
}

impl<F: FixtureRepository, S: SelectionRepository, P: PlayerDirectoryPort>
    GeneratePairingsUseCaseImpl<F, S, P>
{
    pub fn new(
        fixture_repository: Arc<F>,
        selection_repository: Arc<S>,
        player_directory: Arc<P>,
    ) -> Self {
        Self {
            fixture_repository,
            selection_repository,
            player_directory,
            fixture_guards: DashMap::new(),
        }
    }

    fn guard(&self, fixture: FixtureId) -> Arc<Mutex<()>> {
        self.fixture_guards.entry(fixture).or_default().clone()
    }

    async fn selected_players(
        &self,
        entries: &[SelectionEntry],
    ) -> Result<Vec<SelectedPlayer>, GeneratePairingsError> {
        let ids: Vec<PlayerId> = entries.iter().map(|e| e.player).collect();
        let handicaps: HashMap<PlayerId, f64> = self
            .player_directory
            .get_players(&ids)
            .await
            .map_err(|e| {
                log::error!("Failed to look up selected players: {}", e);
                GeneratePairingsError::StorageError
            })?
            .into_iter()
            .map(|p| (p.id, p.handicap_index))
            .collect();

        entries
            .iter()
            .map(|entry| {
                let handicap_index = handicaps
                    .get(&entry.player)
                    .copied()
                    .ok_or(GeneratePairingsError::UnknownPlayer(entry.player))?;
                Ok(SelectedPlayer {
                    player: entry.player,
                    order: entry.order,
                    handicap_index,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl<
    F: FixtureRepository + Send + Sync + 'static,
    S: SelectionRepository + Send + Sync + 'static,
    P: PlayerDirectoryPort + Send + Sync + 'static,
> GeneratePairingsUseCase for GeneratePairingsUseCaseImpl<F, S, P>
{
    async fn generate_pairings(&self, fixture_id: FixtureId) -> Result<usize, GeneratePairingsError> {
        let guard = self.guard(fixture_id);
        let _serialised = guard.lock().await;

        let fixture = match self.fixture_repository.get_fixture(fixture_id).await {
            Ok(fixture) => fixture,
            Err(RepoRetrieveError::NotFound) => {
                return Err(GeneratePairingsError::FixtureNotFound(fixture_id));
            }
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to load fixture {}: {}", fixture_id, e);
                return Err(GeneratePairingsError::StorageError);
            }
        };
        if fixture.status == FixtureStatus::Completed {
            return Err(GeneratePairingsError::FixtureCompleted(fixture_id));
        }

        let mut sides = Vec::with_capacity(2);
        for team in [fixture.team1, fixture.team2] {
            let entries = self
                .selection_repository
                .get_selection(fixture_id, team)
                .await
                .map_err(|e| {
                    log::error!(
                        "Failed to load selection of team {} for fixture {}: {}",
                        team,
                        fixture_id,
                        e
                    );
                    GeneratePairingsError::StorageError
                })?;
            sides.push(self.selected_players(&entries).await?);
        }

        let generated = generate_pairings(fixture.kind, &sides[0], &sides[1])?;
        let count = self
            .fixture_repository
            .store_pairings(fixture_id, generated)
            .await
            .map_err(|e| match e {
                FixtureWriteError::NotFound => GeneratePairingsError::FixtureNotFound(fixture_id),
                FixtureWriteError::Completed => GeneratePairingsError::FixtureCompleted(fixture_id),
                FixtureWriteError::Refused(never) => match never {},
                FixtureWriteError::StorageError(e) => {
                    log::error!("Failed to store matches of fixture {}: {}", fixture_id, e);
                    GeneratePairingsError::StorageError
                }
            })?
            .len();

        log::info!(
            "Generated {} matches for fixture {} ({} vs {} players)",
            count,
            fixture_id,
            sides[0].len(),
            sides[1].len()
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use interclub_core::{MatchResult, SlotLineup, TeamId};

    use crate::memory::{MemoryStore, testing::*};

    use super::*;

    fn use_case(
        store: &Arc<MemoryStore>,
    ) -> GeneratePairingsUseCaseImpl<MemoryStore, MemoryStore, MemoryStore> {
        GeneratePairingsUseCaseImpl::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_full_selections_give_eight_matchups() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        store
            .replace_selection(fixture.id, TeamId(1), entries(1, 8))
            .await
            .unwrap();
        store
            .replace_selection(fixture.id, TeamId(2), entries(2, 8))
            .await
            .unwrap();

        let count = use_case(&store).generate_pairings(fixture.id).await.unwrap();
        assert_eq!(count, 8);

        let matches = store.get_individual_matches(fixture.id).await.unwrap();
        assert!(
            matches
                .iter()
                .all(|m| matches!(m.lineup, SlotLineup::BothPresent { .. }))
        );
    }

    #[tokio::test]
    async fn test_missing_selection_forfeits_every_slot() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        store
            .replace_selection(fixture.id, TeamId(1), entries(1, 8))
            .await
            .unwrap();

        use_case(&store).generate_pairings(fixture.id).await.unwrap();

        let matches = store.get_individual_matches(fixture.id).await.unwrap();
        assert_eq!(matches.len(), 8);
        assert!(matches.iter().all(|m| m.is_forfeit()
            && m.result == MatchResult::Side1
            && m.strokes.strokes_given == 0));
        let stored = store.get_fixture(fixture.id).await.unwrap();
        assert_eq!((stored.team1_points, stored.team2_points), (8.0, 0.0));
    }

    #[tokio::test]
    async fn test_unchanged_lineups_keep_their_results() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        store
            .replace_selection(fixture.id, TeamId(1), entries(1, 8))
            .await
            .unwrap();
        store
            .replace_selection(fixture.id, TeamId(2), entries(2, 8))
            .await
            .unwrap();
        let generate = use_case(&store);
        generate.generate_pairings(fixture.id).await.unwrap();

        store
            .record_slot_result(fixture.id, 1, MatchResult::Side2)
            .await
            .unwrap();
        store
            .record_slot_result(fixture.id, 8, MatchResult::Side1)
            .await
            .unwrap();

        // the weakest player of team 2 is swapped for a new one
        let mut changed = entries(2, 7);
        changed.push(SelectionEntry {
            player: player_id(2, 9),
            order: 8,
        });
        store
            .replace_selection(fixture.id, TeamId(2), changed)
            .await
            .unwrap();
        generate.generate_pairings(fixture.id).await.unwrap();

        let regenerated = store.get_individual_matches(fixture.id).await.unwrap();
        assert_eq!(regenerated[0].result, MatchResult::Side2);
        assert_eq!(regenerated[7].result, MatchResult::Pending);
        let stored = store.get_fixture(fixture.id).await.unwrap();
        assert_eq!((stored.team1_points, stored.team2_points), (0.0, 1.0));
    }

    #[tokio::test]
    async fn test_unknown_player_is_rejected() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        store
            .replace_selection(
                fixture.id,
                TeamId(1),
                vec![SelectionEntry {
                    player: PlayerId(999_999),
                    order: 1,
                }],
            )
            .await
            .unwrap();

        assert!(matches!(
            use_case(&store).generate_pairings(fixture.id).await,
            Err(GeneratePairingsError::UnknownPlayer(PlayerId(999_999)))
        ));
    }

    #[tokio::test]
    async fn test_completed_fixture_keeps_its_pairings() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        store
            .replace_selection(fixture.id, TeamId(1), entries(1, 1))
            .await
            .unwrap();
        use_case(&store).generate_pairings(fixture.id).await.unwrap();
        store.complete_fixture(fixture.id).await.unwrap();

        assert!(matches!(
            use_case(&store).generate_pairings(fixture.id).await,
            Err(GeneratePairingsError::FixtureCompleted(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_regeneration_keeps_results_entered_meanwhile() {
        let store = Arc::new(seeded_store(2));
        let fixture = regular_fixture(&store).await;
        for team in [TeamId(1), TeamId(2)] {
            store
                .replace_selection(fixture.id, team, entries(team.0, 8))
                .await
                .unwrap();
        }
        let generate = Arc::new(use_case(&store));
        generate.generate_pairings(fixture.id).await.unwrap();
        let fixture_id = fixture.id;

        let mut handles = Vec::new();
        for slot in 1..=8 {
            let store = store.clone();
            let generate = generate.clone();
            handles.push(tokio::spawn(async move {
                generate.generate_pairings(fixture_id).await.unwrap();
                store
                    .record_slot_result(fixture_id, slot, MatchResult::Side2)
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let matches = store.get_individual_matches(fixture_id).await.unwrap();
        assert!(matches.iter().all(|m| m.result == MatchResult::Side2));
        let stored = store.get_fixture(fixture_id).await.unwrap();
        assert_eq!((stored.team1_points, stored.team2_points), (0.0, 8.0));
    }
}
