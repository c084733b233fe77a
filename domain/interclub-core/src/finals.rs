use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    ClubId, Division, FINALS_ROUND, FixtureKind, KnockoutStage, PlannedFixture, Standing,
};

/// Number of ranked teams that qualify for the finals day.
pub const FINALS_FIELD: usize = 6;

const STAGES: [KnockoutStage; 3] = [
    KnockoutStage::Championship,
    KnockoutStage::ThirdPlace,
    KnockoutStage::FifthPlace,
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FinalsError {
    #[error("finals need {required} ranked teams, only {available} available")]
    NotEnoughTeams { required: usize, available: usize },
}

/// Pairs the top six of a table for finals day: 1v2 for the title, 3v4 for
/// third place and 5v6 for fifth. The better-ranked team is always team1.
pub fn seed_finals(
    division: Division,
    standings: &[Standing],
    date: NaiveDate,
    host: ClubId,
) -> Result<Vec<PlannedFixture>, FinalsError> {
    if standings.len() < FINALS_FIELD {
        return Err(FinalsError::NotEnoughTeams {
            required: FINALS_FIELD,
            available: standings.len(),
        });
    }

    let mut ranked: Vec<&Standing> = standings.iter().collect();
    ranked.sort_by_key(|s| s.rank);

    let fixtures = ranked[..FINALS_FIELD]
        .chunks_exact(2)
        .zip(STAGES)
        .map(|(pair, stage)| PlannedFixture {
            division,
            round: FINALS_ROUND,
            date,
            host_club: host,
            team1: pair[0].team,
            team2: pair[1].team,
            kind: FixtureKind::Knockout(stage),
        })
        .collect();
    Ok(fixtures)
}
