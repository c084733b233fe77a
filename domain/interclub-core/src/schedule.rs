use std::collections::HashSet;

use thiserror::Error;

use crate::{Division, FixtureKind, MAX_REGULAR_ROUNDS, PlannedFixture, RoundDate, Team};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("at most {max} rounds can be scheduled, got {got}")]
    TooManyRounds { max: u8, got: usize },

    #[error("round number {0} is not a regular round")]
    InvalidRoundNumber(u8),

    #[error("round {0} is configured more than once")]
    DuplicateRound(u8),

    #[error("team {0} is listed more than once")]
    DuplicateTeam(crate::TeamId),

    #[error("team {team} belongs to division {found}, expected {expected}")]
    MixedDivisions {
        team: crate::TeamId,
        expected: Division,
        found: Division,
    },
}

/// Builds a round-robin calendar with the circle method.
///
/// The first team stays fixed while the others rotate one position per round.
/// An odd field gets a bye entry; whoever meets the bye sits the round out.
/// Only as many rounds as there are descriptors are produced, so a large
/// field with few dates leaves some pairings unplayed.
pub fn schedule_round_robin(
    teams: &[Team],
    rounds: &[RoundDate],
) -> Result<Vec<PlannedFixture>, ScheduleError> {
    if teams.len() < 2 {
        return Ok(Vec::new());
    }
    validate_rounds(rounds)?;
    let division = validate_teams(teams)?;

    let mut circle: Vec<Option<&Team>> = teams.iter().map(Some).collect();
    if circle.len() % 2 == 1 {
        circle.push(None);
    }
    let size = circle.len();
    let round_count = (size - 1).min(rounds.len());

    let mut fixtures = Vec::with_capacity(round_count * size / 2);
    for descriptor in rounds.iter().take(round_count) {
        for i in 0..size / 2 {
            let (Some(first), Some(second)) = (circle[i], circle[size - 1 - i]) else {
                continue;
            };
            fixtures.push(PlannedFixture {
                division,
                round: descriptor.round,
                date: descriptor.date,
                host_club: descriptor.host.unwrap_or(first.club),
                team1: first.id,
                team2: second.id,
                kind: FixtureKind::Regular,
            });
        }
        circle[1..].rotate_right(1);
    }

    log::debug!(
        "Scheduled {} fixtures over {} rounds for {} teams in division {}",
        fixtures.len(),
        round_count,
        teams.len(),
        division
    );

    Ok(fixtures)
}

fn validate_rounds(rounds: &[RoundDate]) -> Result<(), ScheduleError> {
    if rounds.len() > MAX_REGULAR_ROUNDS as usize {
        return Err(ScheduleError::TooManyRounds {
            max: MAX_REGULAR_ROUNDS,
            got: rounds.len(),
        });
    }
    let mut seen = HashSet::new();
    for descriptor in rounds {
        if descriptor.round == 0 || descriptor.round > MAX_REGULAR_ROUNDS {
            return Err(ScheduleError::InvalidRoundNumber(descriptor.round));
        }
        if !seen.insert(descriptor.round) {
            return Err(ScheduleError::DuplicateRound(descriptor.round));
        }
    }
    Ok(())
}

fn validate_teams(teams: &[Team]) -> Result<Division, ScheduleError> {
    let expected = teams[0].division;
    let mut seen = HashSet::new();
    for team in teams {
        if team.division != expected {
            return Err(ScheduleError::MixedDivisions {
                team: team.id,
                expected,
                found: team.division,
            });
        }
        if !seen.insert(team.id) {
            return Err(ScheduleError::DuplicateTeam(team.id));
        }
    }
    Ok(expected)
}
