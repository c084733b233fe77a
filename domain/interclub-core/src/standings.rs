use std::{cmp::Ordering, collections::HashMap};

use crate::{ClubId, Fixture, FixtureStatus, Team, TeamId};

pub const WIN_POINTS: u32 = 2;
pub const DRAW_POINTS: u32 = 1;

#[derive(Clone, Debug, PartialEq)]
pub struct Standing {
    pub team: TeamId,
    pub club: ClubId,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub points: u32,
    pub match_points_for: f64,
    pub match_points_against: f64,
    pub rank: usize,
}

impl Standing {
    fn new(team: &Team) -> Self {
        Self {
            team: team.id,
            club: team.club,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            home_wins: 0,
            away_wins: 0,
            points: 0,
            match_points_for: 0.0,
            match_points_against: 0.0,
            rank: 0,
        }
    }

    fn record(&mut self, host_club: ClubId, scored: f64, conceded: f64) {
        self.played += 1;
        self.match_points_for += scored;
        self.match_points_against += conceded;
        match scored.total_cmp(&conceded) {
            Ordering::Greater => {
                self.wins += 1;
                self.points += WIN_POINTS;
                if host_club == self.club {
                    self.home_wins += 1;
                } else {
                    self.away_wins += 1;
                }
            }
            Ordering::Equal => {
                self.draws += 1;
                self.points += DRAW_POINTS;
            }
            Ordering::Less => self.losses += 1,
        }
    }
}

fn compare_points(a: &Standing, b: &Standing) -> Ordering {
    b.points.cmp(&a.points)
}

fn compare_away_wins(a: &Standing, b: &Standing) -> Ordering {
    b.away_wins.cmp(&a.away_wins)
}

/// Folds completed fixtures into a ranked table.
///
/// Teams are ordered by points, then by away wins. Teams still level after
/// both keep the order they were passed in.
pub fn compute_standings(teams: &[Team], fixtures: &[Fixture]) -> Vec<Standing> {
    let mut table: Vec<Standing> = teams.iter().map(Standing::new).collect();
    let positions: HashMap<TeamId, usize> = teams
        .iter()
        .enumerate()
        .map(|(index, team)| (team.id, index))
        .collect();

    for fixture in fixtures
        .iter()
        .filter(|f| f.status == FixtureStatus::Completed)
    {
        let (Some(&first), Some(&second)) =
            (positions.get(&fixture.team1), positions.get(&fixture.team2))
        else {
            log::warn!(
                "Fixture {} involves a team outside the table, skipping it",
                fixture.id
            );
            continue;
        };
        table[first].record(fixture.host_club, fixture.team1_points, fixture.team2_points);
        table[second].record(fixture.host_club, fixture.team2_points, fixture.team1_points);
    }

    table.sort_by(|a, b| compare_points(a, b).then_with(|| compare_away_wins(a, b)));
    for (index, standing) in table.iter_mut().enumerate() {
        standing.rank = index + 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{Division, FixtureId, FixtureKind, SeasonId};

    use super::*;

    fn team(id: i64) -> Team {
        Team {
            id: TeamId(id),
            club: ClubId(id * 10),
            division: Division::Two,
            name: format!("Team {}", id),
        }
    }

    fn played(id: i64, home: i64, away: i64, score: (f64, f64)) -> Fixture {
        Fixture {
            id: FixtureId(id),
            season: SeasonId(2025),
            division: Division::Two,
            round: 1,
            date: NaiveDate::from_ymd_opt(2025, 5, 4).unwrap(),
            host_club: ClubId(home * 10),
            team1: TeamId(home),
            team2: TeamId(away),
            team1_points: score.0,
            team2_points: score.1,
            status: FixtureStatus::Completed,
            kind: FixtureKind::Regular,
            selection_override_until: None,
        }
    }

    fn row(table: &[Standing], team: i64) -> &Standing {
        table.iter().find(|s| s.team == TeamId(team)).unwrap()
    }

    #[test]
    fn test_points_and_home_away_split() {
        let teams = vec![team(1), team(2), team(3)];
        let fixtures = vec![
            played(1, 1, 2, (5.0, 3.0)),
            played(2, 3, 1, (2.5, 5.5)),
            played(3, 2, 3, (4.0, 4.0)),
        ];
        let table = compute_standings(&teams, &fixtures);

        let first = row(&table, 1);
        assert_eq!((first.wins, first.home_wins, first.away_wins), (2, 1, 1));
        assert_eq!(first.points, 4);
        assert_eq!(first.match_points_for, 10.5);
        assert_eq!(first.rank, 1);

        let second = row(&table, 2);
        assert_eq!((second.draws, second.losses, second.points), (1, 1, 1));
        let third = row(&table, 3);
        assert_eq!((third.draws, third.losses, third.points), (1, 1, 1));
    }

    #[test]
    fn test_away_wins_break_ties() {
        let teams = vec![team(1), team(2), team(3), team(4)];
        let fixtures = vec![
            // team 1 wins at home, team 2 wins away
            played(1, 1, 3, (6.0, 2.0)),
            played(2, 4, 2, (3.0, 5.0)),
        ];
        let table = compute_standings(&teams, &fixtures);

        assert_eq!(table[0].team, TeamId(2));
        assert_eq!(table[1].team, TeamId(1));
        assert_eq!(table[0].points, table[1].points);
        assert_eq!((table[0].rank, table[1].rank), (1, 2));
    }

    #[test]
    fn test_remaining_ties_keep_input_order() {
        let teams = vec![team(3), team(1), team(2)];
        let table = compute_standings(&teams, &[]);
        let order: Vec<_> = table.iter().map(|s| s.team).collect();
        assert_eq!(order, vec![TeamId(3), TeamId(1), TeamId(2)]);
        assert!(table.iter().all(|s| s.played == 0));
    }

    #[test]
    fn test_unfinished_fixtures_are_ignored() {
        let teams = vec![team(1), team(2)];
        let mut fixture = played(1, 1, 2, (8.0, 0.0));
        fixture.status = FixtureStatus::Scheduled;
        let table = compute_standings(&teams, &[fixture]);
        assert!(table.iter().all(|s| s.points == 0 && s.played == 0));
    }
}
