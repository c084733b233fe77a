pub mod finals;
pub mod handicap;
pub mod lock;
pub mod pairing;
pub mod schedule;
pub mod standings;

use chrono::{DateTime, NaiveDate, Utc};

pub use handicap::StrokeAllowance;
pub use pairing::{Entrant, IndividualMatch, MatchResult, SelectedPlayer, SlotLineup};
pub use standings::Standing;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(SeasonId);
id_type!(ClubId);
id_type!(TeamId);
id_type!(PlayerId);
id_type!(FixtureId);

/// Regular fixtures occupy rounds 1 to 5 of a division.
pub const MAX_REGULAR_ROUNDS: u8 = 5;

/// Knockout fixtures created by finals seeding are filed under this round.
pub const FINALS_ROUND: u8 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Division {
    One,
    Two,
}

impl Division {
    pub fn as_str(&self) -> &'static str {
        match self {
            Division::One => "one",
            Division::Two => "two",
        }
    }

    pub fn parse(value: &str) -> Option<Division> {
        match value.trim().to_lowercase().as_str() {
            "one" | "1" => Some(Division::One),
            "two" | "2" => Some(Division::Two),
            _ => None,
        }
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Team {
    pub id: TeamId,
    pub club: ClubId,
    pub division: Division,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub club: ClubId,
    pub handicap_index: f64,
    pub gender: Gender,
    pub junior: bool,
    pub validated: bool,
}

/// One scheduled round of a division as configured for the season.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundDate {
    pub round: u8,
    pub date: NaiveDate,
    pub host: Option<ClubId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KnockoutStage {
    Championship,
    ThirdPlace,
    FifthPlace,
}

impl KnockoutStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnockoutStage::Championship => "championship",
            KnockoutStage::ThirdPlace => "third_place",
            KnockoutStage::FifthPlace => "fifth_place",
        }
    }

    pub fn parse(value: &str) -> Option<KnockoutStage> {
        match value {
            "championship" => Some(KnockoutStage::Championship),
            "third_place" => Some(KnockoutStage::ThirdPlace),
            "fifth_place" => Some(KnockoutStage::FifthPlace),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FixtureKind {
    Regular,
    Knockout(KnockoutStage),
}

impl FixtureKind {
    /// Number of players a full selection holds for this kind of fixture.
    pub fn selection_size(&self) -> usize {
        match self {
            FixtureKind::Regular => 8,
            FixtureKind::Knockout(_) => 10,
        }
    }

    /// Number of individual matches generated for this kind of fixture.
    pub fn slot_count(&self) -> usize {
        match self {
            FixtureKind::Regular => 8,
            FixtureKind::Knockout(_) => 5,
        }
    }

    pub fn is_knockout(&self) -> bool {
        matches!(self, FixtureKind::Knockout(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FixtureStatus {
    Scheduled,
    Completed,
}

impl FixtureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureStatus::Scheduled => "scheduled",
            FixtureStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<FixtureStatus> {
        match value {
            "scheduled" => Some(FixtureStatus::Scheduled),
            "completed" => Some(FixtureStatus::Completed),
            _ => None,
        }
    }
}

/// A fixture produced by the scheduler or finals seeding, not yet stored.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedFixture {
    pub division: Division,
    pub round: u8,
    pub date: NaiveDate,
    pub host_club: ClubId,
    pub team1: TeamId,
    pub team2: TeamId,
    pub kind: FixtureKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fixture {
    pub id: FixtureId,
    pub season: SeasonId,
    pub division: Division,
    pub round: u8,
    pub date: NaiveDate,
    pub host_club: ClubId,
    pub team1: TeamId,
    pub team2: TeamId,
    pub team1_points: f64,
    pub team2_points: f64,
    pub status: FixtureStatus,
    pub kind: FixtureKind,
    pub selection_override_until: Option<DateTime<Utc>>,
}

impl Fixture {
    pub fn from_planned(id: FixtureId, season: SeasonId, planned: PlannedFixture) -> Self {
        Self {
            id,
            season,
            division: planned.division,
            round: planned.round,
            date: planned.date,
            host_club: planned.host_club,
            team1: planned.team1,
            team2: planned.team2,
            team1_points: 0.0,
            team2_points: 0.0,
            status: FixtureStatus::Scheduled,
            kind: planned.kind,
            selection_override_until: None,
        }
    }

    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if team == self.team1 {
            Some(Side::One)
        } else if team == self.team2 {
            Some(Side::Two)
        } else {
            None
        }
    }

    pub fn team_on(&self, side: Side) -> TeamId {
        match side {
            Side::One => self.team1,
            Side::Two => self.team2,
        }
    }

    pub fn is_regular(&self) -> bool {
        self.kind == FixtureKind::Regular
    }
}

/// Which of the two teams of a fixture an entrant or a result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Side::One => 1,
            Side::Two => 2,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "side {}", self.number())
    }
}

/// One line of a captain's selection: a player and the position they were
/// submitted at, starting from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SelectionEntry {
    pub player: PlayerId,
    pub order: u8,
}
