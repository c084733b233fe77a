use std::collections::HashSet;

use thiserror::Error;

use crate::{
    FixtureKind, PlayerId, SelectionEntry, Side,
    handicap::{self, PlayFormat, PlayingHandicap, StrokeAllowance},
};

/// A selection entry joined with the handicap index it is played off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectedPlayer {
    pub player: PlayerId,
    pub order: u8,
    pub handicap_index: f64,
}

impl SelectedPlayer {
    pub fn entry(&self) -> SelectionEntry {
        SelectionEntry {
            player: self.player,
            order: self.order,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Entrant {
    Single {
        player: PlayerId,
        handicap: f64,
    },
    Foursome {
        first: PlayerId,
        second: PlayerId,
        handicap: f64,
    },
}

impl Entrant {
    /// The figure used for the stroke computation.
    pub fn handicap(&self) -> f64 {
        match self {
            Entrant::Single { handicap, .. } | Entrant::Foursome { handicap, .. } => *handicap,
        }
    }

    pub fn players(&self) -> Vec<PlayerId> {
        match self {
            Entrant::Single { player, .. } => vec![*player],
            Entrant::Foursome { first, second, .. } => vec![*first, *second],
        }
    }

    fn same_players(&self, other: &Entrant) -> bool {
        let mut mine = self.players();
        let mut theirs = other.players();
        mine.sort();
        theirs.sort();
        mine == theirs
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SlotLineup {
    BothPresent { side1: Entrant, side2: Entrant },
    OneForfeited { present: Side, entrant: Entrant },
    NoneDesignated,
}

impl SlotLineup {
    pub fn entrant(&self, side: Side) -> Option<&Entrant> {
        match (self, side) {
            (SlotLineup::BothPresent { side1, .. }, Side::One) => Some(side1),
            (SlotLineup::BothPresent { side2, .. }, Side::Two) => Some(side2),
            (SlotLineup::OneForfeited { present, entrant }, side) if *present == side => {
                Some(entrant)
            }
            _ => None,
        }
    }

    pub fn same_players(&self, other: &SlotLineup) -> bool {
        [Side::One, Side::Two]
            .iter()
            .all(|side| match (self.entrant(*side), other.entrant(*side)) {
                (Some(a), Some(b)) => a.same_players(b),
                (None, None) => true,
                _ => false,
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchResult {
    Pending,
    Side1,
    Side2,
    Tie,
}

impl MatchResult {
    pub fn won_by(side: Side) -> Self {
        match side {
            Side::One => MatchResult::Side1,
            Side::Two => MatchResult::Side2,
        }
    }

    /// Points earned by each side for this result.
    pub fn points(&self) -> (f64, f64) {
        match self {
            MatchResult::Pending => (0.0, 0.0),
            MatchResult::Side1 => (1.0, 0.0),
            MatchResult::Side2 => (0.0, 1.0),
            MatchResult::Tie => (0.5, 0.5),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchResult::Pending => "pending",
            MatchResult::Side1 => "side1",
            MatchResult::Side2 => "side2",
            MatchResult::Tie => "tie",
        }
    }

    pub fn parse(value: &str) -> Option<MatchResult> {
        match value {
            "pending" => Some(MatchResult::Pending),
            "side1" => Some(MatchResult::Side1),
            "side2" => Some(MatchResult::Side2),
            "tie" => Some(MatchResult::Tie),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndividualMatch {
    pub slot: u8,
    pub lineup: SlotLineup,
    pub strokes: StrokeAllowance,
    pub result: MatchResult,
    pub points1: f64,
    pub points2: f64,
    pub forfeit_reason: Option<String>,
}

impl IndividualMatch {
    pub fn is_forfeit(&self) -> bool {
        matches!(self.lineup, SlotLineup::OneForfeited { .. })
    }

    /// A slot still waiting for a result from the course.
    pub fn is_awaiting_result(&self) -> bool {
        matches!(self.lineup, SlotLineup::BothPresent { .. }) && self.result == MatchResult::Pending
    }

    pub fn record_result(&mut self, result: MatchResult) -> Result<(), ResultEntryError> {
        match self.lineup {
            SlotLineup::NoneDesignated => Err(ResultEntryError::NoEntrants(self.slot)),
            SlotLineup::OneForfeited { .. } => Err(ResultEntryError::Forfeited(self.slot)),
            SlotLineup::BothPresent { .. } => {
                self.set_result(result);
                Ok(())
            }
        }
    }

    fn set_result(&mut self, result: MatchResult) {
        let (points1, points2) = result.points();
        self.result = result;
        self.points1 = points1;
        self.points2 = points2;
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairingError {
    #[error("{side} selected {got} players, at most {max} are allowed")]
    TooManyPlayers { side: Side, max: usize, got: usize },

    #[error("{side} selection order must run from 1 without gaps")]
    OrderNotDense { side: Side },

    #[error("{side} selected player {player} more than once")]
    DuplicatePlayer { side: Side, player: PlayerId },

    #[error("{side} selected {got} players, foursomes need an even number")]
    OddFoursomeSelection { side: Side, got: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResultEntryError {
    #[error("match {0} has no designated players")]
    NoEntrants(u8),

    #[error("match {0} was decided by forfeit")]
    Forfeited(u8),

    #[error("there is no match {0}")]
    UnknownSlot(u8),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompletionError {
    #[error("no pairings have been generated")]
    NotPaired,

    #[error("matches {0:?} still await a result")]
    PendingMatches(Vec<u8>),
}

/// Checks a selection against the shape a fixture of `kind` accepts.
pub fn check_selection(
    kind: FixtureKind,
    side: Side,
    entries: &[SelectionEntry],
) -> Result<(), PairingError> {
    let max = kind.selection_size();
    if entries.len() > max {
        return Err(PairingError::TooManyPlayers {
            side,
            max,
            got: entries.len(),
        });
    }

    let mut orders: Vec<u8> = entries.iter().map(|e| e.order).collect();
    orders.sort_unstable();
    if orders
        .iter()
        .enumerate()
        .any(|(index, order)| *order as usize != index + 1)
    {
        return Err(PairingError::OrderNotDense { side });
    }

    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.player) {
            return Err(PairingError::DuplicatePlayer {
                side,
                player: entry.player,
            });
        }
    }

    if kind.is_knockout() && entries.len() % 2 == 1 {
        return Err(PairingError::OddFoursomeSelection {
            side,
            got: entries.len(),
        });
    }

    Ok(())
}

/// Turns both sides' selections into the individual matches of a fixture.
///
/// Either side may be incomplete or empty. Slots where only one side has an
/// entrant are forfeited to that side; slots with nobody stay empty.
pub fn generate_pairings(
    kind: FixtureKind,
    side1: &[SelectedPlayer],
    side2: &[SelectedPlayer],
) -> Result<Vec<IndividualMatch>, PairingError> {
    let side1 = ordered_selection(kind, Side::One, side1)?;
    let side2 = ordered_selection(kind, Side::Two, side2)?;

    let (entrants1, entrants2, format) = match kind {
        FixtureKind::Regular => (singles(side1), singles(side2), PlayFormat::Singles),
        FixtureKind::Knockout(_) => (foursomes(&side1), foursomes(&side2), PlayFormat::Foursomes),
    };

    let mut entrants1 = entrants1.into_iter();
    let mut entrants2 = entrants2.into_iter();
    let matches = (1..=kind.slot_count() as u8)
        .map(|slot| build_slot(slot, entrants1.next(), entrants2.next(), format))
        .collect();

    Ok(matches)
}

fn ordered_selection(
    kind: FixtureKind,
    side: Side,
    selection: &[SelectedPlayer],
) -> Result<Vec<SelectedPlayer>, PairingError> {
    let entries: Vec<SelectionEntry> = selection.iter().map(SelectedPlayer::entry).collect();
    check_selection(kind, side, &entries)?;

    let mut ordered = selection.to_vec();
    ordered.sort_by_key(|p| p.order);
    Ok(ordered)
}

// sort_by is stable, so equal handicaps keep the captain's order
fn singles(mut selection: Vec<SelectedPlayer>) -> Vec<(Entrant, PlayingHandicap)> {
    selection.sort_by(|a, b| a.handicap_index.total_cmp(&b.handicap_index));
    selection
        .into_iter()
        .map(|p| {
            let playing = PlayingHandicap::single(p.handicap_index);
            let entrant = Entrant::Single {
                player: p.player,
                handicap: playing.figure,
            };
            (entrant, playing)
        })
        .collect()
}

fn foursomes(selection: &[SelectedPlayer]) -> Vec<(Entrant, PlayingHandicap)> {
    let mut pairs: Vec<(Entrant, PlayingHandicap)> = selection
        .chunks_exact(2)
        .map(|pair| {
            let playing =
                PlayingHandicap::foursome(pair[0].handicap_index, pair[1].handicap_index);
            let entrant = Entrant::Foursome {
                first: pair[0].player,
                second: pair[1].player,
                handicap: playing.figure,
            };
            (entrant, playing)
        })
        .collect();
    pairs.sort_by(|(_, a), (_, b)| a.index.total_cmp(&b.index));
    pairs
}

fn build_slot(
    slot: u8,
    entrant1: Option<(Entrant, PlayingHandicap)>,
    entrant2: Option<(Entrant, PlayingHandicap)>,
    format: PlayFormat,
) -> IndividualMatch {
    match (entrant1, entrant2) {
        (Some((side1, playing1)), Some((side2, playing2))) => IndividualMatch {
            slot,
            strokes: handicap::stroke_allowance(playing1, playing2, format),
            lineup: SlotLineup::BothPresent { side1, side2 },
            result: MatchResult::Pending,
            points1: 0.0,
            points2: 0.0,
            forfeit_reason: None,
        },
        (Some((entrant, _)), None) => forfeit(slot, Side::One, entrant, format),
        (None, Some((entrant, _))) => forfeit(slot, Side::Two, entrant, format),
        (None, None) => IndividualMatch {
            slot,
            lineup: SlotLineup::NoneDesignated,
            strokes: StrokeAllowance::none(),
            result: MatchResult::Pending,
            points1: 0.0,
            points2: 0.0,
            forfeit_reason: None,
        },
    }
}

fn forfeit(slot: u8, present: Side, entrant: Entrant, format: PlayFormat) -> IndividualMatch {
    let missing = match format {
        PlayFormat::Singles => "a player",
        PlayFormat::Foursomes => "a pair",
    };
    let mut forfeited = IndividualMatch {
        slot,
        lineup: SlotLineup::OneForfeited { present, entrant },
        strokes: StrokeAllowance::none(),
        result: MatchResult::Pending,
        points1: 0.0,
        points2: 0.0,
        forfeit_reason: Some(format!(
            "Team {} did not designate {} for match {}",
            present.opponent().number(),
            missing,
            slot
        )),
    };
    forfeited.set_result(MatchResult::won_by(present));
    forfeited
}

/// Carries recorded results over to regenerated matches whose lineup did not
/// change. Every other slot keeps its freshly generated state.
pub fn merge_recorded_results(
    previous: &[IndividualMatch],
    regenerated: Vec<IndividualMatch>,
) -> Vec<IndividualMatch> {
    regenerated
        .into_iter()
        .map(|mut current| {
            let carried = previous.iter().find(|old| {
                old.slot == current.slot
                    && matches!(current.lineup, SlotLineup::BothPresent { .. })
                    && matches!(old.lineup, SlotLineup::BothPresent { .. })
                    && old.result != MatchResult::Pending
                    && old.lineup.same_players(&current.lineup)
            });
            if let Some(old) = carried {
                current.set_result(old.result);
            }
            current
        })
        .collect()
}

/// Records `result` on the match played in `slot`.
pub fn record_slot_result(
    matches: &mut [IndividualMatch],
    slot: u8,
    result: MatchResult,
) -> Result<(), ResultEntryError> {
    matches
        .iter_mut()
        .find(|m| m.slot == slot)
        .ok_or(ResultEntryError::UnknownSlot(slot))?
        .record_result(result)
}

/// Final team points, once every match with two entrants has a result.
pub fn final_points(matches: &[IndividualMatch]) -> Result<(f64, f64), CompletionError> {
    if matches.is_empty() {
        return Err(CompletionError::NotPaired);
    }
    let pending: Vec<u8> = matches
        .iter()
        .filter(|m| m.is_awaiting_result())
        .map(|m| m.slot)
        .collect();
    if !pending.is_empty() {
        return Err(CompletionError::PendingMatches(pending));
    }
    Ok(fixture_points(matches))
}

/// Team points of a fixture as the sum of its individual matches.
pub fn fixture_points(matches: &[IndividualMatch]) -> (f64, f64) {
    matches.iter().fold((0.0, 0.0), |(total1, total2), m| {
        (total1 + m.points1, total2 + m.points2)
    })
}
