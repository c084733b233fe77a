use std::cmp::Ordering;

use crate::Side;

/// Handicap indexes above this value are played off this value.
pub const HANDICAP_CAP: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayFormat {
    Singles,
    Foursomes,
}

impl PlayFormat {
    pub fn allowance(&self) -> f64 {
        match self {
            PlayFormat::Singles => 0.75,
            PlayFormat::Foursomes => 0.375,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StrokeAllowance {
    pub strokes_given: u32,
    pub receiver: Option<Side>,
}

impl StrokeAllowance {
    pub fn none() -> Self {
        Self::default()
    }
}

pub fn capped(handicap_index: f64) -> f64 {
    handicap_index.min(HANDICAP_CAP)
}

/// One side's handicap in a slot. `index` is the uncapped handicap index, or
/// the pair average for foursomes. `figure` is what strokes are computed off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayingHandicap {
    pub index: f64,
    pub figure: f64,
}

impl PlayingHandicap {
    pub fn single(handicap_index: f64) -> Self {
        Self {
            index: handicap_index,
            figure: capped(handicap_index),
        }
    }

    /// Each partner is capped and rounded on their own before the two are
    /// averaged.
    pub fn foursome(first: f64, second: f64) -> Self {
        Self {
            index: (first + second) / 2.0,
            figure: (capped(first).round() + capped(second).round()) / 2.0,
        }
    }
}

/// Strokes the weaker side receives for a matchup. All rounding is
/// `f64::round`, half away from zero.
pub fn stroke_allowance(
    side1: PlayingHandicap,
    side2: PlayingHandicap,
    format: PlayFormat,
) -> StrokeAllowance {
    let rounded1 = side1.figure.round();
    let rounded2 = side2.figure.round();
    let difference = (rounded1 - rounded2).abs();
    if difference == 0.0 {
        return StrokeAllowance::none();
    }

    let strokes_given = (difference * format.allowance()).round() as u32;
    // the receiver is decided on the uncapped handicaps
    let side1_receives = match side1.index.total_cmp(&side2.index) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => rounded1 > rounded2,
    };
    let receiver = if side1_receives { Side::One } else { Side::Two };

    StrokeAllowance {
        strokes_given,
        receiver: Some(receiver),
    }
}
