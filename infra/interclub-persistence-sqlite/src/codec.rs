//! Column encodings shared by the repositories.

use chrono::{DateTime, NaiveDate, Utc};
use interclub_core::{
    Division, Entrant, FixtureKind, FixtureStatus, Gender, KnockoutStage, MatchResult, PlayerId,
    Side,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}

pub fn division(value: &str) -> sqlx::Result<Division> {
    Division::parse(value).ok_or_else(|| decode_error(format!("unknown division '{}'", value)))
}

pub fn kind_to_str(kind: FixtureKind) -> &'static str {
    match kind {
        FixtureKind::Regular => "regular",
        FixtureKind::Knockout(stage) => stage.as_str(),
    }
}

pub fn kind(value: &str) -> sqlx::Result<FixtureKind> {
    if value == "regular" {
        return Ok(FixtureKind::Regular);
    }
    KnockoutStage::parse(value)
        .map(FixtureKind::Knockout)
        .ok_or_else(|| decode_error(format!("unknown fixture kind '{}'", value)))
}

pub fn status(value: &str) -> sqlx::Result<FixtureStatus> {
    FixtureStatus::parse(value)
        .ok_or_else(|| decode_error(format!("unknown fixture status '{}'", value)))
}

pub fn result(value: &str) -> sqlx::Result<MatchResult> {
    MatchResult::parse(value)
        .ok_or_else(|| decode_error(format!("unknown match result '{}'", value)))
}

pub fn gender_to_str(gender: Gender) -> &'static str {
    match gender {
        Gender::Female => "female",
        Gender::Male => "male",
    }
}

pub fn gender(value: &str) -> sqlx::Result<Gender> {
    match value {
        "female" => Ok(Gender::Female),
        "male" => Ok(Gender::Male),
        other => Err(decode_error(format!("unknown gender '{}'", other))),
    }
}

pub fn date_to_str(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn date(value: &str) -> sqlx::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| decode_error(format!("invalid date '{}': {}", value, e)))
}

pub fn timestamp_to_str(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

pub fn timestamp(value: &str) -> sqlx::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| decode_error(format!("invalid timestamp '{}': {}", value, e)))
}

pub fn side(value: i64) -> sqlx::Result<Side> {
    match value {
        1 => Ok(Side::One),
        2 => Ok(Side::Two),
        other => Err(decode_error(format!("unknown side {}", other))),
    }
}

pub fn small(value: i64, column: &str) -> sqlx::Result<u8> {
    u8::try_from(value).map_err(|_| decode_error(format!("{} out of range: {}", column, value)))
}

/// An entrant spread over the (player, partner, handicap) columns of its side.
pub type EntrantColumns = (Option<i64>, Option<i64>, Option<f64>);

pub fn entrant_to_columns(entrant: Option<&Entrant>) -> EntrantColumns {
    match entrant {
        None => (None, None, None),
        Some(Entrant::Single { player, handicap }) => (Some(player.0), None, Some(*handicap)),
        Some(Entrant::Foursome {
            first,
            second,
            handicap,
        }) => (Some(first.0), Some(second.0), Some(*handicap)),
    }
}

pub fn entrant(columns: EntrantColumns) -> Option<Entrant> {
    match columns {
        (Some(player), None, Some(handicap)) => Some(Entrant::Single {
            player: PlayerId(player),
            handicap,
        }),
        (Some(first), Some(second), Some(handicap)) => Some(Entrant::Foursome {
            first: PlayerId(first),
            second: PlayerId(second),
            handicap,
        }),
        _ => None,
    }
}
