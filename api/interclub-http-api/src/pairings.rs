use axum::{
    Json,
    extract::{Path, State},
};
use interclub_core::{Entrant, FixtureId, IndividualMatch, MatchResult, Side};

use crate::{AppState, actor::Caller, error::ApiError, fixtures::JsonFixturePoints};

#[derive(serde::Serialize)]
pub struct JsonEntrant {
    players: Vec<i64>,
    handicap: f64,
}

impl From<&Entrant> for JsonEntrant {
    fn from(entrant: &Entrant) -> Self {
        Self {
            players: entrant.players().into_iter().map(|p| p.0).collect(),
            handicap: entrant.handicap(),
        }
    }
}

/// One slot of a fixture. A missing side means nobody was designated.
#[derive(serde::Serialize)]
pub struct JsonIndividualMatch {
    slot: u8,
    side1: Option<JsonEntrant>,
    side2: Option<JsonEntrant>,
    strokes_given: u32,
    stroke_receiver: Option<u8>,
    result: &'static str,
    points1: f64,
    points2: f64,
    forfeit_reason: Option<String>,
}

impl From<IndividualMatch> for JsonIndividualMatch {
    fn from(m: IndividualMatch) -> Self {
        Self {
            slot: m.slot,
            side1: m.lineup.entrant(Side::One).map(JsonEntrant::from),
            side2: m.lineup.entrant(Side::Two).map(JsonEntrant::from),
            strokes_given: m.strokes.strokes_given,
            stroke_receiver: m.strokes.receiver.map(|side| side.number()),
            result: m.result.as_str(),
            points1: m.points1,
            points2: m.points2,
            forfeit_reason: m.forfeit_reason,
        }
    }
}

#[derive(serde::Serialize)]
pub struct JsonMatchupsGenerated {
    pub matchups_generated: usize,
}

#[derive(serde::Deserialize)]
pub struct JsonMatchResultRequest {
    result: String,
}

pub async fn generate_pairings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<JsonMatchupsGenerated>, ApiError> {
    let matchups_generated = state
        .app
        .pairings_generate_use_case
        .generate_pairings(FixtureId(id))
        .await?;
    Ok(Json(JsonMatchupsGenerated { matchups_generated }))
}

pub async fn list_pairings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<JsonIndividualMatch>>, ApiError> {
    let matches = state
        .app
        .pairings_list_use_case
        .list_pairings(FixtureId(id))
        .await?;
    Ok(Json(
        matches.into_iter().map(JsonIndividualMatch::from).collect(),
    ))
}

pub async fn record_result(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((id, slot)): Path<(i64, u8)>,
    Json(request): Json<JsonMatchResultRequest>,
) -> Result<Json<JsonFixturePoints>, ApiError> {
    let result = MatchResult::parse(request.result.trim()).ok_or_else(|| {
        ApiError::bad_request(format!("Unknown match result '{}'", request.result))
    })?;
    let (team1_points, team2_points) = state
        .app
        .match_result_use_case
        .record_result(actor, FixtureId(id), slot, result)
        .await?;
    Ok(Json(JsonFixturePoints {
        team1_points,
        team2_points,
    }))
}
