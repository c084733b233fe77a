use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use interclub_core::{Fixture, FixtureId, FixtureKind, SeasonId};

use crate::{AppState, actor::Caller, error::ApiError, parse_division};

#[derive(serde::Serialize)]
pub struct JsonFixture {
    id: i64,
    season: i64,
    division: &'static str,
    round: u8,
    date: NaiveDate,
    host_club: i64,
    team1: i64,
    team2: i64,
    team1_points: f64,
    team2_points: f64,
    status: &'static str,
    kind: &'static str,
    selection_override_until: Option<DateTime<Utc>>,
}

impl From<Fixture> for JsonFixture {
    fn from(fixture: Fixture) -> Self {
        Self {
            id: fixture.id.0,
            season: fixture.season.0,
            division: fixture.division.as_str(),
            round: fixture.round,
            date: fixture.date,
            host_club: fixture.host_club.0,
            team1: fixture.team1.0,
            team2: fixture.team2.0,
            team1_points: fixture.team1_points,
            team2_points: fixture.team2_points,
            status: fixture.status.as_str(),
            kind: match fixture.kind {
                FixtureKind::Regular => "regular",
                FixtureKind::Knockout(stage) => stage.as_str(),
            },
            selection_override_until: fixture.selection_override_until,
        }
    }
}

#[derive(serde::Serialize)]
pub struct JsonFixturesCreated {
    fixtures_created: usize,
}

#[derive(serde::Serialize)]
pub struct JsonFixturePoints {
    pub team1_points: f64,
    pub team2_points: f64,
}

#[derive(serde::Deserialize)]
pub struct JsonSelectionOverrideRequest {
    until: Option<DateTime<Utc>>,
}

pub async fn generate_fixtures(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((season, division)): Path<(i64, String)>,
) -> Result<Json<JsonFixturesCreated>, ApiError> {
    let division = parse_division(&division)?;
    let fixtures_created = state
        .app
        .fixtures_generate_use_case
        .generate_fixtures(actor, SeasonId(season), division)
        .await?;
    Ok(Json(JsonFixturesCreated { fixtures_created }))
}

pub async fn list_fixtures(
    State(state): State<AppState>,
    Path((season, division)): Path<(i64, String)>,
) -> Result<Json<Vec<JsonFixture>>, ApiError> {
    let division = parse_division(&division)?;
    let fixtures = state
        .app
        .fixtures_list_use_case
        .list_fixtures(SeasonId(season), division)
        .await?;
    Ok(Json(fixtures.into_iter().map(JsonFixture::from).collect()))
}

pub async fn set_selection_override(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<i64>,
    Json(request): Json<JsonSelectionOverrideRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .app
        .selection_override_use_case
        .set_selection_override(actor, FixtureId(id), request.until)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn complete_fixture(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<i64>,
) -> Result<Json<JsonFixturePoints>, ApiError> {
    let (team1_points, team2_points) = state
        .app
        .fixtures_complete_use_case
        .complete_fixture(actor, FixtureId(id))
        .await?;
    Ok(Json(JsonFixturePoints {
        team1_points,
        team2_points,
    }))
}
