use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDate;
use interclub_core::{ClubId, SeasonId, Standing};

use crate::{AppState, actor::Caller, error::ApiError, parse_division};

#[derive(serde::Serialize)]
pub struct JsonStanding {
    rank: usize,
    team: i64,
    club: i64,
    played: u32,
    wins: u32,
    draws: u32,
    losses: u32,
    home_wins: u32,
    away_wins: u32,
    points: u32,
    match_points_for: f64,
    match_points_against: f64,
}

impl From<Standing> for JsonStanding {
    fn from(standing: Standing) -> Self {
        Self {
            rank: standing.rank,
            team: standing.team.0,
            club: standing.club.0,
            played: standing.played,
            wins: standing.wins,
            draws: standing.draws,
            losses: standing.losses,
            home_wins: standing.home_wins,
            away_wins: standing.away_wins,
            points: standing.points,
            match_points_for: standing.match_points_for,
            match_points_against: standing.match_points_against,
        }
    }
}

#[derive(serde::Deserialize)]
pub struct JsonFinalsRequest {
    date: NaiveDate,
    host_club: i64,
}

#[derive(serde::Serialize)]
pub struct JsonFinalsCreated {
    fixtures_created: usize,
}

pub async fn get_standings(
    State(state): State<AppState>,
    Path((season, division)): Path<(i64, String)>,
) -> Result<Json<Vec<JsonStanding>>, ApiError> {
    let division = parse_division(&division)?;
    let standings = state
        .app
        .standings_use_case
        .compute_standings(SeasonId(season), division)
        .await?;
    Ok(Json(standings.into_iter().map(JsonStanding::from).collect()))
}

pub async fn generate_finals(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((season, division)): Path<(i64, String)>,
    Json(request): Json<JsonFinalsRequest>,
) -> Result<Json<JsonFinalsCreated>, ApiError> {
    let division = parse_division(&division)?;
    let fixtures_created = state
        .app
        .finals_generate_use_case
        .generate_finals(
            actor,
            SeasonId(season),
            division,
            request.date,
            ClubId(request.host_club),
        )
        .await?;
    Ok(Json(JsonFinalsCreated { fixtures_created }))
}
