use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
};
use interclub_app::domain::Actor;
use interclub_core::TeamId;

use crate::error::ApiError;

pub const ROLE_HEADER: &str = "x-interclub-role";
pub const TEAM_HEADER: &str = "x-interclub-team";

/// The caller as identified by the gateway in front of the server.
pub struct Caller(pub Actor);

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    headers
        .get(name)
        .map(|value| {
            value.to_str().map(str::trim).map_err(|_| {
                ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid {} header", name))
            })
        })
        .transpose()
}

fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
    if let Some(role) = header_value(headers, ROLE_HEADER)? {
        if role.eq_ignore_ascii_case("admin") {
            return Ok(Actor::Administrator);
        }
        if !role.eq_ignore_ascii_case("captain") {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("Unknown role '{}'", role),
            ));
        }
    }
    match header_value(headers, TEAM_HEADER)? {
        Some(team) => team
            .parse::<i64>()
            .map(|id| Actor::Captain(TeamId(id)))
            .map_err(|_| {
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid team id '{}'", team),
                )
            }),
        None => Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Missing caller identity".to_string(),
        )),
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(Caller)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_admin_role_wins_over_team() {
        let actor = actor_from_headers(&headers(&[(ROLE_HEADER, "Admin"), (TEAM_HEADER, "7")]));
        assert_eq!(actor.unwrap(), Actor::Administrator);
    }

    #[test]
    fn test_team_header_makes_a_captain() {
        let actor = actor_from_headers(&headers(&[(TEAM_HEADER, " 12 ")]));
        assert_eq!(actor.unwrap(), Actor::Captain(TeamId(12)));

        let actor = actor_from_headers(&headers(&[(ROLE_HEADER, "captain"), (TEAM_HEADER, "3")]));
        assert_eq!(actor.unwrap(), Actor::Captain(TeamId(3)));
    }

    #[test]
    fn test_missing_or_malformed_identity_is_rejected() {
        let missing = actor_from_headers(&HeaderMap::new()).unwrap_err();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let malformed = actor_from_headers(&headers(&[(TEAM_HEADER, "first")])).unwrap_err();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let unknown = actor_from_headers(&headers(&[(ROLE_HEADER, "referee")])).unwrap_err();
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    }
}
