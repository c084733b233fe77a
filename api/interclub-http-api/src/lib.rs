use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use interclub_app::Application;
use interclub_core::Division;
use log::info;

use crate::error::ApiError;

mod actor;
mod error;
mod fixtures;
mod pairings;
mod selection;
mod standings;

pub use actor::{ROLE_HEADER, TEAM_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
}

pub fn router(app: Arc<Application>) -> Router {
    let admin = Router::new()
        .route(
            "/fixtures/{id}/scratch-notices/{team}/acknowledge",
            post(selection::acknowledge_scratch_notice),
        )
        .route(
            "/fixtures/{id}/selection-override",
            put(fixtures::set_selection_override),
        )
        .route(
            "/fixtures/{id}/pairings/{slot}/result",
            put(pairings::record_result),
        )
        .route("/fixtures/{id}/complete", post(fixtures::complete_fixture));

    let router: Router<AppState> = Router::new()
        .route(
            "/seasons/{season}/divisions/{division}/fixtures",
            get(fixtures::list_fixtures).post(fixtures::generate_fixtures),
        )
        .route(
            "/seasons/{season}/divisions/{division}/standings",
            get(standings::get_standings),
        )
        .route(
            "/seasons/{season}/divisions/{division}/finals",
            post(standings::generate_finals),
        )
        .route(
            "/fixtures/{id}/pairings",
            get(pairings::list_pairings).post(pairings::generate_pairings),
        )
        .route(
            "/fixtures/{id}/selections/{team}",
            put(selection::submit_selection),
        )
        .route(
            "/fixtures/{id}/selections/{team}/lock",
            get(selection::get_selection_lock),
        )
        .route(
            "/fixtures/{id}/scratch-notices/{team}",
            post(selection::submit_scratch_notice),
        )
        .nest("/admin", admin);

    router.with_state(AppState { app })
}

pub async fn run(
    app: Arc<Application>,
    port: u16,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API server listening on port {}", port);
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP API shut down gracefully");
    Ok(())
}

fn parse_division(value: &str) -> Result<Division, ApiError> {
    Division::parse(value)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown division '{}'", value)))
}
