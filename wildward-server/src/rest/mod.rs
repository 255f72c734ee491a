// rest/mod.rs — Public REST API server.
//
// Axum HTTP server bridging REST calls to the in-memory world.
//
// Endpoints:
//   GET  /api/health
//   GET  /api/time/current
//   POST /api/time/speed/set
//   POST /api/player
//   GET  /api/player/{id}
//   POST /api/player/{id}/sleep
//   GET  /api/inventory/{id}
//   POST /api/storage/deposit
//   POST /api/storage/withdraw
//   POST /api/craft
//   POST /api/gather
//   POST /api/consume
//   GET  /api/expeditions/{player_id}
//   POST /api/expedition/start
//   POST /api/expedition/pause
//   POST /api/expedition/resume
//   POST /api/expedition/abort
//   GET  /api/biomes
//   GET  /api/recipes

pub mod routes;

use anyhow::Result;
use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use wildward_game::WorldError;

use crate::AppContext;

pub const DEFAULT_PORT: u16 = 4410;

pub async fn start_rest_server(ctx: Arc<AppContext>, bind: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        // Time
        .route("/api/time/current", get(routes::time::current_time))
        .route("/api/time/speed/set", post(routes::time::set_speed))
        // Players
        .route("/api/player", post(routes::players::create_player))
        .route("/api/player/{id}", get(routes::players::get_player))
        .route("/api/player/{id}/sleep", post(routes::players::set_sleep))
        // Items and containers
        .route("/api/inventory/{id}", get(routes::items::get_inventory))
        .route("/api/storage/deposit", post(routes::items::deposit))
        .route("/api/storage/withdraw", post(routes::items::withdraw))
        .route("/api/craft", post(routes::items::craft_item))
        .route("/api/gather", post(routes::items::gather))
        .route("/api/consume", post(routes::items::consume))
        // Expeditions
        .route(
            "/api/expeditions/{player_id}",
            get(routes::expeditions::get_expedition),
        )
        .route(
            "/api/expedition/start",
            post(routes::expeditions::start_expedition),
        )
        .route(
            "/api/expedition/pause",
            post(routes::expeditions::pause_expedition),
        )
        .route(
            "/api/expedition/resume",
            post(routes::expeditions::resume_expedition),
        )
        .route(
            "/api/expedition/abort",
            post(routes::expeditions::abort_expedition),
        )
        // Catalogs
        .route("/api/biomes", get(routes::catalog::list_biomes))
        .route("/api/recipes", get(routes::catalog::list_recipes))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Map a world error onto an HTTP status and JSON body.
pub(crate) fn error_response(err: &WorldError) -> (StatusCode, Json<Value>) {
    let status = match err {
        WorldError::UnknownPlayer(_)
        | WorldError::UnknownBiome(_)
        | WorldError::UnknownRecipe(_)
        | WorldError::UnknownItem(_)
        | WorldError::UnknownPlan(_)
        | WorldError::NoExpedition(_) => StatusCode::NOT_FOUND,
        // Rule violations: the request was well formed but the world state
        // forbids it right now.
        WorldError::Incapacitated(_)
        | WorldError::LevelTooLow { .. }
        | WorldError::NotEnoughEnergy { .. }
        | WorldError::NothingToGather
        | WorldError::ExpeditionAlreadyActive(_)
        | WorldError::Inventory(_)
        | WorldError::Craft(_)
        | WorldError::Expedition(_) => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": err.to_string() })))
}
