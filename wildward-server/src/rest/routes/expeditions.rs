// rest/routes/expeditions.rs — Expedition REST routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use wildward_game::WorldError;

use crate::AppContext;
use crate::context::now_epoch_ms;
use crate::rest::error_response;

pub async fn get_expedition(
    State(ctx): State<Arc<AppContext>>,
    Path(player_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let world = ctx.world.read().await;
    if world.player(&player_id).is_none() {
        return Err(error_response(&WorldError::UnknownPlayer(player_id)));
    }
    Ok(Json(json!({ "expedition": world.expedition_for(&player_id) })))
}

#[derive(Deserialize)]
pub struct StartExpeditionRequest {
    pub player_id: String,
    pub plan_id: String,
}

pub async fn start_expedition(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<StartExpeditionRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut world = ctx.world.write().await;
    let id = world
        .start_expedition(&body.player_id, &body.plan_id, now_epoch_ms())
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({ "id": id })))
}

#[derive(Deserialize)]
pub struct ExpeditionActionRequest {
    pub player_id: String,
}

pub async fn pause_expedition(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ExpeditionActionRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut world = ctx.world.write().await;
    world
        .pause_expedition(&body.player_id, now_epoch_ms())
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn resume_expedition(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ExpeditionActionRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut world = ctx.world.write().await;
    world
        .resume_expedition(&body.player_id, now_epoch_ms())
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn abort_expedition(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ExpeditionActionRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut world = ctx.world.write().await;
    world
        .abort_expedition(&body.player_id, now_epoch_ms())
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({ "ok": true })))
}
