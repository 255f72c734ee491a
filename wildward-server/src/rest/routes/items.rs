// rest/routes/items.rs — Inventory, storage, crafting and consumption routes.

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

pub async fn get_inventory(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let world = ctx.world.read().await;
    let player = world
        .player(&id)
        .ok_or_else(|| error_response(&WorldError::UnknownPlayer(id.clone())))?;
    Ok(Json(json!({
        "inventory": player.inventory,
        "storage": player.storage,
    })))
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub player_id: String,
    pub item_id: String,
    pub quantity: u32,
}

pub async fn deposit(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<TransferRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut world = ctx.world.write().await;
    world
        .deposit(&body.player_id, &body.item_id, body.quantity)
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn withdraw(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<TransferRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut world = ctx.world.write().await;
    world
        .withdraw(&body.player_id, &body.item_id, body.quantity)
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct CraftRequest {
    pub player_id: String,
    pub recipe_id: String,
}

pub async fn craft_item(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CraftRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut world = ctx.world.write().await;
    let outcome = world
        .craft_item(&body.player_id, &body.recipe_id)
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({ "outcome": outcome })))
}

#[derive(Deserialize)]
pub struct GatherRequest {
    pub player_id: String,
    pub biome_id: String,
}

pub async fn gather(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<GatherRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut world = ctx.world.write().await;
    let outcome = world
        .gather(&body.player_id, &body.biome_id, now_epoch_ms())
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({ "outcome": outcome })))
}

#[derive(Deserialize)]
pub struct ConsumeRequest {
    pub player_id: String,
    pub item_id: String,
}

pub async fn consume(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ConsumeRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut world = ctx.world.write().await;
    world
        .consume(&body.player_id, &body.item_id)
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({ "ok": true })))
}
