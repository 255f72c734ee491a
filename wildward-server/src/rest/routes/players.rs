// rest/routes/players.rs — Player REST routes.

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

#[derive(Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
}

pub async fn create_player(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CreatePlayerRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "name must not be empty" })),
        ));
    }
    let mut world = ctx.world.write().await;
    let id = world.create_player(&body.name, now_epoch_ms());
    Ok(Json(json!({ "id": id })))
}

pub async fn get_player(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let world = ctx.world.read().await;
    let player = world
        .player(&id)
        .ok_or_else(|| error_response(&WorldError::UnknownPlayer(id.clone())))?;
    let temperature = world
        .player_temperature(&id, now_epoch_ms())
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({
        "player": player,
        "temperature": temperature,
    })))
}

#[derive(Deserialize)]
pub struct SetSleepRequest {
    pub sleeping: bool,
}

pub async fn set_sleep(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<SetSleepRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut world = ctx.world.write().await;
    world
        .set_sleeping(&id, body.sleeping)
        .map_err(|err| error_response(&err))?;
    Ok(Json(json!({ "id": id, "sleeping": body.sleeping })))
}
