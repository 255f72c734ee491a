use crate::AppContext;
use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let uptime = ctx.started_at.elapsed().as_secs();
    let players = ctx.world.read().await.players().count();
    Json(json!({
        "status": "ok",
        "uptime_secs": uptime,
        "players": players,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
