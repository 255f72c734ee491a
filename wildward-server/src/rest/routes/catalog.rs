// rest/routes/catalog.rs — Static catalog routes.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::AppContext;

pub async fn list_biomes(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let world = ctx.world.read().await;
    Json(json!({
        "biomes": world.biomes,
        "expedition_plans": world.expedition_plans,
    }))
}

pub async fn list_recipes(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let world = ctx.world.read().await;
    Json(json!({
        "recipes": world.recipes,
        "items": world.items,
    }))
}
