// rest/routes/time.rs — Game clock REST routes.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::context::now_epoch_ms;
use crate::AppContext;

pub async fn current_time(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let world = ctx.world.read().await;
    let time = world.current_time(now_epoch_ms());
    Json(json!({
        "time": time,
        "speed": world.speed(),
        "weather": world.weather.today,
    }))
}

#[derive(Deserialize)]
pub struct SetSpeedRequest {
    pub speed: f64,
}

pub async fn set_speed(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<SetSpeedRequest>,
) -> Json<Value> {
    let mut world = ctx.world.write().await;
    let applied = world.set_speed(now_epoch_ms(), body.speed);
    Json(json!({ "speed": applied }))
}
