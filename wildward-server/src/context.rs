//! Shared server state.

use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use wildward_game::World;

/// Shared application context handed to every route handler.
pub struct AppContext {
    pub world: RwLock<World>,
    pub started_at: Instant,
}

impl AppContext {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            world: RwLock::new(World::new(seed, now_epoch_ms())),
            started_at: Instant::now(),
        }
    }
}

/// Wall-clock milliseconds since the Unix epoch.
#[must_use]
pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
