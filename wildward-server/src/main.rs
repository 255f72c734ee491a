use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use wildward_server::context::now_epoch_ms;
use wildward_server::rest::{DEFAULT_PORT, start_rest_server};
use wildward_server::AppContext;

#[derive(Parser)]
#[command(name = "wildward-server", about = "Wildward survival simulation host", version)]
struct Args {
    /// HTTP port
    #[arg(long, env = "WILDWARD_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Bind address (use 0.0.0.0 for LAN access)
    #[arg(long, env = "WILDWARD_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// World seed
    #[arg(long, env = "WILDWARD_SEED", default_value_t = 0)]
    seed: u64,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long, env = "WILDWARD_LOG", default_value = "info")]
    log: String,

    /// Simulation tick interval in milliseconds
    #[arg(long, env = "WILDWARD_TICK_MS", default_value_t = 1_000)]
    tick_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(args.log.clone())
        .compact()
        .init();

    let ctx = Arc::new(AppContext::new(args.seed));
    spawn_tick_loop(Arc::clone(&ctx), args.tick_ms);

    start_rest_server(ctx, &args.bind, args.port).await
}

fn spawn_tick_loop(ctx: Arc<AppContext>, tick_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(tick_ms.max(100)));
        loop {
            interval.tick().await;
            let now = now_epoch_ms();
            ctx.world.write().await.tick(now);
            debug!("tick applied at {now}");
        }
    });
}
