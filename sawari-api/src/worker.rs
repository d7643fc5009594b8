use std::sync::Arc;

use chrono::Utc;
use sawari_booking::ExpirySweeper;
use tokio::time::{interval, Duration};
use tracing::{error, info};

/// Runs the expiry sweep on a fixed schedule until the process exits.
/// Individual sweep failures are logged and the loop keeps going; the next
/// tick retries from store state.
pub async fn start_sweep_worker(sweeper: Arc<ExpirySweeper>, interval_seconds: u64) {
    let mut ticker = interval(Duration::from_secs(interval_seconds));
    info!("Sweep worker started, interval {}s", interval_seconds);

    loop {
        ticker.tick().await;
        match sweeper.sweep(Utc::now()).await {
            Ok(released) if released > 0 => {
                info!(released, "scheduled sweep released expired locks");
            }
            Ok(_) => {}
            Err(e) => error!("scheduled sweep failed: {}", e),
        }
    }
}
