use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::store::ResetTokenStore;

/// Periodically drops expired, never-used reset tokens. Consumption re-checks
/// expiry itself, so a missed sweep only leaves dead rows behind.
pub async fn start_token_cleanup(tokens: Arc<dyn ResetTokenStore>, every_secs: u64) {
    tracing::info!("Background Task Started: reset token cleanup every {}s", every_secs);
    let mut interval = interval(Duration::from_secs(every_secs.max(1)));

    loop {
        interval.tick().await;
        match tokens.purge_expired(Utc::now()).await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!("Purged {} expired reset tokens", removed),
            Err(e) => tracing::error!("Background Task Error: {}", e),
        }
    }
}
