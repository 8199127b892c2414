//! Background token-expiry sweep.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use tcc_store::Store;

use crate::state::AppState;

/// Spawn the periodic sweep that transitions `Issued` tokens past their
/// expiry to `Expired`.
///
/// Redemption independently rejects expired tokens, so the sweep only
/// keeps stored state tidy; a delayed tick never opens a redemption
/// window.
pub fn spawn_expiry_sweep(state: Arc<AppState>) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.sweep_interval_seconds);

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match state.store.expire_due_tokens(Utc::now()) {
                Ok(0) => {}
                Ok(count) => {
                    tracing::info!(expired = %count, "Expired due spend tokens");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Token expiry sweep failed");
                }
            }
        }
    })
}
