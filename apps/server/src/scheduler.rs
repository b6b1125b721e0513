//! Background refresher.
//!
//! Checks periodically whether the local calendar date moved past the last
//! successful load and, if so, fetches the new day and warms the translation
//! cache for it.

use std::sync::Arc;

use chrono::Local;
use oneul_translation::translate_history;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Starts the date-change refresher. The first check runs immediately.
pub fn start_refresh_scheduler(state: Arc<AppState>, every: Duration) {
    tokio::spawn(async move {
        info!("History refresher started ({}s interval)", every.as_secs());

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_refresh(&state).await;
        }
    });
}

/// Refreshes once if the date changed since the last load.
pub async fn run_refresh(state: &AppState) {
    let today = Local::now().date_naive();
    if state.loaded_on() == Some(today) {
        debug!("History for {} already loaded", today);
        return;
    }

    info!("Loading history for {}", today);
    match state.fetcher.fetch_today().await {
        Ok(history) => {
            let translated = translate_history(&state.translator, &history).await;
            debug!(
                "Translation cache warmed for {} events",
                translated.events.len()
            );
            state.mark_loaded(today);
        }
        Err(e) => warn!("Scheduled history refresh failed: {}", e),
    }
}
