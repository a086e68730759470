//! Daily Auto-Reset Task
//!
//! When the `auto_reset_daily` setting is enabled, clears the ticket
//! table once per day at the configured `reset_time` (business timezone).
//! Numbering restarts at 1 afterwards because sequence numbers are
//! derived from surviving rows.
//!
//! The settings are re-read on every tick, so changes take effect
//! without a restart.

use chrono::{NaiveDate, Utc};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::core::ServerState;
use crate::db::repository::{setting, ticket};
use crate::utils::time::parse_reset_time;

/// How often the task checks the clock
const CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Run the auto-reset loop until the shutdown token fires
pub async fn run(state: ServerState, shutdown: CancellationToken) {
    let tz = state.config.timezone;

    // Suppress the first firing when the server starts after today's
    // reset moment has already passed — tickets drawn earlier today must
    // survive a restart.
    let initial_reset_time = match setting::get_string(&state.pool, "reset_time", "00:00").await {
        Ok(v) => parse_reset_time(&v),
        Err(_) => parse_reset_time("00:00"),
    };
    let now = Utc::now().with_timezone(&tz);
    let mut last_reset_day: Option<NaiveDate> = if now.time() >= initial_reset_time {
        Some(now.date_naive())
    } else {
        None
    };

    let mut interval = tokio::time::interval(CHECK_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("Auto-reset task stopping");
                return;
            }
            _ = interval.tick() => {}
        }

        let enabled = match setting::get_bool(&state.pool, "auto_reset_daily", true).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Auto-reset: failed to read settings");
                continue;
            }
        };
        if !enabled {
            continue;
        }

        let reset_time = match setting::get_string(&state.pool, "reset_time", "00:00").await {
            Ok(v) => parse_reset_time(&v),
            Err(e) => {
                tracing::warn!(error = %e, "Auto-reset: failed to read reset_time");
                continue;
            }
        };

        let now = Utc::now().with_timezone(&tz);
        let today = now.date_naive();
        if now.time() < reset_time || last_reset_day == Some(today) {
            continue;
        }

        match ticket::reset_all(&state.pool).await {
            Ok(removed) => {
                tracing::info!(removed, %today, "Daily queue reset completed");
                last_reset_day = Some(today);
            }
            Err(e) => {
                tracing::error!(error = %e, "Daily queue reset failed");
            }
        }
    }
}
