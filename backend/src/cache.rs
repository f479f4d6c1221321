use std::sync::{Arc, RwLock};

use anyhow::Result;

use crate::db::GameStore;

/// Read-through cache for the average `tries_remaining` of unfinished games.
///
/// The value is refreshed out-of-band and may be stale. Reads never touch the store.
#[derive(Default)]
pub struct AverageAttemptsCache {
    message: RwLock<Option<String>>,
}

impl AverageAttemptsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached message, or an empty string if nothing has been computed yet
    pub fn get(&self) -> String {
        self.message
            .read()
            .map(|m| m.clone().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Recompute from the store. Keeps the previous value when no game is active.
    pub async fn refresh(&self, store: &dyn GameStore) -> Result<()> {
        let tries = store.active_tries_remaining().await?;
        if let Some(message) = format_average(&tries) {
            tracing::debug!("Average attempts cache refreshed: {}", message);
            if let Ok(mut slot) = self.message.write() {
                *slot = Some(message);
            }
        }
        Ok(())
    }

    /// Refresh on a background task. Failures are logged and never reach the caller.
    pub fn schedule_refresh(self: &Arc<Self>, store: Arc<dyn GameStore>) {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = cache.refresh(store.as_ref()).await {
                tracing::warn!("Failed to refresh average attempts cache: {:#}", e);
            }
        });
    }
}

fn format_average(tries: &[i32]) -> Option<String> {
    if tries.is_empty() {
        return None;
    }
    let total: i64 = tries.iter().map(|&t| i64::from(t)).sum();
    let average = total as f64 / tries.len() as f64;
    Some(format!("The average moves remaining is {:.2}", average))
}
