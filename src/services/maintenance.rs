use std::{sync::Arc, time::Duration};

use crate::services::config::ConfigCache;

pub fn spawn_config_refresh(config: Arc<ConfigCache>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        // The first tick fires immediately; the cache was loaded at startup.
        interval.tick().await;

        loop {
            interval.tick().await;
            match config.refresh().await {
                Ok(keys) => {
                    tracing::debug!("Refreshed comments config ({} keys)", keys);
                }
                Err(error) => {
                    tracing::error!("Failed to refresh comments config: {}", error);
                }
            }
        }
    });
}
