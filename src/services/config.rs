use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

pub const APPROVAL_FLOW: &str = "approvalFlow";
pub const BLOCKED_AUTHOR_PROPS: &str = "blockedAuthorProps";
pub const MODERATOR_ROLES: &str = "moderatorRoles";
pub const BAD_WORDS: &str = "badWords";
pub const REPLY_NOTIFICATIONS: &str = "replyNotifications";

pub const SUPER_ADMIN_ROLE: &str = "super-admin";

/// Where plugin configuration values come from.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn load(&self) -> Result<HashMap<String, Value>, AppError>;
}

/// Reads a JSON object from disk on every load.
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn load(&self) -> Result<HashMap<String, Value>, AppError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to read config {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let values: HashMap<String, Value> = serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(format!("Invalid comments config: {}", e)))?;
        Ok(values)
    }
}

/// Fixed values, used when no config file is configured.
#[derive(Default)]
pub struct StaticConfigSource {
    values: HashMap<String, Value>,
}

impl StaticConfigSource {
    pub fn new(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

#[async_trait]
impl ConfigSource for StaticConfigSource {
    async fn load(&self) -> Result<HashMap<String, Value>, AppError> {
        Ok(self.values.clone())
    }
}

/// Read-through configuration cache shared by all workflows.
///
/// Reads never touch the source; `refresh` swaps in a freshly loaded
/// snapshot and is driven by a background task.
pub struct ConfigCache {
    source: Arc<dyn ConfigSource>,
    values: DashMap<String, Value>,
}

impl ConfigCache {
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            source,
            values: DashMap::new(),
        }
    }

    pub async fn load(source: Arc<dyn ConfigSource>) -> Result<Self, AppError> {
        let cache = Self::new(source);
        cache.refresh().await?;
        Ok(cache)
    }

    pub async fn refresh(&self) -> Result<usize, AppError> {
        let loaded = self.source.load().await?;
        self.values
            .retain(|key, _| loaded.contains_key(key.as_str()));
        let count = loaded.len();
        for (key, value) in loaded {
            self.values.insert(key, value);
        }
        Ok(count)
    }

    /// Returns the cached value for `key`, or `default` when the key is
    /// absent or holds a value of the wrong shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.values.get(key).map(|entry| entry.value().clone()) else {
            return default;
        };
        match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::warn!(key, error = %error, "Ignoring malformed config value");
                default
            }
        }
    }

    pub fn approval_flow(&self) -> Vec<String> {
        self.get(APPROVAL_FLOW, Vec::new())
    }

    pub fn blocked_author_props(&self) -> Vec<String> {
        self.get(BLOCKED_AUTHOR_PROPS, Vec::new())
    }

    pub fn moderator_roles(&self) -> Vec<String> {
        self.get(MODERATOR_ROLES, vec![SUPER_ADMIN_ROLE.to_string()])
    }

    pub fn bad_words_enabled(&self) -> bool {
        self.get(BAD_WORDS, true)
    }

    pub fn reply_notifications_enabled(&self) -> bool {
        self.get(REPLY_NOTIFICATIONS, false)
    }
}
