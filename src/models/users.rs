use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Profile fields looked up for an authenticated author.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct ExtendedProfile {
    pub document_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ExtendedProfile {
    pub fn display_name(&self) -> Option<String> {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let trimmed = full.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
