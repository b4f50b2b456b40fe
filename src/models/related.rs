use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Entity a comment thread is attached to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RelatedEntity {
    pub entity_type: String,
    pub entity_id: String,
    pub locale: Option<String>,
    pub require_comments_approval: bool,
}
