use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Approval status mapping for comments.approval_status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "comments.approval_status", rename_all = "UPPERCASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Author fields copied onto a comment at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorSnapshot {
    pub id: String,
    pub document_id: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// A comment is written either by a registered user or by an anonymous
/// author described in the request payload, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentAuthor {
    User(AuthorSnapshot),
    Anonymous(AuthorSnapshot),
}

impl CommentAuthor {
    pub fn snapshot(&self) -> &AuthorSnapshot {
        match self {
            CommentAuthor::User(snapshot) | CommentAuthor::Anonymous(snapshot) => snapshot,
        }
    }
}

/// Reference to a comment by numeric id or by opaque document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommentRef {
    ById(i64),
    ByOpaqueId(String),
}

impl CommentRef {
    /// Numeric-looking input resolves by id, anything else by document id.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(id) => Some(CommentRef::ById(id)),
            Err(_) => Some(CommentRef::ByOpaqueId(trimmed.to_string())),
        }
    }
}

impl fmt::Display for CommentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentRef::ById(id) => write!(f, "{id}"),
            CommentRef::ByOpaqueId(document_id) => f.write_str(document_id),
        }
    }
}

/// The commented-upon entity, encoded as `<type>:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelatedRef {
    pub entity_type: String,
    pub entity_id: String,
}

impl RelatedRef {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let invalid = || {
            AppError::ValidationError(format!(
                "Field \"related\" must be in the form <type>:<id>, got \"{raw}\""
            ))
        };
        let (entity_type, entity_id) = raw.trim().rsplit_once(':').ok_or_else(invalid)?;
        let entity_type = entity_type.trim_end_matches(':');
        if entity_type.is_empty() || entity_id.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
        })
    }
}

impl fmt::Display for RelatedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.entity_id)
    }
}

/// Boolean comment fields that propagate down a reply tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentFlag {
    Removed,
    Blocked,
    BlockedThread,
}

impl CommentFlag {
    pub fn column(self) -> &'static str {
        match self {
            CommentFlag::Removed => "removed",
            CommentFlag::Blocked => "blocked",
            CommentFlag::BlockedThread => "blocked_thread",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub document_id: String,
    pub content: String,
    pub author: CommentAuthor,
    pub thread_of: Option<i64>,
    pub related: String,
    pub approval_status: ApprovalStatus,
    pub removed: bool,
    pub blocked: bool,
    pub blocked_thread: bool,
    pub is_admin_comment: bool,
    pub locale: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn set_flag(&mut self, flag: CommentFlag, value: bool) {
        match flag {
            CommentFlag::Removed => self.removed = value,
            CommentFlag::Blocked => self.blocked = value,
            CommentFlag::BlockedThread => self.blocked_thread = value,
        }
    }
}
