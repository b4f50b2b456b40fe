use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::models::comments::ApprovalStatus;

/// Author details sent by callers that are not authenticated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorPayload {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub document_id: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub thread_of: Option<String>,
    pub author: Option<AuthorPayload>,
    pub approval_status: Option<ApprovalStatus>,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
    pub author: Option<AuthorPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveCommentRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub comment_id: Option<String>,
    pub comment_document_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub author_id: Option<String>,
    pub author_document_id: Option<String>,
}

/// Query string accepted by the remove endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RemoveCommentQuery {
    pub author_id: Option<String>,
    pub author_document_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub document_id: String,
    pub content: String,
    pub author: Map<String, Value>,
    pub thread_of: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<CommentResponse>>,
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

/// Accepts ids sent either as JSON numbers or strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numeric_and_string_ids() {
        let req: CreateCommentRequest = serde_json::from_value(json!({
            "content": "hi",
            "thread_of": 12,
            "author": { "id": "anon-1", "name": "Ann" }
        }))
        .unwrap();
        assert_eq!(req.thread_of.as_deref(), Some("12"));
        assert_eq!(req.author.unwrap().id.as_deref(), Some("anon-1"));
    }

    #[test]
    fn missing_ids_stay_empty() {
        let req: RemoveCommentRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.comment_id.is_none());
        assert!(req.author_id.is_none());
    }

    #[test]
    fn rejects_object_ids() {
        let result = serde_json::from_value::<AuthorPayload>(json!({ "id": { "x": 1 } }));
        assert!(result.is_err());
    }
}
