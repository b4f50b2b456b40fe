use serde_json::{Map, Value};

use crate::{
    dto::comments::CommentResponse,
    models::comments::{Comment, CommentAuthor},
};

/// Shapes a comment for output, dropping author fields listed in the
/// `blockedAuthorProps` config.
pub fn sanitize_comment(
    comment: Comment,
    parent: Option<Comment>,
    blocked_props: &[String],
) -> CommentResponse {
    let blocked: Vec<String> = blocked_props
        .iter()
        .map(|prop| normalize_author_prop(prop))
        .collect();

    build_response(comment, parent, &blocked)
}

fn build_response(
    comment: Comment,
    parent: Option<Comment>,
    blocked: &[String],
) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        document_id: comment.document_id,
        content: comment.content,
        author: author_fields(&comment.author, blocked),
        thread_of: comment.thread_of,
        parent: parent.map(|parent| Box::new(build_response(parent, None, blocked))),
        related: comment.related,
        approval_status: comment.approval_status,
        removed: comment.removed,
        blocked: comment.blocked,
        blocked_thread: comment.blocked_thread,
        is_admin_comment: comment.is_admin_comment,
        locale: comment.locale,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

fn author_fields(author: &CommentAuthor, blocked: &[String]) -> Map<String, Value> {
    let snapshot = author.snapshot();
    let fields = [
        ("id", Some(snapshot.id.clone())),
        ("document_id", snapshot.document_id.clone()),
        ("name", snapshot.name.clone()),
        ("username", snapshot.username.clone()),
        ("email", snapshot.email.clone()),
        ("avatar", snapshot.avatar.clone()),
    ];

    fields
        .into_iter()
        .filter(|(key, _)| !blocked.iter().any(|blocked| blocked.as_str() == *key))
        .map(|(key, value)| (key.to_string(), value.map(Value::String).unwrap_or(Value::Null)))
        .collect()
}

/// `authorEmail`, `author_email` and `email` all name the same field.
fn normalize_author_prop(prop: &str) -> String {
    let trimmed = prop.trim();
    let stripped = match trimmed.strip_prefix("author") {
        Some(rest) if rest.starts_with('_') => &rest[1..],
        Some(rest) if rest.starts_with(|ch: char| ch.is_ascii_uppercase()) => rest,
        _ => trimmed,
    };

    let mut normalized = String::with_capacity(stripped.len() + 2);
    for (idx, ch) in stripped.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if idx > 0 {
                normalized.push('_');
            }
            normalized.push(ch.to_ascii_lowercase());
        } else {
            normalized.push(ch);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::comment_fixture;

    const ALL_FIELDS: [&str; 6] = ["id", "document_id", "name", "username", "email", "avatar"];

    #[test]
    fn empty_blocklist_keeps_every_author_field() {
        let response = sanitize_comment(comment_fixture(1, "article:1"), None, &[]);
        for field in ALL_FIELDS {
            assert!(response.author.contains_key(field), "missing {field}");
        }
        assert_eq!(response.author["email"], "owner@example.com");
    }

    #[test]
    fn blocklist_removes_exactly_the_named_field() {
        let response = sanitize_comment(
            comment_fixture(1, "article:1"),
            None,
            &["authorEmail".to_string()],
        );
        assert!(!response.author.contains_key("email"));
        assert_eq!(response.author.len(), ALL_FIELDS.len() - 1);
    }

    #[test]
    fn blocklist_applies_to_parent() {
        let mut reply = comment_fixture(2, "article:1");
        reply.thread_of = Some(1);
        let response = sanitize_comment(
            reply,
            Some(comment_fixture(1, "article:1")),
            &["avatar".to_string()],
        );
        let parent = response.parent.expect("parent");
        assert!(!parent.author.contains_key("avatar"));
        assert_eq!(response.thread_of, Some(1));
    }

    #[test]
    fn normalizes_prop_spellings() {
        assert_eq!(normalize_author_prop("authorEmail"), "email");
        assert_eq!(normalize_author_prop("author_email"), "email");
        assert_eq!(normalize_author_prop("email"), "email");
        assert_eq!(normalize_author_prop("authorDocumentId"), "document_id");
        assert_eq!(normalize_author_prop("author"), "author");
    }
}
