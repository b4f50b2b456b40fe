use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::comments::{
        ApprovalStatus, AuthorSnapshot, Comment, CommentAuthor, CommentFlag, CommentRef,
        RelatedRef,
    },
};

/// Locale scoping for comment lookups. `Exactly(None)` matches comments
/// stored without a locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocaleScope {
    #[default]
    Any,
    Exactly(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFilter {
    pub reference: CommentRef,
    pub related: Option<String>,
    pub locale: LocaleScope,
}

impl CommentFilter {
    pub fn new(reference: CommentRef) -> Self {
        Self {
            reference,
            related: None,
            locale: LocaleScope::Any,
        }
    }

    pub fn related(mut self, related: &RelatedRef) -> Self {
        self.related = Some(related.to_string());
        self
    }

    pub fn locale(mut self, locale: Option<String>) -> Self {
        self.locale = LocaleScope::Exactly(locale);
        self
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        let reference = match &self.reference {
            CommentRef::ById(id) => comment.id == *id,
            CommentRef::ByOpaqueId(document_id) => comment.document_id == *document_id,
        };
        let related = self
            .related
            .as_deref()
            .is_none_or(|related| comment.related == related);
        let locale = match &self.locale {
            LocaleScope::Any => true,
            LocaleScope::Exactly(locale) => comment.locale == *locale,
        };
        reference && related && locale
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub author: CommentAuthor,
    pub thread_of: Option<i64>,
    pub related: String,
    pub approval_status: ApprovalStatus,
    pub locale: Option<String>,
}

/// Comment storage. `Ok(None)` means the comment does not exist; transport
/// failures come back as `Err`.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_one(&self, filter: &CommentFilter) -> Result<Option<Comment>, AppError>;

    async fn create(&self, comment: NewComment) -> Result<Comment, AppError>;

    async fn update_content(&self, id: i64, content: &str) -> Result<Comment, AppError>;

    async fn set_flag(&self, ids: &[i64], flag: CommentFlag, value: bool)
    -> Result<u64, AppError>;

    async fn find_reply_ids(&self, parent_id: i64) -> Result<Vec<i64>, AppError>;
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CommentRow {
    pub id: i64,
    pub document_id: String,
    pub content: String,
    pub author_user: bool,
    pub author_id: String,
    pub author_document_id: Option<String>,
    pub author_name: Option<String>,
    pub author_username: Option<String>,
    pub author_email: Option<String>,
    pub author_avatar: Option<String>,
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

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        let snapshot = AuthorSnapshot {
            id: row.author_id,
            document_id: row.author_document_id,
            name: row.author_name,
            username: row.author_username,
            email: row.author_email,
            avatar: row.author_avatar,
        };
        let author = if row.author_user {
            CommentAuthor::User(snapshot)
        } else {
            CommentAuthor::Anonymous(snapshot)
        };
        Comment {
            id: row.id,
            document_id: row.document_id,
            content: row.content,
            author,
            thread_of: row.thread_of,
            related: row.related,
            approval_status: row.approval_status,
            removed: row.removed,
            blocked: row.blocked,
            blocked_thread: row.blocked_thread,
            is_admin_comment: row.is_admin_comment,
            locale: row.locale,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COMMENT_COLUMNS: &str = r#"
    id,
    document_id,
    content,
    author_user,
    author_id,
    author_document_id,
    author_name,
    author_username,
    author_email,
    author_avatar,
    thread_of,
    related,
    approval_status,
    removed,
    blocked,
    blocked_thread,
    is_admin_comment,
    locale,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn find_one(&self, filter: &CommentFilter) -> Result<Option<Comment>, AppError> {
        let (id, document_id) = match &filter.reference {
            CommentRef::ById(id) => (Some(*id), None),
            CommentRef::ByOpaqueId(document_id) => (None, Some(document_id.as_str())),
        };
        let (scope_locale, locale) = match &filter.locale {
            LocaleScope::Any => (false, None),
            LocaleScope::Exactly(locale) => (true, locale.as_deref()),
        };
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments.comment
            WHERE ($1::bigint IS NULL OR id = $1)
            AND ($2::text IS NULL OR document_id = $2)
            AND ($3::text IS NULL OR related = $3)
            AND ($4::boolean IS FALSE OR locale IS NOT DISTINCT FROM $5::text)
            LIMIT 1
            "#
        );
        let row = crate::log_query_fetch_optional!(
            "comments.find_one",
            sqlx::query_as::<_, CommentRow>(&sql)
                .bind(id)
                .bind(document_id)
                .bind(filter.related.as_deref())
                .bind(scope_locale)
                .bind(locale)
                .fetch_optional(&self.pool)
        )?;

        Ok(row.map(Comment::from))
    }

    async fn create(&self, comment: NewComment) -> Result<Comment, AppError> {
        let (author_user, snapshot) = match comment.author {
            CommentAuthor::User(snapshot) => (true, snapshot),
            CommentAuthor::Anonymous(snapshot) => (false, snapshot),
        };
        let sql = format!(
            r#"
            INSERT INTO comments.comment (
                document_id,
                content,
                author_user,
                author_id,
                author_document_id,
                author_name,
                author_username,
                author_email,
                author_avatar,
                thread_of,
                related,
                approval_status,
                locale
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COMMENT_COLUMNS}
            "#
        );
        let row = crate::log_query_fetch_one!(
            "comments.create",
            sqlx::query_as::<_, CommentRow>(&sql)
                .bind(Uuid::now_v7().simple().to_string())
                .bind(comment.content)
                .bind(author_user)
                .bind(snapshot.id)
                .bind(snapshot.document_id)
                .bind(snapshot.name)
                .bind(snapshot.username)
                .bind(snapshot.email)
                .bind(snapshot.avatar)
                .bind(comment.thread_of)
                .bind(comment.related)
                .bind(comment.approval_status)
                .bind(comment.locale)
                .fetch_one(&self.pool)
        )?;

        Ok(row.into())
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Comment, AppError> {
        let sql = format!(
            r#"
            UPDATE comments.comment
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "#
        );
        let row = crate::log_query_fetch_one!(
            "comments.update_content",
            sqlx::query_as::<_, CommentRow>(&sql)
                .bind(id)
                .bind(content)
                .fetch_one(&self.pool)
        )?;

        Ok(row.into())
    }

    async fn set_flag(
        &self,
        ids: &[i64],
        flag: CommentFlag,
        value: bool,
    ) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "UPDATE comments.comment SET {} = $2, updated_at = NOW() WHERE id = ANY($1)",
            flag.column()
        );
        let result = crate::log_query_execute!(
            "comments.set_flag",
            sqlx::query(&sql).bind(ids).bind(value).execute(&self.pool)
        )?;

        Ok(result.rows_affected())
    }

    async fn find_reply_ids(&self, parent_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = crate::log_query_fetch_all!(
            "comments.find_reply_ids",
            sqlx::query_scalar::<_, i64>(
                r#"
                SELECT id
                FROM comments.comment
                WHERE thread_of = $1
                ORDER BY id ASC
                "#,
            )
            .bind(parent_id)
            .fetch_all(&self.pool)
        )?;

        Ok(ids)
    }
}
