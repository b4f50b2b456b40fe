use crate::{
    auth::middleware::AuthUser,
    dto::comments::{
        CommentResponse, CreateCommentRequest, RemoveCommentRequest, UpdateCommentRequest,
    },
    error::{AppError, AppResult},
    models::comments::{Comment, CommentAuthor, CommentFlag, CommentRef, RelatedRef},
    repositories::comments::{CommentFilter, NewComment},
    telemetry::BusinessEvent,
    usecases::{
        approval::{decide_status, requires_approval},
        authors::resolve_author,
        cascade::cascade_flag,
        content::filter_content,
        context::{WorkflowContext, spawn_notification},
        sanitize::sanitize_comment,
        threads::{locate_comment, resolve_thread},
    },
};

const NOT_AUTHENTICATED: &str = "Not authenticated request. Provide an author or authenticate.";
const NOT_FOUND_OR_FORBIDDEN: &str =
    "Entity does not exist or you're not allowed to take an action on it";

pub struct CommentService {
    ctx: WorkflowContext,
}

impl CommentService {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    pub async fn create_comment(
        &self,
        relation: &str,
        req: CreateCommentRequest,
        user: Option<&AuthUser>,
    ) -> AppResult<CommentResponse> {
        let related = RelatedRef::parse(relation)?;
        let locale = req.locale.clone();
        let entity = self
            .ctx
            .related
            .find_related(&related, locale.as_deref())
            .await?
            .ok_or_else(|| {
                AppError::RelationNotFound(
                    "Relation for field \"related\" does not exist. Check your payload please."
                        .to_string(),
                )
            })?;
        tracing::debug!(
            entity_type = %entity.entity_type,
            entity_id = %entity.entity_id,
            locale = ?entity.locale,
            "Resolved related entity"
        );
        let approval_required = requires_approval(
            &related.entity_type,
            entity.require_comments_approval,
            &self.ctx.config.approval_flow(),
        );
        let blocked_props = self.ctx.config.blocked_author_props();

        let thread_ref = req.thread_of.as_deref().and_then(CommentRef::parse);
        let parent = resolve_thread(
            self.ctx.comments.as_ref(),
            thread_ref.as_ref(),
            &related,
            locale.as_deref(),
        )
        .await?;

        if req.author.is_none() && user.is_none() {
            return Err(AppError::UnauthenticatedAuthor(
                NOT_AUTHENTICATED.to_string(),
            ));
        }

        let (content, author) = tokio::join!(
            filter_content(self.ctx.filter.as_ref(), &self.ctx.config, &req.content),
            resolve_author(self.ctx.profiles.as_ref(), user, req.author.as_ref()),
        );
        let content = content?;
        let author =
            author.map_err(|error| AppError::UnauthenticatedAuthor(error.message().to_string()))?;
        let approval_status = decide_status(approval_required, req.approval_status)?;

        let comment = self
            .ctx
            .comments
            .create(NewComment {
                content,
                author,
                thread_of: parent.as_ref().map(|parent| parent.id),
                related: related.to_string(),
                approval_status,
                locale,
            })
            .await?;

        BusinessEvent::CommentCreated {
            comment_id: comment.id,
            related: comment.related.clone(),
            thread_of: comment.thread_of,
            author_id: comment.author.snapshot().id.clone(),
            approval_status: format!("{:?}", comment.approval_status),
        }
        .log();

        if let Some(parent) = &parent {
            let notifier = self.ctx.notifier.clone();
            let reply = comment.clone();
            let parent = parent.clone();
            spawn_notification("reply", async move {
                notifier.send_reply_notification(&reply, &parent).await
            });
        }

        Ok(sanitize_comment(comment, parent, &blocked_props))
    }

    /// Updates the content of the caller's own comment. A comment that does
    /// not exist or belongs to someone else yields `Ok(None)`.
    pub async fn update_comment(
        &self,
        relation: &str,
        comment_id: &str,
        req: UpdateCommentRequest,
        user: Option<&AuthUser>,
    ) -> AppResult<Option<CommentResponse>> {
        if req.author.is_none() && user.is_none() {
            return Err(AppError::UnauthenticatedAuthor(
                NOT_AUTHENTICATED.to_string(),
            ));
        }
        let owner = match user {
            Some(user) => Some(Ownership::User(user.id.to_string())),
            None => req
                .author
                .as_ref()
                .and_then(|author| author.id.as_deref())
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| Ownership::AuthorId(id.to_string())),
        };

        let related = RelatedRef::parse(relation)?;
        let content = filter_content(self.ctx.filter.as_ref(), &self.ctx.config, &req.content)
            .await?;
        let Some(reference) = CommentRef::parse(comment_id) else {
            return Ok(None);
        };

        let Some(existing) =
            locate_comment(self.ctx.comments.as_ref(), &reference, &related).await?
        else {
            tracing::debug!(%reference, "Update skipped, comment not found");
            return Ok(None);
        };
        if existing.removed {
            tracing::debug!(comment_id = existing.id, "Update skipped, comment is removed");
            return Ok(None);
        }
        if !owner.is_some_and(|owner| owner.owns(&existing)) {
            tracing::debug!(comment_id = existing.id, "Update skipped, caller is not the author");
            return Ok(None);
        }

        let updated = self
            .ctx
            .comments
            .update_content(existing.id, &content)
            .await?;

        BusinessEvent::CommentUpdated {
            comment_id: updated.id,
            related: updated.related.clone(),
            author_id: updated.author.snapshot().id.clone(),
        }
        .log();

        let blocked_props = self.ctx.config.blocked_author_props();
        Ok(Some(sanitize_comment(updated, None, &blocked_props)))
    }

    /// Soft-deletes the caller's comment and all replies below it.
    pub async fn remove_comment(
        &self,
        relation: &str,
        req: RemoveCommentRequest,
        user: Option<&AuthUser>,
    ) -> AppResult<CommentResponse> {
        let owner = Ownership::resolve(user, &req)?;

        self.remove_owned(relation, &req, &owner)
            .await
            .map_err(|error| {
                tracing::debug!(error = %error, "Comment removal rejected");
                AppError::NotFoundOrForbidden(NOT_FOUND_OR_FORBIDDEN.to_string())
            })
    }

    async fn remove_owned(
        &self,
        relation: &str,
        req: &RemoveCommentRequest,
        owner: &Ownership,
    ) -> AppResult<CommentResponse> {
        let related = RelatedRef::parse(relation)?;
        let mut comment = self
            .find_for_removal(req, &related)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        if !owner.owns(&comment) {
            return Err(AppError::Forbidden(
                "You're not allowed to delete this comment. You can only delete your own comments."
                    .to_string(),
            ));
        }

        self.ctx
            .comments
            .set_flag(&[comment.id], CommentFlag::Removed, true)
            .await?;
        comment.set_flag(CommentFlag::Removed, true);
        let cascaded = cascade_flag(
            self.ctx.comments.as_ref(),
            comment.id,
            CommentFlag::Removed,
            true,
        )
        .await?;

        BusinessEvent::CommentRemoved {
            comment_id: comment.id,
            related: comment.related.clone(),
            author_id: comment.author.snapshot().id.clone(),
            cascaded,
        }
        .log();

        let blocked_props = self.ctx.config.blocked_author_props();
        Ok(sanitize_comment(comment, None, &blocked_props))
    }

    /// Looks the target up by `comment_id`, falling back to
    /// `comment_document_id`. When a numeric-looking id fails to load, it is
    /// retried once as a document id.
    async fn find_for_removal(
        &self,
        req: &RemoveCommentRequest,
        related: &RelatedRef,
    ) -> AppResult<Option<Comment>> {
        let raw_id = req.comment_id.as_deref();
        let reference = raw_id
            .and_then(CommentRef::parse)
            .or_else(|| {
                req.comment_document_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(|id| CommentRef::ByOpaqueId(id.to_string()))
            })
            .ok_or_else(|| AppError::BadRequest("Comment id is required".to_string()))?;

        let filter = CommentFilter::new(reference.clone()).related(related);
        match self.ctx.comments.find_one(&filter).await {
            Ok(found) => Ok(found),
            Err(error) => {
                let retry = match (&reference, raw_id) {
                    (CommentRef::ById(_), Some(raw)) if req.comment_document_id.is_none() => {
                        raw.trim().to_string()
                    }
                    _ => return Err(error),
                };
                tracing::warn!(error = %error, "Comment lookup failed, retrying as document id");
                let filter = CommentFilter::new(CommentRef::ByOpaqueId(retry)).related(related);
                self.ctx.comments.find_one(&filter).await.map_err(|_| error)
            }
        }
    }
}

/// Who is acting on a comment, checked in priority order. Users own only
/// comments posted under their account. Payload ids own only anonymous ones.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Ownership {
    User(String),
    AuthorDocumentId(String),
    AuthorId(String),
}

impl Ownership {
    fn resolve(user: Option<&AuthUser>, req: &RemoveCommentRequest) -> AppResult<Self> {
        if let Some(user) = user {
            return Ok(Ownership::User(user.id.to_string()));
        }
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        if let Some(document_id) = non_empty(&req.author_document_id) {
            return Ok(Ownership::AuthorDocumentId(document_id));
        }
        if let Some(author_id) = non_empty(&req.author_id) {
            return Ok(Ownership::AuthorId(author_id));
        }
        Err(AppError::UnauthenticatedAuthor(
            "You're not allowed to take an action on that entity. Make sure that you've provided proper \"author_id\", \"author_document_id\" or authenticated your request properly."
                .to_string(),
        ))
    }

    fn owns(&self, comment: &Comment) -> bool {
        match (self, &comment.author) {
            (Ownership::User(id), CommentAuthor::User(author)) => author.id == *id,
            (Ownership::AuthorId(id), CommentAuthor::Anonymous(author)) => author.id == *id,
            (Ownership::AuthorDocumentId(document_id), CommentAuthor::Anonymous(author)) => {
                author.document_id.as_deref() == Some(document_id.as_str())
            }
            _ => false,
        }
    }
}
