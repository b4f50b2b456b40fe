use crate::{
    error::AppError,
    models::comments::{Comment, CommentRef, RelatedRef},
    repositories::comments::{CommentFilter, CommentRepository},
};

/// Resolves the comment being replied to. No reference means a top-level
/// comment.
pub async fn resolve_thread(
    comments: &dyn CommentRepository,
    reference: Option<&CommentRef>,
    related: &RelatedRef,
    locale: Option<&str>,
) -> Result<Option<Comment>, AppError> {
    let Some(reference) = reference else {
        return Ok(None);
    };

    let id = match reference {
        CommentRef::ById(id) => *id,
        CommentRef::ByOpaqueId(_) => comments
            .find_one(&CommentFilter::new(reference.clone()))
            .await?
            .map(|comment| comment.id)
            .ok_or_else(|| {
                AppError::ThreadNotFound(
                    "Thread comment with provided document id does not exist".to_string(),
                )
            })?,
    };

    let filter = CommentFilter::new(CommentRef::ById(id))
        .related(related)
        .locale(locale.map(str::to_string));
    match comments.find_one(&filter).await? {
        Some(parent) if !parent.removed => Ok(Some(parent)),
        _ => Err(AppError::ThreadNotFound("Thread does not exist".to_string())),
    }
}

/// Finds a comment by reference within one related entity.
pub async fn locate_comment(
    comments: &dyn CommentRepository,
    reference: &CommentRef,
    related: &RelatedRef,
) -> Result<Option<Comment>, AppError> {
    comments
        .find_one(&CommentFilter::new(reference.clone()).related(related))
        .await
}
