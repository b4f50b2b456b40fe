use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    app::state::AppState,
    auth::middleware::RequestIdentity,
    dto::comments::{
        CommentResponse, CreateCommentRequest, RemoveCommentQuery, RemoveCommentRequest,
        UpdateCommentRequest,
    },
    error::AppError,
};

pub async fn create_comment_handle(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(relation): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    let response = state
        .comments
        .create_comment(&relation, req, identity.user())
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Responds with `null` when the comment is missing or owned by someone else.
pub async fn update_comment_handle(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path((relation, comment_id)): Path<(String, String)>,
    Json(req): Json<UpdateCommentRequest>,
) -> Result<Json<Option<CommentResponse>>, AppError> {
    let response = state
        .comments
        .update_comment(&relation, &comment_id, req, identity.user())
        .await?;
    Ok(Json(response))
}

pub async fn remove_comment_handle(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path((relation, comment_id)): Path<(String, String)>,
    Query(query): Query<RemoveCommentQuery>,
) -> Result<Json<CommentResponse>, AppError> {
    let req = RemoveCommentRequest {
        comment_id: Some(comment_id),
        comment_document_id: None,
        author_id: query.author_id,
        author_document_id: query.author_document_id,
    };
    let response = state
        .comments
        .remove_comment(&relation, req, identity.user())
        .await?;
    Ok(Json(response))
}
