use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    app::state::AppState,
    auth::middleware::RequestIdentity,
    dto::reports::{ReportAbuseRequest, ReportResponse},
    error::AppError,
};

pub async fn report_abuse_handle(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path((relation, comment_id)): Path<(String, String)>,
    Json(req): Json<ReportAbuseRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), AppError> {
    let response = state
        .reports
        .report_abuse(&relation, &comment_id, req, identity.user())
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}
