use std::sync::Arc;

use crate::{
    auth::jwt::JwtConfig,
    usecases::{comments::CommentService, context::WorkflowContext, reports::ReportService},
};

const DEFAULT_REPORT_RATE_LIMIT: u64 = 10;

#[derive(Clone)]
pub struct AppState {
    pub jwt_config: JwtConfig,
    pub redis: Option<redis::Client>,
    pub report_rate_limit: u64,
    pub comments: Arc<CommentService>,
    pub reports: Arc<ReportService>,
}

impl AppState {
    pub fn new(ctx: WorkflowContext, redis: Option<redis::Client>) -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development secret");
            "dev-comments-secret".to_string()
        });
        let report_rate_limit = std::env::var("REPORT_RATE_LIMIT")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REPORT_RATE_LIMIT);

        Self::with_parts(JwtConfig::from_env(jwt_secret), redis, report_rate_limit, ctx)
    }

    pub fn with_parts(
        jwt_config: JwtConfig,
        redis: Option<redis::Client>,
        report_rate_limit: u64,
        ctx: WorkflowContext,
    ) -> Self {
        Self {
            jwt_config,
            redis,
            report_rate_limit,
            comments: Arc::new(CommentService::new(ctx.clone())),
            reports: Arc::new(ReportService::new(ctx)),
        }
    }
}
