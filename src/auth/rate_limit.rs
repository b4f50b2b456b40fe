use crate::{app::state::AppState, error::AppError};
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use redis::AsyncCommands;
use std::net::SocketAddr;

const WINDOW_SECS: i64 = 60;

/// Per-IP fixed window limit for abuse reports. Fails open when Redis is
/// missing or unreachable.
pub async fn report_rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(client) = &state.redis else {
        return Ok(next.run(req).await);
    };

    let mut conn = match client.get_multiplexed_async_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Redis connection error: {}", e);
            return Ok(next.run(req).await);
        }
    };

    let key = rate_limit_key(&addr);
    let count: u64 = match conn.incr(&key, 1).await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Redis incr error: {}", e);
            return Ok(next.run(req).await);
        }
    };

    if count == 1 {
        if let Err(e) = conn.expire::<_, ()>(&key, WINDOW_SECS).await {
            tracing::error!("Redis expire error: {}", e);
        }
    }

    if count > state.report_rate_limit {
        return Err(AppError::TooManyRequests(
            "Too many abuse reports, try again later".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

fn rate_limit_key(addr: &SocketAddr) -> String {
    format!("rate_limit:report_abuse:{}", addr.ip())
}
