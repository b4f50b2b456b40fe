use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{post, put},
};
use tower_http::cors::CorsLayer;

use crate::{
    api::http::{comments as comments_http, reports as reports_http},
    app::{middleware::security_headers, state::AppState},
    auth::{middleware::identity_middleware, rate_limit::report_rate_limit_middleware},
    telemetry::{REQUEST_ID_HEADER, TRACE_ID_HEADER, request_logging_middleware},
};

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

pub fn build_router(state: AppState) -> Router {
    let report_routes = Router::new()
        .route(
            "/api/comments/{relation}/comment/{comment_id}/report-abuse",
            post(reports_http::report_abuse_handle),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            report_rate_limit_middleware,
        ));

    let comment_routes = Router::new()
        .route(
            "/api/comments/{relation}",
            post(comments_http::create_comment_handle),
        )
        .route(
            "/api/comments/{relation}/comment/{comment_id}",
            put(comments_http::update_comment_handle).delete(comments_http::remove_comment_handle),
        );

    // Outermost layer runs first: logging, CORS, security headers, identity.
    Router::new()
        .merge(comment_routes)
        .merge(report_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer())
        .layer(middleware::from_fn(request_logging_middleware))
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let origin = std::env::var("CORS_ALLOW_ORIGIN")
        .ok()
        .and_then(|value| value.parse::<HeaderValue>().ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CORS_ORIGIN));

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static(TRACE_ID_HEADER),
        ])
        .expose_headers([
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static(TRACE_ID_HEADER),
        ])
}
