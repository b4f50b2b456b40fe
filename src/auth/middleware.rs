use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{app::state::AppState, error::AppError};

/// Caller identity decoded from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub document_id: Option<String>,
    pub username: String,
    pub email: String,
}

/// Authenticated user for this request, if any. Comments may be posted
/// anonymously, so a missing token is not an error.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity(pub Option<AuthUser>);

impl RequestIdentity {
    pub fn user(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }
}

pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match bearer_token(&req) {
        Some(token) => {
            let claims = state
                .jwt_config
                .verify_token(&token)
                .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;
            let id = claims
                .sub
                .parse::<i64>()
                .map_err(|_| AppError::Unauthorized("Invalid user id".to_string()))?;
            Some(AuthUser {
                id,
                document_id: claims.document_id,
                username: claims.username,
                email: claims.email,
            })
        }
        None => None,
    };

    req.extensions_mut().insert(RequestIdentity(identity));

    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|val| val.strip_prefix("Bearer "))
        .map(str::to_string)
}
