use crate::{
    auth::middleware::AuthUser,
    dto::comments::AuthorPayload,
    models::{
        comments::{AuthorSnapshot, CommentAuthor},
        users::ExtendedProfile,
    },
    repositories::users::{ProfileLookup, ProfileQuery},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorError {
    /// Neither an authenticated user nor an author payload.
    Missing,
    /// An author payload without an id.
    Malformed,
}

impl AuthorError {
    pub fn message(self) -> &'static str {
        match self {
            AuthorError::Missing | AuthorError::Malformed => {
                "Not able to recognise author of a comment. Make sure you've provided \"author\" property in a payload or authenticated your request properly."
            }
        }
    }
}

/// Builds the author snapshot stored on a comment. An authenticated user
/// always wins over a payload.
pub async fn resolve_author(
    profiles: &dyn ProfileLookup,
    user: Option<&AuthUser>,
    payload: Option<&AuthorPayload>,
) -> Result<CommentAuthor, AuthorError> {
    if let Some(user) = user {
        let profile = lookup_profile(profiles, &profile_strategies(user)).await;
        return Ok(CommentAuthor::User(user_snapshot(user, profile)));
    }

    let payload = payload.ok_or(AuthorError::Missing)?;
    anonymous_snapshot(payload).map(CommentAuthor::Anonymous)
}

/// Lookups to try in order: by document id when the identity carries one,
/// then by numeric id.
pub fn profile_strategies(user: &AuthUser) -> Vec<ProfileQuery> {
    let mut strategies = Vec::with_capacity(2);
    if let Some(document_id) = user.document_id.as_ref().filter(|id| !id.is_empty()) {
        strategies.push(ProfileQuery::ByDocumentId(document_id.clone()));
    }
    strategies.push(ProfileQuery::ById(user.id));
    strategies
}

/// The first strategy that answers wins; a failing one falls through to
/// the next.
async fn lookup_profile(
    profiles: &dyn ProfileLookup,
    strategies: &[ProfileQuery],
) -> Option<ExtendedProfile> {
    for query in strategies {
        match profiles.find_profile(query).await {
            Ok(profile) => return profile,
            Err(error) => {
                tracing::warn!(?query, error = %error, "Profile lookup failed, trying next strategy");
            }
        }
    }
    None
}

fn user_snapshot(user: &AuthUser, profile: Option<ExtendedProfile>) -> AuthorSnapshot {
    let profile = profile.unwrap_or_default();
    AuthorSnapshot {
        id: user.id.to_string(),
        document_id: user.document_id.clone().or(profile.document_id.clone()),
        name: Some(
            profile
                .display_name()
                .unwrap_or_else(|| user.username.clone()),
        ),
        username: Some(user.username.clone()),
        email: Some(user.email.clone()),
        avatar: profile.avatar_url,
    }
}

fn anonymous_snapshot(payload: &AuthorPayload) -> Result<AuthorSnapshot, AuthorError> {
    let id = payload
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(AuthorError::Malformed)?;

    Ok(AuthorSnapshot {
        id: id.to_string(),
        document_id: payload.document_id.clone(),
        name: payload.name.clone(),
        username: payload.username.clone().or_else(|| payload.name.clone()),
        email: payload.email.clone(),
        avatar: payload.avatar.clone(),
    })
}
