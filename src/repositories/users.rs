use async_trait::async_trait;
use sqlx::PgPool;

use crate::{error::AppError, models::users::ExtendedProfile};

/// One way of finding a user's extended profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileQuery {
    ByDocumentId(String),
    ById(i64),
}

#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn find_profile(&self, query: &ProfileQuery)
    -> Result<Option<ExtendedProfile>, AppError>;
}

/// Admin accounts that receive moderation mail.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    async fn find_emails_by_roles(&self, roles: &[String]) -> Result<Vec<String>, AppError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileLookup for PgUserRepository {
    async fn find_profile(
        &self,
        query: &ProfileQuery,
    ) -> Result<Option<ExtendedProfile>, AppError> {
        let profile = match query {
            ProfileQuery::ByDocumentId(document_id) => crate::log_query_fetch_optional!(
                "users.find_profile_by_document_id",
                sqlx::query_as::<_, ExtendedProfile>(
                    r#"
                    SELECT document_id, first_name, last_name, avatar_url
                    FROM core.user
                    WHERE document_id = $1
                    "#,
                )
                .bind(document_id)
                .fetch_optional(&self.pool)
            )?,
            ProfileQuery::ById(id) => crate::log_query_fetch_optional!(
                "users.find_profile_by_id",
                sqlx::query_as::<_, ExtendedProfile>(
                    r#"
                    SELECT document_id, first_name, last_name, avatar_url
                    FROM core.user
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&self.pool)
            )?,
        };

        Ok(profile)
    }
}

#[async_trait]
impl AdminDirectory for PgUserRepository {
    async fn find_emails_by_roles(&self, roles: &[String]) -> Result<Vec<String>, AppError> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let emails = crate::log_query_fetch_all!(
            "users.find_emails_by_roles",
            sqlx::query_scalar::<_, String>(
                r#"
                SELECT DISTINCT a.email
                FROM core.admin_user a
                JOIN core.admin_user_role ar ON ar.admin_user_id = a.id
                JOIN core.admin_role r ON r.id = ar.role_id
                WHERE r.code = ANY($1)
                AND a.is_active
                "#,
            )
            .bind(roles)
            .fetch_all(&self.pool)
        )?;

        Ok(emails)
    }
}
