use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{comments::RelatedRef, related::RelatedEntity},
};

#[async_trait]
pub trait RelatedEntityRepository: Send + Sync {
    async fn find_related(
        &self,
        related: &RelatedRef,
        locale: Option<&str>,
    ) -> Result<Option<RelatedEntity>, AppError>;
}

#[derive(Clone)]
pub struct PgRelatedEntityRepository {
    pool: PgPool,
}

impl PgRelatedEntityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelatedEntityRepository for PgRelatedEntityRepository {
    async fn find_related(
        &self,
        related: &RelatedRef,
        locale: Option<&str>,
    ) -> Result<Option<RelatedEntity>, AppError> {
        let row = crate::log_query_fetch_optional!(
            "related.find_related",
            sqlx::query_as::<_, RelatedEntity>(
                r#"
                SELECT
                    entity_type,
                    entity_id,
                    locale,
                    require_comments_approval
                FROM comments.related_entity
                WHERE entity_type = $1
                AND entity_id = $2
                AND ($3::text IS NULL OR locale = $3)
                LIMIT 1
                "#,
            )
            .bind(&related.entity_type)
            .bind(&related.entity_id)
            .bind(locale)
            .fetch_optional(&self.pool)
        )?;

        Ok(row)
    }
}
