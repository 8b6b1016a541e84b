// src/db/audit_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::audit::AuditLog};

/// Append-only writer; there is deliberately no update or delete here.
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn append<'e, E>(
        &self,
        executor: E,
        action: &str,
        entity: &str,
        entity_id: Uuid,
        old_data: Option<&Value>,
        new_data: Option<&Value>,
        user_id: Uuid,
        inquiry_id: Option<Uuid>,
    ) -> Result<AuditLog, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        Ok(sqlx::query_as::<_, AuditLog>(
            "INSERT INTO audit_logs
                 (action, entity, entity_id, old_data, new_data, user_id, inquiry_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, action, entity, entity_id, old_data, new_data,
                       user_id, inquiry_id, created_at",
        )
        .bind(action)
        .bind(entity)
        .bind(entity_id)
        .bind(old_data)
        .bind(new_data)
        .bind(user_id)
        .bind(inquiry_id)
        .fetch_one(executor)
        .await?)
    }

    pub async fn list_for_inquiry(&self, inquiry_id: Uuid) -> Result<Vec<AuditLog>, AppError> {
        Ok(sqlx::query_as::<_, AuditLog>(
            "SELECT id, action, entity, entity_id, old_data, new_data,
                    user_id, inquiry_id, created_at
             FROM audit_logs
             WHERE inquiry_id = $1
             ORDER BY created_at ASC",
        )
        .bind(inquiry_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
