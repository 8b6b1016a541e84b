// src/db/approval_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::approval::{Approval, ApprovalStatus},
};

const APPROVAL_COLUMNS: &str =
    "id, cost_calculation_id, status, comments, approver_id, approved_at, created_at";

#[derive(Clone)]
pub struct ApprovalRepository {
    pool: PgPool,
}

impl ApprovalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        cost_calculation_id: Uuid,
        status: ApprovalStatus,
        comments: Option<&str>,
        approver_id: Uuid,
    ) -> Result<Approval, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // approved_at marks when an APPROVED decision was made; rejections
        // carry NULL.
        let sql = format!(
            "INSERT INTO approvals (cost_calculation_id, status, comments, approver_id, approved_at)
             VALUES ($1, $2, $3, $4, CASE WHEN $2 = 'APPROVED' THEN NOW() END)
             RETURNING {APPROVAL_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Approval>(&sql)
            .bind(cost_calculation_id)
            .bind(status)
            .bind(comments)
            .bind(approver_id)
            .fetch_one(executor)
            .await?)
    }

    /// True when a PENDING or APPROVED approval already exists for the
    /// calculation. Checked under the parent inquiry row lock, so two
    /// concurrent decisions cannot both pass.
    pub async fn active_exists<'e, E>(
        &self,
        executor: E,
        cost_calculation_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM approvals
                 WHERE cost_calculation_id = $1 AND status IN ('PENDING', 'APPROVED')
             )",
        )
        .bind(cost_calculation_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    /// `approver` narrows the list to one approver's own decisions.
    pub async fn list(
        &self,
        approver: Option<Uuid>,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Approval>, i64), AppError> {
        let sql = format!(
            "SELECT {APPROVAL_COLUMNS} FROM approvals
             WHERE ($1::UUID IS NULL OR approver_id = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        let approvals = sqlx::query_as::<_, Approval>(&sql)
            .bind(approver)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM approvals WHERE ($1::UUID IS NULL OR approver_id = $1)",
        )
        .bind(approver)
        .fetch_one(&self.pool)
        .await?;

        Ok((approvals, total))
    }
}
