// src/db/costing_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::costing::CostCalculation};

const COST_COLUMNS: &str = "id, inquiry_item_id, material_cost, labor_cost, overhead_cost, \
     total_cost, calculated_by_id, is_approved, approved_at, notes, created_at";

#[derive(Clone)]
pub struct CostingRepository {
    pool: PgPool,
}

impl CostingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        inquiry_item_id: Uuid,
        material_cost: Decimal,
        labor_cost: Decimal,
        overhead_cost: Decimal,
        total_cost: Decimal,
        calculated_by_id: Uuid,
        notes: Option<&str>,
    ) -> Result<CostCalculation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO cost_calculations
                 (inquiry_item_id, material_cost, labor_cost, overhead_cost,
                  total_cost, calculated_by_id, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COST_COLUMNS}"
        );
        sqlx::query_as::<_, CostCalculation>(&sql)
            .bind(inquiry_item_id)
            .bind(material_cost)
            .bind(labor_cost)
            .bind(overhead_cost)
            .bind(total_cost)
            .bind(calculated_by_id)
            .bind(notes)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // The UNIQUE constraint on inquiry_item_id enforces the 1:1
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::Conflict("calculation_exists");
                    }
                }
                e.into()
            })
    }

    /// Overwrites a calculation whose approval was rejected. The UNIQUE
    /// constraint on inquiry_item_id stays satisfied because the row is
    /// updated, not re-inserted.
    #[allow(clippy::too_many_arguments)]
    pub async fn replace<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        material_cost: Decimal,
        labor_cost: Decimal,
        overhead_cost: Decimal,
        total_cost: Decimal,
        calculated_by_id: Uuid,
        notes: Option<&str>,
    ) -> Result<CostCalculation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE cost_calculations SET
                material_cost = $2,
                labor_cost = $3,
                overhead_cost = $4,
                total_cost = $5,
                calculated_by_id = $6,
                notes = $7,
                is_approved = FALSE,
                approved_at = NULL,
                created_at = NOW()
             WHERE id = $1
             RETURNING {COST_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, CostCalculation>(&sql)
            .bind(id)
            .bind(material_cost)
            .bind(labor_cost)
            .bind(overhead_cost)
            .bind(total_cost)
            .bind(calculated_by_id)
            .bind(notes)
            .fetch_one(executor)
            .await?)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<CostCalculation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {COST_COLUMNS} FROM cost_calculations WHERE id = $1");
        Ok(sqlx::query_as::<_, CostCalculation>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn find_by_item<'e, E>(
        &self,
        executor: E,
        inquiry_item_id: Uuid,
    ) -> Result<Option<CostCalculation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql =
            format!("SELECT {COST_COLUMNS} FROM cost_calculations WHERE inquiry_item_id = $1");
        Ok(sqlx::query_as::<_, CostCalculation>(&sql)
            .bind(inquiry_item_id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn mark_approved<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<CostCalculation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE cost_calculations SET is_approved = TRUE, approved_at = NOW()
             WHERE id = $1
             RETURNING {COST_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, CostCalculation>(&sql)
            .bind(id)
            .fetch_one(executor)
            .await?)
    }

    /// `calculated_by` narrows the list to one calculator (VP ownership).
    pub async fn list(
        &self,
        calculated_by: Option<Uuid>,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<CostCalculation>, i64), AppError> {
        let sql = format!(
            "SELECT {COST_COLUMNS} FROM cost_calculations
             WHERE ($1::UUID IS NULL OR calculated_by_id = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        let calculations = sqlx::query_as::<_, CostCalculation>(&sql)
            .bind(calculated_by)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cost_calculations
             WHERE ($1::UUID IS NULL OR calculated_by_id = $1)",
        )
        .bind(calculated_by)
        .fetch_one(&self.pool)
        .await?;

        Ok((calculations, total))
    }
}
