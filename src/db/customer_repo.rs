// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::customer::Customer};

const CUSTOMER_COLUMNS: &str = "id, name, contact_person, email, phone, address, \
     created_by_id, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        contact_person: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        created_by_id: Uuid,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO customers (name, contact_person, email, phone, address, created_by_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CUSTOMER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(name)
            .bind(contact_person)
            .bind(email)
            .bind(phone)
            .bind(address)
            .bind(created_by_id)
            .fetch_one(executor)
            .await?)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1");
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Customer>, i64), AppError> {
        let term = search.map(|s| format!("%{s}%"));

        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers
             WHERE is_active = TRUE
               AND ($1::TEXT IS NULL OR name ILIKE $1 OR contact_person ILIKE $1 OR email ILIKE $1)
             ORDER BY name ASC
             LIMIT $2 OFFSET $3"
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(term.as_deref())
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers
             WHERE is_active = TRUE
               AND ($1::TEXT IS NULL OR name ILIKE $1 OR contact_person ILIKE $1 OR email ILIKE $1)",
        )
        .bind(term.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((customers, total))
    }

    pub async fn search<'e, E>(
        &self,
        executor: E,
        term: &str,
        limit: i64,
    ) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers
             WHERE name ILIKE $1 OR contact_person ILIKE $1 OR email ILIKE $1
             ORDER BY name ASC
             LIMIT $2"
        );
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(format!("%{term}%"))
            .bind(limit)
            .fetch_all(executor)
            .await?)
    }
}
