// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

const USER_COLUMNS: &str =
    "id, email, name, role, password_hash, is_active, preferred_language, created_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        role: Role,
        password_hash: &str,
        preferred_language: &str,
    ) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (email, name, role, password_hash, preferred_language)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(name)
            .bind(role)
            .bind(password_hash)
            .bind(preferred_language)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::EmailAlreadyExists;
                    }
                }
                e.into()
            })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Active users of a role, for notification fan-out.
    pub async fn list_active_by_role<'e, E>(
        &self,
        executor: E,
        role: Role,
    ) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE role = $1 AND is_active = TRUE
             ORDER BY name ASC"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .fetch_all(executor)
            .await?)
    }

    pub async fn search<'e, E>(
        &self,
        executor: E,
        term: &str,
        limit: i64,
    ) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE name ILIKE $1 OR email ILIKE $1
             ORDER BY name ASC
             LIMIT $2"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(format!("%{term}%"))
            .bind(limit)
            .fetch_all(executor)
            .await?)
    }
}
