// src/db/inquiry_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inquiry::{
        Attachment, Inquiry, InquiryItem, InquiryListQuery, InquiryStatus, ItemStatus, Priority,
    },
};

const INQUIRY_COLUMNS: &str = "id, inquiry_no, title, description, priority, status, deadline, \
     customer_id, created_by_id, assigned_to_id, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, inquiry_id, position, name, description, quantity, unit, status, \
     assigned_to_id, requested_delivery, created_at, updated_at";

#[derive(Clone)]
pub struct InquiryRepository {
    pool: PgPool,
}

impl InquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  INQUIRIES
    // =========================================================================

    pub async fn create<'e, E>(
        &self,
        executor: E,
        title: &str,
        description: Option<&str>,
        priority: Priority,
        deadline: Option<NaiveDate>,
        customer_id: Option<Uuid>,
        created_by_id: Uuid,
    ) -> Result<Inquiry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO inquiries (title, description, priority, deadline, customer_id, created_by_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {INQUIRY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(title)
            .bind(description)
            .bind(priority)
            .bind(deadline)
            .bind(customer_id)
            .bind(created_by_id)
            .fetch_one(executor)
            .await?)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Inquiry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE id = $1");
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }

    /// Locks the inquiry row for the rest of the transaction. Every item
    /// mutation goes through this lock so concurrent updates to two items of
    /// the same inquiry serialize instead of racing on the aggregate status.
    pub async fn lock_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Inquiry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE id = $1 FOR UPDATE");
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn update_fields<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        priority: Option<Priority>,
        deadline: Option<NaiveDate>,
        customer_id: Option<Uuid>,
        assigned_to_id: Option<Uuid>,
    ) -> Result<Inquiry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE inquiries SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                deadline = COALESCE($5, deadline),
                customer_id = COALESCE($6, customer_id),
                assigned_to_id = COALESCE($7, assigned_to_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {INQUIRY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(id)
            .bind(title)
            .bind(description)
            .bind(priority)
            .bind(deadline)
            .bind(customer_id)
            .bind(assigned_to_id)
            .fetch_one(executor)
            .await?)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: InquiryStatus,
    ) -> Result<Inquiry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE inquiries SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {INQUIRY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(id)
            .bind(status)
            .fetch_one(executor)
            .await?)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Paginated, filtered list. `created_by` narrows the result to one
    /// creator (ownership scope for SALES).
    pub async fn list(
        &self,
        query: &InquiryListQuery,
        created_by: Option<Uuid>,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Inquiry>, i64), AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE 1=1"
        ));
        Self::push_list_filters(&mut qb, query, created_by);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(per_page);
        qb.push(" OFFSET ");
        qb.push_bind((page - 1) * per_page);

        let inquiries = qb
            .build_query_as::<Inquiry>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM inquiries WHERE 1=1");
        Self::push_list_filters(&mut count_qb, query, created_by);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((inquiries, total))
    }

    fn push_list_filters<'a>(
        qb: &mut QueryBuilder<'a, Postgres>,
        query: &'a InquiryListQuery,
        created_by: Option<Uuid>,
    ) {
        if let Some(owner) = created_by {
            qb.push(" AND created_by_id = ");
            qb.push_bind(owner);
        }
        if let Some(status) = query.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        if let Some(priority) = query.priority {
            qb.push(" AND priority = ");
            qb.push_bind(priority);
        }
        if let Some(search) = query.search.as_deref() {
            qb.push(" AND (title ILIKE ");
            qb.push_bind(format!("%{search}%"));
            qb.push(" OR description ILIKE ");
            qb.push_bind(format!("%{search}%"));
            qb.push(" OR inquiry_no::TEXT ILIKE ");
            qb.push_bind(format!("%{search}%"));
            qb.push(")");
        }
        if let Some(from) = query.from {
            qb.push(" AND created_at >= ");
            qb.push_bind(from);
        }
        if let Some(to) = query.to {
            qb.push(" AND created_at < ");
            qb.push_bind(to.succ_opt().unwrap_or(to));
        }
    }

    pub async fn search<'e, E>(
        &self,
        executor: E,
        term: &str,
        created_by: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Inquiry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {INQUIRY_COLUMNS} FROM inquiries
             WHERE (title ILIKE $1 OR description ILIKE $1 OR inquiry_no::TEXT ILIKE $1)
               AND ($2::UUID IS NULL OR created_by_id = $2)
             ORDER BY created_at DESC
             LIMIT $3"
        );
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(format!("%{term}%"))
            .bind(created_by)
            .bind(limit)
            .fetch_all(executor)
            .await?)
    }

    // =========================================================================
    //  ITEMS
    // =========================================================================

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
        position: i32,
        name: &str,
        description: Option<&str>,
        quantity: Decimal,
        unit: &str,
        requested_delivery: Option<NaiveDate>,
    ) -> Result<InquiryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO inquiry_items
                 (inquiry_id, position, name, description, quantity, unit, requested_delivery)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ITEM_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, InquiryItem>(&sql)
            .bind(inquiry_id)
            .bind(position)
            .bind(name)
            .bind(description)
            .bind(quantity)
            .bind(unit)
            .bind(requested_delivery)
            .fetch_one(executor)
            .await?)
    }

    pub async fn find_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
    ) -> Result<Option<InquiryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM inquiry_items WHERE id = $1");
        Ok(sqlx::query_as::<_, InquiryItem>(&sql)
            .bind(item_id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
    ) -> Result<Vec<InquiryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM inquiry_items
             WHERE inquiry_id = $1
             ORDER BY position ASC"
        );
        Ok(sqlx::query_as::<_, InquiryItem>(&sql)
            .bind(inquiry_id)
            .fetch_all(executor)
            .await?)
    }

    /// Sibling statuses feeding the aggregate reducer. Called while holding
    /// the parent row lock.
    pub async fn item_statuses<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
    ) -> Result<Vec<ItemStatus>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        Ok(
            sqlx::query_scalar::<_, ItemStatus>(
                "SELECT status FROM inquiry_items WHERE inquiry_id = $1",
            )
            .bind(inquiry_id)
            .fetch_all(executor)
            .await?,
        )
    }

    pub async fn set_item_status<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        status: ItemStatus,
    ) -> Result<InquiryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE inquiry_items SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, InquiryItem>(&sql)
            .bind(item_id)
            .bind(status)
            .fetch_one(executor)
            .await?)
    }

    pub async fn assign_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        assigned_to_id: Uuid,
    ) -> Result<InquiryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE inquiry_items
             SET assigned_to_id = $2, status = 'ASSIGNED', updated_at = NOW()
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, InquiryItem>(&sql)
            .bind(item_id)
            .bind(assigned_to_id)
            .fetch_one(executor)
            .await?)
    }

    /// Bulk transition used when the inquiry moves to QUOTED.
    pub async fn set_all_items_status<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
        from: ItemStatus,
        to: ItemStatus,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE inquiry_items SET status = $3, updated_at = NOW()
             WHERE inquiry_id = $1 AND status = $2",
        )
        .bind(inquiry_id)
        .bind(from)
        .bind(to)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn search_items<'e, E>(
        &self,
        executor: E,
        term: &str,
        limit: i64,
    ) -> Result<Vec<InquiryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM inquiry_items
             WHERE name ILIKE $1 OR description ILIKE $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        Ok(sqlx::query_as::<_, InquiryItem>(&sql)
            .bind(format!("%{term}%"))
            .bind(limit)
            .fetch_all(executor)
            .await?)
    }

    // =========================================================================
    //  ATTACHMENTS (metadata only; the upload happens at an external provider)
    // =========================================================================

    pub async fn insert_attachment<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
        file_name: &str,
        url: &str,
        size_bytes: i64,
        mime_type: &str,
        uploaded_by_id: Uuid,
    ) -> Result<Attachment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        Ok(sqlx::query_as::<_, Attachment>(
            "INSERT INTO attachments
                 (inquiry_id, file_name, url, size_bytes, mime_type, uploaded_by_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, inquiry_id, file_name, url, size_bytes, mime_type,
                       uploaded_by_id, created_at",
        )
        .bind(inquiry_id)
        .bind(file_name)
        .bind(url)
        .bind(size_bytes)
        .bind(mime_type)
        .bind(uploaded_by_id)
        .fetch_one(executor)
        .await?)
    }

    pub async fn list_attachments<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
    ) -> Result<Vec<Attachment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        Ok(sqlx::query_as::<_, Attachment>(
            "SELECT id, inquiry_id, file_name, url, size_bytes, mime_type,
                    uploaded_by_id, created_at
             FROM attachments
             WHERE inquiry_id = $1
             ORDER BY created_at ASC",
        )
        .bind(inquiry_id)
        .fetch_all(executor)
        .await?)
    }
}
