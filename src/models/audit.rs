// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Append-only trail of every mutating action. Rows carry before/after
/// snapshots and are never updated or deleted.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    #[schema(example = "INQUIRY_SUBMITTED")]
    pub action: String,
    #[schema(example = "inquiry")]
    pub entity: String,
    pub entity_id: Uuid,
    pub old_data: Option<Value>,
    pub new_data: Option<Value>,
    pub user_id: Uuid,
    pub inquiry_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
