// src/models/approval.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "approval_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// PENDING and APPROVED both block a new decision on the same
    /// calculation; only REJECTED frees the slot for a retry.
    pub fn is_active(self) -> bool {
        matches!(self, ApprovalStatus::Pending | ApprovalStatus::Approved)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: Uuid,
    pub cost_calculation_id: Uuid,
    pub status: ApprovalStatus,
    #[schema(example = "recalculate overhead")]
    pub comments: Option<String>,
    pub approver_id: Uuid,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApprovalPayload {
    pub cost_calculation_id: Uuid,
    /// true = approve, false = reject (rejection requires a comment in
    /// practice, but the field stays optional like the source system)
    pub approved: bool,
    pub comments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_statuses_block_new_decisions() {
        assert!(ApprovalStatus::Pending.is_active());
        assert!(ApprovalStatus::Approved.is_active());
        assert!(!ApprovalStatus::Rejected.is_active());
    }
}
