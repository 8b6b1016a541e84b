// src/services/costing.rs

use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        ApprovalRepository, AuditRepository, CostingRepository, InquiryRepository, UserRepository,
    },
    models::auth::{Role, User},
    models::costing::{CostCalculation, CreateCostCalculationPayload},
    models::inquiry::{ItemStatus, Paginated},
    policy::{self, Action, Resource, Scope},
    services::notifier::Notifier,
    services::workflow::aggregate_status,
};

/// Gate for recording a calculation for an item. A previous calculation
/// blocks resubmission only while it is approved or still has an active
/// (PENDING/APPROVED) approval; one whose approval was rejected is replaced
/// in place so the rework loop can run.
pub(crate) fn submission_conflict(
    item_status: ItemStatus,
    previous_approved: Option<bool>,
    active_approval: bool,
) -> Option<&'static str> {
    if !matches!(item_status, ItemStatus::Assigned | ItemStatus::InProgress) {
        return Some("invalid_state");
    }
    match previous_approved {
        Some(true) => Some("calculation_exists"),
        Some(false) if active_approval => Some("calculation_exists"),
        _ => None,
    }
}

#[derive(Clone)]
pub struct CostingService {
    pool: sqlx::PgPool,
    costs: CostingRepository,
    inquiries: InquiryRepository,
    users: UserRepository,
    approvals: ApprovalRepository,
    audit: AuditRepository,
    notifier: Notifier,
}

impl CostingService {
    pub fn new(
        pool: sqlx::PgPool,
        costs: CostingRepository,
        inquiries: InquiryRepository,
        users: UserRepository,
        approvals: ApprovalRepository,
        audit: AuditRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            pool,
            costs,
            inquiries,
            users,
            approvals,
            audit,
            notifier,
        }
    }

    /// Records the material/labor/overhead breakdown for one item, flips it
    /// to COSTED and, when every sibling is done, moves the inquiry to
    /// COSTING. Managers get an in-app notification inside the transaction
    /// and a best-effort e-mail after commit.
    pub async fn create(
        &self,
        user: &User,
        payload: CreateCostCalculationPayload,
    ) -> Result<CostCalculation, AppError> {
        if payload.check_amounts().is_err() {
            return Err(AppError::Conflict("negative_cost"));
        }

        let mut tx = self.pool.begin().await?;

        // Resolve the item first to find the parent, then take the lock.
        let item = self
            .inquiries
            .find_item(&mut *tx, payload.inquiry_item_id)
            .await?
            .ok_or(AppError::NotFound("item"))?;

        let inquiry = self
            .inquiries
            .lock_by_id(&mut *tx, item.inquiry_id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;

        // VP may only cost items assigned to them
        policy::authorize(
            user.role,
            Resource::CostCalculation,
            Action::Create,
            item.assigned_to_id == Some(user.id),
        )?;

        let previous = self.costs.find_by_item(&mut *tx, item.id).await?;
        let active_approval = match &previous {
            Some(calc) => self.approvals.active_exists(&mut *tx, calc.id).await?,
            None => false,
        };
        if let Some(conflict) = submission_conflict(
            item.status,
            previous.as_ref().map(|c| c.is_approved),
            active_approval,
        ) {
            return Err(AppError::Conflict(conflict));
        }

        let total = payload.total();
        let calculation = match previous {
            // Rework after a rejection: the new breakdown replaces the old
            // one in place, keeping the 1:1 row per item.
            Some(rejected) => {
                self.costs
                    .replace(
                        &mut *tx,
                        rejected.id,
                        payload.material_cost,
                        payload.labor_cost,
                        payload.overhead_cost,
                        total,
                        user.id,
                        payload.notes.as_deref(),
                    )
                    .await?
            }
            None => {
                self.costs
                    .insert(
                        &mut *tx,
                        item.id,
                        payload.material_cost,
                        payload.labor_cost,
                        payload.overhead_cost,
                        total,
                        user.id,
                        payload.notes.as_deref(),
                    )
                    .await?
            }
        };

        self.inquiries
            .set_item_status(&mut *tx, item.id, ItemStatus::Costed)
            .await?;

        let statuses = self.inquiries.item_statuses(&mut *tx, inquiry.id).await?;
        let next = aggregate_status(inquiry.status, &statuses);
        if next != inquiry.status {
            self.inquiries
                .set_status(&mut *tx, inquiry.id, next)
                .await?;
        }

        self.audit
            .append(
                &mut *tx,
                "COST_CALCULATED",
                "cost_calculation",
                calculation.id,
                Some(&json!({ "itemStatus": item.status, "inquiryStatus": inquiry.status })),
                Some(&json!({ "calculation": calculation, "inquiryStatus": next })),
                user.id,
                Some(inquiry.id),
            )
            .await?;

        let managers = self
            .users
            .list_active_by_role(&mut *tx, Role::Manager)
            .await?;
        let inquiry_no = inquiry.inquiry_no.to_string();
        let total_str = total.to_string();
        let email = self
            .notifier
            .stage(
                &mut tx,
                &managers,
                "cost_submitted",
                &[
                    ("item", &item.name),
                    ("no", &inquiry_no),
                    ("total", &total_str),
                ],
                json!({
                    "inquiryId": inquiry.id,
                    "itemId": item.id,
                    "costCalculationId": calculation.id,
                }),
            )
            .await?;

        tx.commit().await?;
        self.notifier.dispatch(vec![email]).await;

        Ok(calculation)
    }

    pub async fn list(
        &self,
        user: &User,
        page: i64,
        per_page: i64,
    ) -> Result<Paginated<CostCalculation>, AppError> {
        let scope = policy::permission(user.role, Resource::CostCalculation, Action::Read);
        let calculated_by = match scope {
            Scope::Any => None,
            Scope::Owned => Some(user.id),
            Scope::Denied => return Err(AppError::Forbidden),
        };

        let page = page.max(1);
        let per_page = per_page.clamp(1, crate::services::workflow::MAX_PAGE_SIZE);
        let (items, total) = self.costs.list(calculated_by, page, per_page).await?;

        Ok(Paginated {
            items,
            total,
            page,
            per_page,
        })
    }

    pub async fn find(&self, user: &User, id: Uuid) -> Result<CostCalculation, AppError> {
        let calculation = self
            .costs
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("calculation"))?;

        policy::authorize(
            user.role,
            Resource::CostCalculation,
            Action::Read,
            calculation.calculated_by_id == user.id,
        )?;

        Ok(calculation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_item_passes_the_gate() {
        assert_eq!(submission_conflict(ItemStatus::Assigned, None, false), None);
        assert_eq!(
            submission_conflict(ItemStatus::InProgress, None, false),
            None
        );
    }

    #[test]
    fn approved_calculation_blocks_recalculation() {
        assert_eq!(
            submission_conflict(ItemStatus::Assigned, Some(true), false),
            Some("calculation_exists")
        );
    }

    #[test]
    fn pending_decision_blocks_recalculation() {
        assert_eq!(
            submission_conflict(ItemStatus::InProgress, Some(false), true),
            Some("calculation_exists")
        );
    }

    #[test]
    fn rejected_calculation_is_replaceable() {
        // The rework loop: the item is back in ASSIGNED, the previous
        // calculation is unapproved, its only approval is REJECTED.
        assert_eq!(
            submission_conflict(ItemStatus::Assigned, Some(false), false),
            None
        );
    }

    #[test]
    fn item_state_gates_before_duplicates() {
        for status in [
            ItemStatus::Pending,
            ItemStatus::Costed,
            ItemStatus::Approved,
            ItemStatus::Quoted,
        ] {
            assert_eq!(
                submission_conflict(status, None, false),
                Some("invalid_state")
            );
        }
    }
}
