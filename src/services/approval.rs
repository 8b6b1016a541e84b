// src/services/approval.rs

use serde_json::json;

use crate::{
    common::error::AppError,
    db::{ApprovalRepository, AuditRepository, CostingRepository, InquiryRepository, UserRepository},
    models::approval::{Approval, ApprovalStatus, CreateApprovalPayload},
    models::auth::User,
    models::inquiry::{InquiryStatus, ItemStatus, Paginated},
    policy::{self, Action, Resource, Scope},
    services::notifier::{EmailJob, Notifier},
    services::workflow::aggregate_status,
};

/// Status pair a decision applies: the approval row status and the item
/// status it cascades to. Reject sends the item back to ASSIGNED for rework.
pub(crate) fn decision_transition(approved: bool) -> (ApprovalStatus, ItemStatus) {
    if approved {
        (ApprovalStatus::Approved, ItemStatus::Approved)
    } else {
        (ApprovalStatus::Rejected, ItemStatus::Assigned)
    }
}

#[derive(Clone)]
pub struct ApprovalService {
    pool: sqlx::PgPool,
    approvals: ApprovalRepository,
    costs: CostingRepository,
    inquiries: InquiryRepository,
    users: UserRepository,
    audit: AuditRepository,
    notifier: Notifier,
}

impl ApprovalService {
    pub fn new(
        pool: sqlx::PgPool,
        approvals: ApprovalRepository,
        costs: CostingRepository,
        inquiries: InquiryRepository,
        users: UserRepository,
        audit: AuditRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            pool,
            approvals,
            costs,
            inquiries,
            users,
            audit,
            notifier,
        }
    }

    /// Records a manager decision on a cost calculation and cascades it.
    ///
    /// Approve: calculation approved, item APPROVED; once every sibling is
    /// approved, the inquiry creator hears "quote ready" (the inquiry itself
    /// stays at COSTING until the quote operation).
    /// Reject: item back to ASSIGNED for rework, the calculator is notified
    /// once with the comment.
    pub async fn decide(
        &self,
        user: &User,
        payload: CreateApprovalPayload,
    ) -> Result<Approval, AppError> {
        policy::authorize(user.role, Resource::Approval, Action::Create, true)?;

        let mut tx = self.pool.begin().await?;

        let calculation = self
            .costs
            .find_by_id(&mut *tx, payload.cost_calculation_id)
            .await?
            .ok_or(AppError::NotFound("calculation"))?;

        let item = self
            .inquiries
            .find_item(&mut *tx, calculation.inquiry_item_id)
            .await?
            .ok_or(AppError::NotFound("item"))?;

        // Lock before the active-approval check: two simultaneous decisions
        // on the same calculation serialize on the parent inquiry row.
        let inquiry = self
            .inquiries
            .lock_by_id(&mut *tx, item.inquiry_id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;

        if self
            .approvals
            .active_exists(&mut *tx, calculation.id)
            .await?
        {
            return Err(AppError::Conflict("active_approval"));
        }

        if item.status != ItemStatus::Costed {
            return Err(AppError::Conflict("invalid_state"));
        }

        let (status, item_next) = decision_transition(payload.approved);

        let approval = self
            .approvals
            .insert(
                &mut *tx,
                calculation.id,
                status,
                payload.comments.as_deref(),
                user.id,
            )
            .await?;

        let mut emails: Vec<EmailJob> = Vec::new();
        let inquiry_no = inquiry.inquiry_no.to_string();

        if payload.approved {
            self.costs.mark_approved(&mut *tx, calculation.id).await?;
            self.inquiries
                .set_item_status(&mut *tx, item.id, item_next)
                .await?;

            let statuses = self.inquiries.item_statuses(&mut *tx, inquiry.id).await?;
            let next = aggregate_status(inquiry.status, &statuses);
            if next != inquiry.status {
                self.inquiries
                    .set_status(&mut *tx, inquiry.id, next)
                    .await?;
            }

            // Everything approved: costing is complete, the quote can go out.
            // The inquiry deliberately stays at COSTING here.
            let all_approved = statuses.iter().all(|s| *s == ItemStatus::Approved);
            if all_approved && next == InquiryStatus::Costing {
                if let Some(creator) = self.users.find_by_id(inquiry.created_by_id).await? {
                    let email = self
                        .notifier
                        .stage(
                            &mut tx,
                            std::slice::from_ref(&creator),
                            "quote_ready",
                            &[("no", &inquiry_no)],
                            json!({ "inquiryId": inquiry.id }),
                        )
                        .await?;
                    emails.push(email);
                }
            }
        } else {
            // Rework: the item goes back to its assignee
            self.inquiries
                .set_item_status(&mut *tx, item.id, item_next)
                .await?;

            if let Some(calculator) = self.users.find_by_id(calculation.calculated_by_id).await? {
                let comment = payload.comments.as_deref().unwrap_or("-");
                let email = self
                    .notifier
                    .stage(
                        &mut tx,
                        std::slice::from_ref(&calculator),
                        "cost_rejected",
                        &[
                            ("item", &item.name),
                            ("no", &inquiry_no),
                            ("comment", comment),
                        ],
                        json!({
                            "inquiryId": inquiry.id,
                            "itemId": item.id,
                            "costCalculationId": calculation.id,
                        }),
                    )
                    .await?;
                emails.push(email);
            }
        }

        self.audit
            .append(
                &mut *tx,
                if payload.approved {
                    "COST_APPROVED"
                } else {
                    "COST_REJECTED"
                },
                "approval",
                approval.id,
                Some(&json!({ "itemStatus": item.status })),
                Some(&json!({ "approval": approval })),
                user.id,
                Some(inquiry.id),
            )
            .await?;

        tx.commit().await?;
        self.notifier.dispatch(emails).await;

        Ok(approval)
    }

    pub async fn list(
        &self,
        user: &User,
        page: i64,
        per_page: i64,
    ) -> Result<Paginated<Approval>, AppError> {
        let scope = policy::permission(user.role, Resource::Approval, Action::Read);
        let approver = match scope {
            Scope::Any => None,
            Scope::Owned => Some(user.id),
            Scope::Denied => return Err(AppError::Forbidden),
        };

        let page = page.max(1);
        let per_page = per_page.clamp(1, crate::services::workflow::MAX_PAGE_SIZE);
        let (items, total) = self.approvals.list(approver, page, per_page).await?;

        Ok(Paginated {
            items,
            total,
            page,
            per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::costing::submission_conflict;

    #[test]
    fn approve_cascades_to_item() {
        let (status, item) = decision_transition(true);
        assert_eq!(status, ApprovalStatus::Approved);
        assert_eq!(item, ItemStatus::Approved);
        assert!(status.is_active());
    }

    #[test]
    fn reject_sends_item_back_for_rework() {
        let (status, item) = decision_transition(false);
        assert_eq!(status, ApprovalStatus::Rejected);
        assert_eq!(item, ItemStatus::Assigned);
        assert!(!status.is_active());
    }

    #[test]
    fn rejected_calculation_can_be_recosted() {
        // After a rejection the item is ASSIGNED again, the old calculation
        // is unapproved and carries no active decision, so the calculator's
        // resubmission passes the conflict gate.
        let (status, item) = decision_transition(false);
        assert_eq!(
            submission_conflict(item, Some(false), status.is_active()),
            None
        );
    }

    #[test]
    fn approved_calculation_stays_final() {
        // The approved path: item APPROVED, calculation approved. Neither
        // the item state nor the duplicate gate lets a second breakdown in.
        let (status, item) = decision_transition(true);
        assert_eq!(
            submission_conflict(item, Some(true), status.is_active()),
            Some("invalid_state")
        );
        assert_eq!(
            submission_conflict(ItemStatus::Assigned, Some(true), status.is_active()),
            Some("calculation_exists")
        );
    }
}
