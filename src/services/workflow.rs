// src/services/workflow.rs
//
// Inquiry lifecycle: creation, submission, item assignment and the
// inquiry-level transitions (quote, decision, conversion). The aggregate
// status is a pure reducer over the item statuses, recomputed while holding
// a row lock on the parent inquiry, so concurrent item updates serialize
// instead of racing.

use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuditRepository, CustomerRepository, InquiryRepository, UserRepository},
    models::audit::AuditLog,
    models::auth::{Role, User},
    models::inquiry::{
        AssignItemPayload, Attachment, CreateAttachmentPayload, CreateInquiryPayload, Inquiry,
        InquiryDetail, InquiryItem, InquiryListQuery, InquiryStatus, ItemStatus, Paginated,
        Priority, UpdateInquiryPayload,
    },
    policy::{self, Action, Resource},
    services::notifier::Notifier,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

// --- PURE CORE ---

/// Derives the inquiry status from its items' statuses.
///
/// All items in {COSTED, APPROVED, QUOTED} means costing is done and the
/// inquiry sits at COSTING (which also doubles as "ready to quote" in this
/// domain). Statuses at QUOTED or later never move backwards, and an empty
/// item list changes nothing. Applying the reducer twice is a no-op.
pub fn aggregate_status(current: InquiryStatus, items: &[ItemStatus]) -> InquiryStatus {
    if items.is_empty() {
        return current;
    }
    match current {
        InquiryStatus::Submitted | InquiryStatus::Assigned | InquiryStatus::Costing => {
            let all_costed = items.iter().all(|s| {
                matches!(
                    s,
                    ItemStatus::Costed | ItemStatus::Approved | ItemStatus::Quoted
                )
            });
            if all_costed {
                return InquiryStatus::Costing;
            }
            let none_pending = items.iter().all(|s| !matches!(s, ItemStatus::Pending));
            if none_pending && current == InquiryStatus::Submitted {
                return InquiryStatus::Assigned;
            }
            current
        }
        // DRAFT only leaves via submit; later states only via explicit ops
        _ => current,
    }
}

/// Explicit inquiry-level transitions (the aggregate reducer handles the
/// item-driven ones).
pub fn can_transition(from: InquiryStatus, to: InquiryStatus) -> bool {
    use InquiryStatus::*;
    matches!(
        (from, to),
        (Draft, Submitted)
            | (Costing, Quoted)
            | (Quoted, Approved)
            | (Quoted, Rejected)
            | (Approved, Converted)
    )
}

fn is_elevated(role: Role) -> bool {
    matches!(role, Role::Manager | Role::Admin | Role::Superuser)
}

// --- SERVICE ---

#[derive(Clone)]
pub struct InquiryWorkflowService {
    pool: sqlx::PgPool,
    inquiries: InquiryRepository,
    customers: CustomerRepository,
    users: UserRepository,
    audit: AuditRepository,
    notifier: Notifier,
}

impl InquiryWorkflowService {
    pub fn new(
        pool: sqlx::PgPool,
        inquiries: InquiryRepository,
        customers: CustomerRepository,
        users: UserRepository,
        audit: AuditRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            pool,
            inquiries,
            customers,
            users,
            audit,
            notifier,
        }
    }

    pub async fn create(
        &self,
        user: &User,
        payload: CreateInquiryPayload,
    ) -> Result<InquiryDetail, AppError> {
        policy::authorize(user.role, Resource::Inquiry, Action::Create, true)?;

        let mut tx = self.pool.begin().await?;

        if let Some(customer_id) = payload.customer_id {
            self.customers
                .find_by_id(&mut *tx, customer_id)
                .await?
                .ok_or(AppError::NotFound("customer"))?;
        }

        let inquiry = self
            .inquiries
            .create(
                &mut *tx,
                &payload.title,
                payload.description.as_deref(),
                payload.priority.unwrap_or(Priority::Medium),
                payload.deadline,
                payload.customer_id,
                user.id,
            )
            .await?;

        let mut items = Vec::with_capacity(payload.items.len());
        for (index, item) in payload.items.iter().enumerate() {
            let inserted = self
                .inquiries
                .insert_item(
                    &mut *tx,
                    inquiry.id,
                    index as i32 + 1,
                    &item.name,
                    item.description.as_deref(),
                    item.quantity,
                    item.unit.as_deref().unwrap_or("pcs"),
                    item.requested_delivery,
                )
                .await?;
            items.push(inserted);
        }

        self.audit
            .append(
                &mut *tx,
                "INQUIRY_CREATED",
                "inquiry",
                inquiry.id,
                None,
                Some(&json!({ "inquiry": inquiry, "itemCount": items.len() })),
                user.id,
                Some(inquiry.id),
            )
            .await?;

        tx.commit().await?;

        Ok(InquiryDetail {
            inquiry,
            items,
            attachments: Vec::new(),
        })
    }

    pub async fn get(&self, user: &User, id: Uuid) -> Result<InquiryDetail, AppError> {
        let inquiry = self
            .inquiries
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;

        policy::authorize(
            user.role,
            Resource::Inquiry,
            Action::Read,
            inquiry.created_by_id == user.id,
        )?;

        let items = self.inquiries.list_items(&self.pool, id).await?;
        let attachments = self.inquiries.list_attachments(&self.pool, id).await?;

        Ok(InquiryDetail {
            inquiry,
            items,
            attachments,
        })
    }

    pub async fn list(
        &self,
        user: &User,
        query: &InquiryListQuery,
    ) -> Result<Paginated<Inquiry>, AppError> {
        let scope = policy::permission(user.role, Resource::Inquiry, Action::Read);
        let created_by = match scope {
            policy::Scope::Any => None,
            policy::Scope::Owned => Some(user.id),
            policy::Scope::Denied => return Err(AppError::Forbidden),
        };

        let page = query.page.unwrap_or(1).max(1);
        let per_page = query
            .per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let (items, total) = self.inquiries.list(query, created_by, page, per_page).await?;

        Ok(Paginated {
            items,
            total,
            page,
            per_page,
        })
    }

    pub async fn update(
        &self,
        user: &User,
        id: Uuid,
        payload: UpdateInquiryPayload,
    ) -> Result<Inquiry, AppError> {
        let mut tx = self.pool.begin().await?;

        let inquiry = self
            .inquiries
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;

        policy::authorize(
            user.role,
            Resource::Inquiry,
            Action::Update,
            inquiry.created_by_id == user.id,
        )?;

        // Reassigning the inquiry owner-side contact is a management call
        if payload.assigned_to_id.is_some() && !is_elevated(user.role) {
            return Err(AppError::Forbidden);
        }

        if let Some(customer_id) = payload.customer_id {
            self.customers
                .find_by_id(&mut *tx, customer_id)
                .await?
                .ok_or(AppError::NotFound("customer"))?;
        }

        let updated = self
            .inquiries
            .update_fields(
                &mut *tx,
                id,
                payload.title.as_deref(),
                payload.description.as_deref(),
                payload.priority,
                payload.deadline,
                payload.customer_id,
                payload.assigned_to_id,
            )
            .await?;

        self.audit
            .append(
                &mut *tx,
                "INQUIRY_UPDATED",
                "inquiry",
                id,
                Some(&json!(inquiry)),
                Some(&json!(updated)),
                user.id,
                Some(id),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let inquiry = self
            .inquiries
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;

        policy::authorize(
            user.role,
            Resource::Inquiry,
            Action::Delete,
            inquiry.created_by_id == user.id,
        )?;

        self.inquiries.delete(&mut *tx, id).await?;

        // inquiry_id stays NULL here: the row is gone, entity_id keeps the trace
        self.audit
            .append(
                &mut *tx,
                "INQUIRY_DELETED",
                "inquiry",
                id,
                Some(&json!(inquiry)),
                None,
                user.id,
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn submit(&self, user: &User, id: Uuid) -> Result<Inquiry, AppError> {
        self.transition(user, id, InquiryStatus::Submitted, "INQUIRY_SUBMITTED", None)
            .await
    }

    pub async fn quote(&self, user: &User, id: Uuid) -> Result<Inquiry, AppError> {
        let mut tx = self.pool.begin().await?;

        let inquiry = self
            .inquiries
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;

        policy::authorize(
            user.role,
            Resource::Inquiry,
            Action::Update,
            inquiry.created_by_id == user.id,
        )?;

        if !can_transition(inquiry.status, InquiryStatus::Quoted) {
            return Err(AppError::Conflict("invalid_state"));
        }

        let statuses = self.inquiries.item_statuses(&mut *tx, id).await?;
        if statuses.is_empty() || statuses.iter().any(|s| *s != ItemStatus::Approved) {
            return Err(AppError::Conflict("invalid_state"));
        }

        self.inquiries
            .set_all_items_status(&mut *tx, id, ItemStatus::Approved, ItemStatus::Quoted)
            .await?;
        let updated = self
            .inquiries
            .set_status(&mut *tx, id, InquiryStatus::Quoted)
            .await?;

        self.audit
            .append(
                &mut *tx,
                "INQUIRY_QUOTED",
                "inquiry",
                id,
                Some(&json!({ "status": inquiry.status })),
                Some(&json!({ "status": updated.status })),
                user.id,
                Some(id),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn decide(
        &self,
        user: &User,
        id: Uuid,
        accepted: bool,
        comments: Option<&str>,
    ) -> Result<Inquiry, AppError> {
        let target = if accepted {
            InquiryStatus::Approved
        } else {
            InquiryStatus::Rejected
        };
        let action = if accepted {
            "INQUIRY_ACCEPTED"
        } else {
            "INQUIRY_REJECTED"
        };
        self.transition(user, id, target, action, comments).await
    }

    pub async fn convert(&self, user: &User, id: Uuid) -> Result<Inquiry, AppError> {
        self.transition(user, id, InquiryStatus::Converted, "INQUIRY_CONVERTED", None)
            .await
    }

    /// Shared path for the explicit inquiry-level transitions.
    async fn transition(
        &self,
        user: &User,
        id: Uuid,
        to: InquiryStatus,
        action: &str,
        comments: Option<&str>,
    ) -> Result<Inquiry, AppError> {
        let mut tx = self.pool.begin().await?;

        let inquiry = self
            .inquiries
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;

        policy::authorize(
            user.role,
            Resource::Inquiry,
            Action::Update,
            inquiry.created_by_id == user.id,
        )?;

        if !can_transition(inquiry.status, to) {
            return Err(AppError::Conflict("invalid_state"));
        }

        let updated = self.inquiries.set_status(&mut *tx, id, to).await?;

        self.audit
            .append(
                &mut *tx,
                action,
                "inquiry",
                id,
                Some(&json!({ "status": inquiry.status })),
                Some(&json!({ "status": updated.status, "comments": comments })),
                user.id,
                Some(id),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// VPP (or management) hands an item to a VP user for costing.
    pub async fn assign_item(
        &self,
        user: &User,
        inquiry_id: Uuid,
        item_id: Uuid,
        payload: AssignItemPayload,
    ) -> Result<InquiryItem, AppError> {
        // Assignment touches other people's items, so Owned is not enough
        if policy::permission(user.role, Resource::InquiryItem, Action::Update)
            != policy::Scope::Any
        {
            return Err(AppError::Forbidden);
        }

        let assignee = self
            .users
            .find_by_id(payload.assigned_to_id)
            .await?
            .ok_or(AppError::NotFound("user"))?;
        if assignee.role != Role::Vp {
            return Err(AppError::Conflict("assignee_not_costing_role"));
        }

        let mut tx = self.pool.begin().await?;

        let inquiry = self
            .inquiries
            .lock_by_id(&mut *tx, inquiry_id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;
        if matches!(
            inquiry.status,
            InquiryStatus::Draft | InquiryStatus::Approved | InquiryStatus::Rejected
                | InquiryStatus::Converted
        ) {
            return Err(AppError::Conflict("invalid_state"));
        }

        let item = self
            .inquiries
            .find_item(&mut *tx, item_id)
            .await?
            .filter(|item| item.inquiry_id == inquiry_id)
            .ok_or(AppError::NotFound("item"))?;
        if !matches!(item.status, ItemStatus::Pending | ItemStatus::Assigned) {
            return Err(AppError::Conflict("invalid_state"));
        }

        let assigned = self
            .inquiries
            .assign_item(&mut *tx, item_id, assignee.id)
            .await?;

        let statuses = self.inquiries.item_statuses(&mut *tx, inquiry_id).await?;
        let next = aggregate_status(inquiry.status, &statuses);
        if next != inquiry.status {
            self.inquiries.set_status(&mut *tx, inquiry_id, next).await?;
        }

        self.audit
            .append(
                &mut *tx,
                "ITEM_ASSIGNED",
                "inquiry_item",
                item_id,
                Some(&json!({ "status": item.status, "assignedToId": item.assigned_to_id })),
                Some(&json!({ "status": assigned.status, "assignedToId": assigned.assigned_to_id })),
                user.id,
                Some(inquiry_id),
            )
            .await?;

        let inquiry_no = inquiry.inquiry_no.to_string();
        let email = self
            .notifier
            .stage(
                &mut tx,
                std::slice::from_ref(&assignee),
                "item_assigned",
                &[("item", &assigned.name), ("no", &inquiry_no)],
                json!({ "inquiryId": inquiry_id, "itemId": item_id }),
            )
            .await?;

        tx.commit().await?;
        self.notifier.dispatch(vec![email]).await;

        Ok(assigned)
    }

    /// The assignee starts working on an item (ASSIGNED -> IN_PROGRESS).
    pub async fn start_item(
        &self,
        user: &User,
        inquiry_id: Uuid,
        item_id: Uuid,
    ) -> Result<InquiryItem, AppError> {
        let mut tx = self.pool.begin().await?;

        self.inquiries
            .lock_by_id(&mut *tx, inquiry_id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;

        let item = self
            .inquiries
            .find_item(&mut *tx, item_id)
            .await?
            .filter(|item| item.inquiry_id == inquiry_id)
            .ok_or(AppError::NotFound("item"))?;

        policy::authorize(
            user.role,
            Resource::InquiryItem,
            Action::Update,
            item.assigned_to_id == Some(user.id),
        )?;

        if item.status != ItemStatus::Assigned {
            return Err(AppError::Conflict("invalid_state"));
        }

        let updated = self
            .inquiries
            .set_item_status(&mut *tx, item_id, ItemStatus::InProgress)
            .await?;

        self.audit
            .append(
                &mut *tx,
                "ITEM_STARTED",
                "inquiry_item",
                item_id,
                Some(&json!({ "status": item.status })),
                Some(&json!({ "status": updated.status })),
                user.id,
                Some(inquiry_id),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Full trail for one inquiry, oldest first.
    pub async fn audit_trail(&self, user: &User, inquiry_id: Uuid) -> Result<Vec<AuditLog>, AppError> {
        let inquiry = self
            .inquiries
            .find_by_id(&self.pool, inquiry_id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;

        policy::authorize(
            user.role,
            Resource::Inquiry,
            Action::Read,
            inquiry.created_by_id == user.id,
        )?;

        self.audit.list_for_inquiry(inquiry_id).await
    }

    /// Stores the metadata the external upload provider returned.
    pub async fn add_attachment(
        &self,
        user: &User,
        inquiry_id: Uuid,
        payload: CreateAttachmentPayload,
    ) -> Result<Attachment, AppError> {
        let mut tx = self.pool.begin().await?;

        let inquiry = self
            .inquiries
            .lock_by_id(&mut *tx, inquiry_id)
            .await?
            .ok_or(AppError::NotFound("inquiry"))?;

        policy::authorize(
            user.role,
            Resource::Inquiry,
            Action::Update,
            inquiry.created_by_id == user.id,
        )?;

        let attachment = self
            .inquiries
            .insert_attachment(
                &mut *tx,
                inquiry_id,
                &payload.file_name,
                &payload.url,
                payload.size_bytes,
                &payload.mime_type,
                user.id,
            )
            .await?;

        self.audit
            .append(
                &mut *tx,
                "ATTACHMENT_ADDED",
                "attachment",
                attachment.id,
                None,
                Some(&json!(attachment)),
                user.id,
                Some(inquiry_id),
            )
            .await?;

        tx.commit().await?;
        Ok(attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InquiryStatus as Q;
    use ItemStatus as I;

    #[test]
    fn all_items_done_moves_inquiry_to_costing() {
        for current in [Q::Submitted, Q::Assigned, Q::Costing] {
            assert_eq!(
                aggregate_status(current, &[I::Costed, I::Approved, I::Quoted]),
                Q::Costing
            );
        }
    }

    #[test]
    fn reducer_is_idempotent() {
        let items = [I::Costed, I::Costed];
        let once = aggregate_status(Q::Assigned, &items);
        assert_eq!(once, Q::Costing);
        assert_eq!(aggregate_status(once, &items), once);
    }

    #[test]
    fn pending_item_keeps_inquiry_where_it_is() {
        assert_eq!(
            aggregate_status(Q::Submitted, &[I::Costed, I::Pending]),
            Q::Submitted
        );
        assert_eq!(
            aggregate_status(Q::Assigned, &[I::Assigned, I::Pending]),
            Q::Assigned
        );
    }

    #[test]
    fn full_assignment_promotes_submitted_to_assigned() {
        assert_eq!(
            aggregate_status(Q::Submitted, &[I::Assigned, I::InProgress]),
            Q::Assigned
        );
        // but never demotes an inquiry already at COSTING
        assert_eq!(
            aggregate_status(Q::Costing, &[I::Assigned, I::InProgress]),
            Q::Costing
        );
    }

    #[test]
    fn empty_item_list_changes_nothing() {
        for current in [Q::Draft, Q::Submitted, Q::Costing, Q::Quoted] {
            assert_eq!(aggregate_status(current, &[]), current);
        }
    }

    #[test]
    fn late_stages_never_move_backwards() {
        for current in [Q::Quoted, Q::Approved, Q::Rejected, Q::Converted] {
            assert_eq!(aggregate_status(current, &[I::Assigned]), current);
            assert_eq!(aggregate_status(current, &[I::Costed]), current);
        }
    }

    #[test]
    fn draft_only_leaves_via_submit() {
        assert_eq!(aggregate_status(Q::Draft, &[I::Costed]), Q::Draft);
        assert!(can_transition(Q::Draft, Q::Submitted));
        assert!(!can_transition(Q::Draft, Q::Costing));
    }

    #[test]
    fn explicit_transition_table() {
        assert!(can_transition(Q::Costing, Q::Quoted));
        assert!(can_transition(Q::Quoted, Q::Approved));
        assert!(can_transition(Q::Quoted, Q::Rejected));
        assert!(can_transition(Q::Approved, Q::Converted));

        assert!(!can_transition(Q::Submitted, Q::Quoted));
        assert!(!can_transition(Q::Rejected, Q::Converted));
        assert!(!can_transition(Q::Converted, Q::Draft));
    }
}
