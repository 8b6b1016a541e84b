// src/models/inquiry.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS (mapping the Postgres types) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inquiry_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Lifecycle of a whole inquiry. COSTING covers both "items being costed"
/// and "costing complete, ready to quote"; the quote operation moves it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inquiry_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InquiryStatus {
    Draft,
    Submitted,
    Assigned,
    Costing,
    Quoted,
    Approved,
    Rejected,
    Converted,
}

/// Lifecycle of a single line item. REJECTED is transient: an approval
/// rejection reverts the item straight to ASSIGNED for rework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "item_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Pending,
    Assigned,
    InProgress,
    Costed,
    Approved,
    Quoted,
    Rejected,
}

// --- ENTITIES ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: Uuid,
    #[schema(example = 1042)]
    pub inquiry_no: i64,
    #[schema(example = "Steel Beams")]
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: InquiryStatus,
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-01")]
    pub deadline: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,
    pub created_by_id: Uuid,
    pub assigned_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryItem {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    // Insertion order within the inquiry
    pub position: i32,
    #[schema(example = "IPE 200 beam")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "12.000")]
    pub quantity: Decimal,
    #[schema(example = "pcs")]
    pub unit: String,
    pub status: ItemStatus,
    pub assigned_to_id: Option<Uuid>,
    #[schema(value_type = Option<String>, format = Date)]
    pub requested_delivery: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    #[schema(example = "drawing-rev3.pdf")]
    pub file_name: String,
    pub url: String,
    pub size_bytes: i64,
    #[schema(example = "application/pdf")]
    pub mime_type: String,
    pub uploaded_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Inquiry together with its children, as returned by the detail endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryDetail {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub items: Vec<InquiryItem>,
    pub attachments: Vec<Attachment>,
}

// --- PAYLOADS ---

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInquiryItemPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "IPE 200 beam")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "12")]
    pub quantity: Decimal,
    #[schema(example = "pcs")]
    pub unit: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub requested_delivery: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInquiryPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Steel Beams")]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    #[schema(value_type = Option<String>, format = Date)]
    pub deadline: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,

    #[validate(length(min = 1, message = "at_least_one_item"), nested)]
    pub items: Vec<CreateInquiryItemPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInquiryPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    #[schema(value_type = Option<String>, format = Date)]
    pub deadline: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,
    pub assigned_to_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignItemPayload {
    pub assigned_to_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryDecisionPayload {
    /// true = customer accepted the quote, false = rejected
    pub accepted: bool,
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttachmentPayload {
    #[validate(length(min = 1, message = "required"))]
    pub file_name: String,
    #[validate(url(message = "invalid_url"))]
    pub url: String,
    #[validate(range(min = 0, message = "invalid_size"))]
    pub size_bytes: i64,
    #[validate(length(min = 1, message = "required"))]
    pub mime_type: String,
}

// --- LIST FILTERS / PAGINATION ---

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InquiryListQuery {
    pub status: Option<InquiryStatus>,
    pub priority: Option<Priority>,
    /// ILIKE over title, description and inquiry number
    pub search: Option<String>,
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
