// src/handlers/inquiries.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::audit::AuditLog,
    models::inquiry::{
        AssignItemPayload, Attachment, CreateAttachmentPayload, CreateInquiryPayload, Inquiry,
        InquiryDecisionPayload, InquiryDetail, InquiryItem, InquiryListQuery, Paginated,
        UpdateInquiryPayload,
    },
};

// Short TTL: list reads tolerate a couple of minutes of staleness.
const LIST_TTL: Duration = Duration::from_secs(120);

async fn invalidate_lists(app_state: &AppState) {
    app_state.cache.clear_pattern("inquiries:*").await;
}

// GET /api/inquiries
#[utoipa::path(
    get,
    path = "/api/inquiries",
    tag = "Inquiries",
    params(InquiryListQuery),
    responses((status = 200, description = "Paginated inquiry list", body = Paginated<Inquiry>)),
    security(("api_jwt" = []))
)]
pub async fn list_inquiries(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<InquiryListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // Cache-aside keyed by caller and filters; stale reads within the TTL
    // window are acceptable on this endpoint.
    let cache_key = format!("inquiries:list:{}:{:?}", user.id, query);
    if let Some(cached) = app_state.cache.get(&cache_key).await {
        return Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            cached,
        )
            .into_response());
    }

    let page = app_state
        .workflow
        .list(&user, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    if let Ok(body) = serde_json::to_string(&page) {
        app_state.cache.set(&cache_key, body, LIST_TTL).await;
    }

    Ok(Json(page).into_response())
}

// POST /api/inquiries
#[utoipa::path(
    post,
    path = "/api/inquiries",
    tag = "Inquiries",
    request_body = CreateInquiryPayload,
    responses(
        (status = 201, description = "Inquiry created with its items", body = InquiryDetail),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_inquiry(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateInquiryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n))?;

    let detail = app_state
        .workflow
        .create(&user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    invalidate_lists(&app_state).await;
    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/inquiries/{id}
#[utoipa::path(
    get,
    path = "/api/inquiries/{id}",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    responses(
        (status = 200, description = "Inquiry with items and attachments", body = InquiryDetail),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_inquiry(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .workflow
        .get(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;
    Ok(Json(detail))
}

// PUT /api/inquiries/{id}
#[utoipa::path(
    put,
    path = "/api/inquiries/{id}",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    request_body = UpdateInquiryPayload,
    responses((status = 200, description = "Inquiry updated", body = Inquiry)),
    security(("api_jwt" = []))
)]
pub async fn update_inquiry(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInquiryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n))?;

    let inquiry = app_state
        .workflow
        .update(&user, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    invalidate_lists(&app_state).await;
    Ok(Json(inquiry))
}

// DELETE /api/inquiries/{id}
#[utoipa::path(
    delete,
    path = "/api/inquiries/{id}",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    responses(
        (status = 204, description = "Inquiry deleted"),
        (status = 403, description = "Only the creator or an admin may delete")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_inquiry(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .workflow
        .delete(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    invalidate_lists(&app_state).await;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/inquiries/{id}/submit
#[utoipa::path(
    post,
    path = "/api/inquiries/{id}/submit",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    responses(
        (status = 200, description = "Inquiry submitted", body = Inquiry),
        (status = 400, description = "Inquiry is not a draft")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_inquiry(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let inquiry = app_state
        .workflow
        .submit(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    invalidate_lists(&app_state).await;
    Ok(Json(inquiry))
}

// POST /api/inquiries/{id}/items/{item_id}/assign
#[utoipa::path(
    post,
    path = "/api/inquiries/{id}/items/{item_id}/assign",
    tag = "Inquiries",
    params(
        ("id" = Uuid, Path, description = "Inquiry id"),
        ("item_id" = Uuid, Path, description = "Item id")
    ),
    request_body = AssignItemPayload,
    responses(
        (status = 200, description = "Item assigned", body = InquiryItem),
        (status = 400, description = "Assignee is not a costing user")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_item(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AssignItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .workflow
        .assign_item(&user, id, item_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    invalidate_lists(&app_state).await;
    Ok(Json(item))
}

// POST /api/inquiries/{id}/items/{item_id}/start
#[utoipa::path(
    post,
    path = "/api/inquiries/{id}/items/{item_id}/start",
    tag = "Inquiries",
    params(
        ("id" = Uuid, Path, description = "Inquiry id"),
        ("item_id" = Uuid, Path, description = "Item id")
    ),
    responses((status = 200, description = "Item in progress", body = InquiryItem)),
    security(("api_jwt" = []))
)]
pub async fn start_item(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .workflow
        .start_item(&user, id, item_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;
    Ok(Json(item))
}

// POST /api/inquiries/{id}/quote
#[utoipa::path(
    post,
    path = "/api/inquiries/{id}/quote",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    responses(
        (status = 200, description = "Inquiry quoted", body = Inquiry),
        (status = 400, description = "Not all items are approved")
    ),
    security(("api_jwt" = []))
)]
pub async fn quote_inquiry(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let inquiry = app_state
        .workflow
        .quote(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    invalidate_lists(&app_state).await;
    Ok(Json(inquiry))
}

// POST /api/inquiries/{id}/decision
#[utoipa::path(
    post,
    path = "/api/inquiries/{id}/decision",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    request_body = InquiryDecisionPayload,
    responses((status = 200, description = "Customer decision recorded", body = Inquiry)),
    security(("api_jwt" = []))
)]
pub async fn decide_inquiry(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InquiryDecisionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let inquiry = app_state
        .workflow
        .decide(&user, id, payload.accepted, payload.comments.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    invalidate_lists(&app_state).await;
    Ok(Json(inquiry))
}

// POST /api/inquiries/{id}/convert
#[utoipa::path(
    post,
    path = "/api/inquiries/{id}/convert",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    responses((status = 200, description = "Inquiry converted to an order", body = Inquiry)),
    security(("api_jwt" = []))
)]
pub async fn convert_inquiry(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let inquiry = app_state
        .workflow
        .convert(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    invalidate_lists(&app_state).await;
    Ok(Json(inquiry))
}

// GET /api/inquiries/{id}/audit
#[utoipa::path(
    get,
    path = "/api/inquiries/{id}/audit",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    responses((status = 200, description = "Audit trail, oldest first", body = [AuditLog])),
    security(("api_jwt" = []))
)]
pub async fn get_inquiry_audit(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let trail = app_state
        .workflow
        .audit_trail(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;
    Ok(Json(trail))
}

// POST /api/inquiries/{id}/attachments
#[utoipa::path(
    post,
    path = "/api/inquiries/{id}/attachments",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    request_body = CreateAttachmentPayload,
    responses((status = 201, description = "Attachment metadata stored", body = Attachment)),
    security(("api_jwt" = []))
)]
pub async fn add_attachment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateAttachmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n))?;

    let attachment = app_state
        .workflow
        .add_attachment(&user, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::CREATED, Json(attachment)))
}
