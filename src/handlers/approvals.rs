// src/handlers/approvals.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::approval::{Approval, CreateApprovalPayload},
    models::inquiry::{PageQuery, Paginated},
    services::workflow::DEFAULT_PAGE_SIZE,
};

// POST /api/approvals
#[utoipa::path(
    post,
    path = "/api/approvals",
    tag = "Approvals",
    request_body = CreateApprovalPayload,
    responses(
        (status = 201, description = "Decision recorded", body = Approval),
        (status = 400, description = "Calculation already decided or item not costed"),
        (status = 403, description = "Caller may not approve cost calculations")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_approval(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateApprovalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let approval = app_state
        .approvals
        .decide(&user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    app_state.cache.clear_pattern("inquiries:*").await;
    Ok((StatusCode::CREATED, Json(approval)))
}

// GET /api/approvals
#[utoipa::path(
    get,
    path = "/api/approvals",
    tag = "Approvals",
    params(PageQuery),
    responses((status = 200, description = "Approvals visible to the caller", body = Paginated<Approval>)),
    security(("api_jwt" = []))
)]
pub async fn list_approvals(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .approvals
        .list(
            &user,
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;
    Ok(Json(page))
}
