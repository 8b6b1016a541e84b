// src/handlers/costs.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::costing::{CostCalculation, CreateCostCalculationPayload},
    models::inquiry::{PageQuery, Paginated},
    services::workflow::DEFAULT_PAGE_SIZE,
};

// POST /api/costs
#[utoipa::path(
    post,
    path = "/api/costs",
    tag = "Costing",
    request_body = CreateCostCalculationPayload,
    responses(
        (status = 201, description = "Cost calculation recorded", body = CostCalculation),
        (status = 400, description = "Negative amount, duplicate calculation or wrong item state"),
        (status = 403, description = "Item is not assigned to the caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_cost(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateCostCalculationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n))?;

    let calculation = app_state
        .costing
        .create(&user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    app_state.cache.clear_pattern("inquiries:*").await;
    Ok((StatusCode::CREATED, Json(calculation)))
}

// GET /api/costs
#[utoipa::path(
    get,
    path = "/api/costs",
    tag = "Costing",
    params(PageQuery),
    responses((status = 200, description = "Cost calculations visible to the caller", body = Paginated<CostCalculation>)),
    security(("api_jwt" = []))
)]
pub async fn list_costs(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .costing
        .list(
            &user,
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;
    Ok(Json(page))
}

// GET /api/costs/{id}
#[utoipa::path(
    get,
    path = "/api/costs/{id}",
    tag = "Costing",
    params(("id" = Uuid, Path, description = "Cost calculation id")),
    responses(
        (status = 200, description = "Cost calculation", body = CostCalculation),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_cost(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let calculation = app_state
        .costing
        .find(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;
    Ok(Json(calculation))
}
