// src/handlers/customers.rs

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
    models::customer::{CreateCustomerPayload, Customer, CustomerListQuery},
    models::inquiry::Paginated,
    policy::{self, Action, Resource},
    services::workflow::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
};

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 403, description = "Caller may not create customers")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n))?;
    policy::authorize(user.role, Resource::Customer, Action::Create, true)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    let customer = app_state
        .customers
        .create(
            &app_state.db_pool,
            &payload.name,
            payload.contact_person.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.address.as_deref(),
            user.id,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    params(CustomerListQuery),
    responses((status = 200, description = "Active customers", body = Paginated<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<CustomerListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    policy::authorize(user.role, Resource::Customer, Action::Read, true)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let (items, total) = app_state
        .customers
        .list(query.search.as_deref(), page, per_page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok(Json(Paginated {
        items,
        total,
        page,
        per_page,
    }))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = Customer),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    policy::authorize(user.role, Resource::Customer, Action::Read, true)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    let customer = app_state
        .customers
        .find_by_id(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?
        .ok_or_else(|| AppError::NotFound("customer").to_api_error(&locale, &app_state.i18n))?;

    Ok(Json(customer))
}
