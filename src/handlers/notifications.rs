// src/handlers/notifications.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::notification::Notification,
};

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses((status = 200, description = "Latest notifications for the caller", body = [Notification])),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = app_state
        .notifications
        .list_for_user(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;
    Ok(Json(notifications))
}

// POST /api/notifications/{id}/read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 404, description = "Not found or not addressed to the caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = app_state
        .notifications
        .mark_read(id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?
        .ok_or_else(|| AppError::NotFound("notification").to_api_error(&locale, &app_state.i18n))?;
    Ok(Json(notification))
}
