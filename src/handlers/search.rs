// src/handlers/search.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    services::search::{SearchRequest, SearchResults},
};

// POST /api/search
#[utoipa::path(
    post,
    path = "/api/search",
    tag = "Search",
    request_body = SearchRequest,
    responses((status = 200, description = "Matches across the entities the caller may read", body = SearchResults)),
    security(("api_jwt" = []))
)]
pub async fn search(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let results = app_state
        .search
        .search(&user, &request)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;
    Ok(Json(results))
}
