// src/main.rs

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod cache;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod i18n;
mod middleware;
mod models;
mod policy;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let app_state = AppState::new()
        .await
        .expect("failed to initialize application state");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("failed to run database migrations");
    tracing::info!("database migrations applied");

    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let inquiry_routes = Router::new()
        .route(
            "/",
            post(handlers::inquiries::create_inquiry).get(handlers::inquiries::list_inquiries),
        )
        .route(
            "/{id}",
            get(handlers::inquiries::get_inquiry)
                .put(handlers::inquiries::update_inquiry)
                .delete(handlers::inquiries::delete_inquiry),
        )
        .route("/{id}/submit", post(handlers::inquiries::submit_inquiry))
        .route("/{id}/quote", post(handlers::inquiries::quote_inquiry))
        .route("/{id}/decision", post(handlers::inquiries::decide_inquiry))
        .route("/{id}/convert", post(handlers::inquiries::convert_inquiry))
        .route("/{id}/audit", get(handlers::inquiries::get_inquiry_audit))
        .route(
            "/{id}/attachments",
            post(handlers::inquiries::add_attachment),
        )
        .route(
            "/{id}/items/{item_id}/assign",
            post(handlers::inquiries::assign_item),
        )
        .route(
            "/{id}/items/{item_id}/start",
            post(handlers::inquiries::start_item),
        );

    let cost_routes = Router::new()
        .route(
            "/",
            post(handlers::costs::create_cost).get(handlers::costs::list_costs),
        )
        .route("/{id}", get(handlers::costs::get_cost));

    let approval_routes = Router::new().route(
        "/",
        post(handlers::approvals::create_approval).get(handlers::approvals::list_approvals),
    );

    let customer_routes = Router::new()
        .route(
            "/",
            post(handlers::customers::create_customer).get(handlers::customers::list_customers),
        )
        .route("/{id}", get(handlers::customers::get_customer));

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list_notifications))
        .route(
            "/{id}/read",
            post(handlers::notifications::mark_notification_read),
        );

    let search_routes = Router::new().route("/", post(handlers::search::search));

    // Everything except /api/auth and /api/health requires a valid token
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/inquiries", inquiry_routes)
        .nest("/api/costs", cost_routes)
        .nest("/api/approvals", approval_routes)
        .nest("/api/customers", customer_routes)
        .nest("/api/notifications", notification_routes)
        .nest("/api/search", search_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("failed to bind TCP listener");
    tracing::info!(
        "listening on {}",
        listener.local_addr().expect("listener has no local addr")
    );
    axum::serve(listener, app).await.expect("server error");
}
