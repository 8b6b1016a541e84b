// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, sync::Arc, time::Duration};

use crate::{
    cache::Cache,
    db::{
        ApprovalRepository, AuditRepository, CostingRepository, CustomerRepository,
        InquiryRepository, NotificationRepository, UserRepository,
    },
    i18n::I18nStore,
    services::approval::ApprovalService,
    services::auth::AuthService,
    services::costing::CostingService,
    services::notifier::{LogEmailSender, Notifier},
    services::search::SearchService,
    services::workflow::InquiryWorkflowService,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub cache: Cache,
    pub i18n: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub workflow: InquiryWorkflowService,
    pub costing: CostingService,
    pub approvals: ApprovalService,
    pub search: SearchService,
    pub customers: CustomerRepository,
    pub notifications: NotificationRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let redis_url = env::var("REDIS_URL").ok();

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;
        tracing::info!("database connection established");

        let cache = Cache::connect(redis_url.as_deref()).await;
        let i18n = Arc::new(I18nStore::new());

        // --- dependency graph ---
        let users = UserRepository::new(db_pool.clone());
        let customers = CustomerRepository::new(db_pool.clone());
        let inquiries = InquiryRepository::new(db_pool.clone());
        let costs = CostingRepository::new(db_pool.clone());
        let approvals_repo = ApprovalRepository::new(db_pool.clone());
        let notifications = NotificationRepository::new(db_pool.clone());
        let audit = AuditRepository::new(db_pool.clone());

        let notifier = Notifier::new(
            notifications.clone(),
            Arc::new(LogEmailSender),
            i18n.clone(),
        );

        let auth_service = AuthService::new(users.clone(), jwt_secret);
        let workflow = InquiryWorkflowService::new(
            db_pool.clone(),
            inquiries.clone(),
            customers.clone(),
            users.clone(),
            audit.clone(),
            notifier.clone(),
        );
        let costing = CostingService::new(
            db_pool.clone(),
            costs.clone(),
            inquiries.clone(),
            users.clone(),
            approvals_repo.clone(),
            audit.clone(),
            notifier.clone(),
        );
        let approvals = ApprovalService::new(
            db_pool.clone(),
            approvals_repo,
            costs,
            inquiries.clone(),
            users.clone(),
            audit,
            notifier,
        );
        let search = SearchService::new(db_pool.clone(), inquiries, customers.clone(), users);

        Ok(Self {
            db_pool,
            cache,
            i18n,
            auth_service,
            workflow,
            costing,
            approvals,
            search,
            customers,
            notifications,
        })
    }
}
