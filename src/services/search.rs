// src/services/search.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, InquiryRepository, UserRepository},
    models::auth::User,
    models::customer::Customer,
    models::inquiry::{Inquiry, InquiryItem},
    policy::{self, Action, Resource, Scope},
};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SearchEntity {
    Inquiries,
    Items,
    Customers,
    Users,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[schema(example = "steel")]
    pub query: String,
    /// Defaults to all entity kinds the caller may read.
    pub entities: Option<Vec<SearchEntity>>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub inquiries: Vec<Inquiry>,
    pub items: Vec<InquiryItem>,
    pub customers: Vec<Customer>,
    pub users: Vec<User>,
}

#[derive(Clone)]
pub struct SearchService {
    pool: sqlx::PgPool,
    inquiries: InquiryRepository,
    customers: CustomerRepository,
    users: UserRepository,
}

impl SearchService {
    pub fn new(
        pool: sqlx::PgPool,
        inquiries: InquiryRepository,
        customers: CustomerRepository,
        users: UserRepository,
    ) -> Self {
        Self {
            pool,
            inquiries,
            customers,
            users,
        }
    }

    /// Multi-entity ILIKE search. Each entity kind is silently skipped when
    /// the caller's role may not read it, so the result only reflects what
    /// the caller could have listed anyway.
    pub async fn search(
        &self,
        user: &User,
        request: &SearchRequest,
    ) -> Result<SearchResults, AppError> {
        let term = request.query.trim();
        let mut results = SearchResults::default();
        if term.is_empty() {
            return Ok(results);
        }
        let limit = request.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let wanted = |entity: SearchEntity| {
            request
                .entities
                .as_ref()
                .map(|list| list.contains(&entity))
                .unwrap_or(true)
        };

        if wanted(SearchEntity::Inquiries) {
            match policy::permission(user.role, Resource::Inquiry, Action::Read) {
                Scope::Any => {
                    results.inquiries =
                        self.inquiries.search(&self.pool, term, None, limit).await?;
                }
                Scope::Owned => {
                    results.inquiries = self
                        .inquiries
                        .search(&self.pool, term, Some(user.id), limit)
                        .await?;
                }
                Scope::Denied => {}
            }
        }

        if wanted(SearchEntity::Items)
            && policy::permission(user.role, Resource::InquiryItem, Action::Read) == Scope::Any
        {
            results.items = self.inquiries.search_items(&self.pool, term, limit).await?;
        }

        if wanted(SearchEntity::Customers)
            && policy::permission(user.role, Resource::Customer, Action::Read) == Scope::Any
        {
            results.customers = self.customers.search(&self.pool, term, limit).await?;
        }

        if wanted(SearchEntity::Users)
            && policy::permission(user.role, Resource::User, Action::Read) == Scope::Any
        {
            results.users = self.users.search(&self.pool, term, limit).await?;
        }

        Ok(results)
    }
}
