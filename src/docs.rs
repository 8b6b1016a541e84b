// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Inquiries ---
        handlers::inquiries::list_inquiries,
        handlers::inquiries::create_inquiry,
        handlers::inquiries::get_inquiry,
        handlers::inquiries::update_inquiry,
        handlers::inquiries::delete_inquiry,
        handlers::inquiries::submit_inquiry,
        handlers::inquiries::assign_item,
        handlers::inquiries::start_item,
        handlers::inquiries::quote_inquiry,
        handlers::inquiries::decide_inquiry,
        handlers::inquiries::convert_inquiry,
        handlers::inquiries::get_inquiry_audit,
        handlers::inquiries::add_attachment,

        // --- Costing ---
        handlers::costs::create_cost,
        handlers::costs::list_costs,
        handlers::costs::get_cost,

        // --- Approvals ---
        handlers::approvals::create_approval,
        handlers::approvals::list_approvals,

        // --- Customers ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_notification_read,

        // --- Search ---
        handlers::search::search,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Inquiries ---
            models::inquiry::Priority,
            models::inquiry::InquiryStatus,
            models::inquiry::ItemStatus,
            models::inquiry::Inquiry,
            models::inquiry::InquiryItem,
            models::inquiry::Attachment,
            models::inquiry::InquiryDetail,
            models::inquiry::CreateInquiryPayload,
            models::inquiry::CreateInquiryItemPayload,
            models::inquiry::UpdateInquiryPayload,
            models::inquiry::AssignItemPayload,
            models::inquiry::InquiryDecisionPayload,
            models::inquiry::CreateAttachmentPayload,

            // --- Costing ---
            models::costing::CostCalculation,
            models::costing::CreateCostCalculationPayload,

            // --- Approvals ---
            models::approval::ApprovalStatus,
            models::approval::Approval,
            models::approval::CreateApprovalPayload,

            // --- Customers ---
            models::customer::Customer,
            models::customer::CreateCustomerPayload,

            // --- Notifications ---
            models::notification::Notification,

            // --- Audit ---
            models::audit::AuditLog,

            // --- Search ---
            services::search::SearchEntity,
            services::search::SearchRequest,
            services::search::SearchResults,
        )
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Inquiries", description = "Inquiry lifecycle: draft, submission, assignment, quoting"),
        (name = "Costing", description = "Cost calculations per inquiry item"),
        (name = "Approvals", description = "Manager decisions on cost calculations"),
        (name = "Customers", description = "Customer master data"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Search", description = "Cross-entity search")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
