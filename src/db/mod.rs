pub mod approval_repo;
pub mod audit_repo;
pub mod costing_repo;
pub mod customer_repo;
pub mod inquiry_repo;
pub mod notification_repo;
pub mod user_repo;

pub use approval_repo::ApprovalRepository;
pub use audit_repo::AuditRepository;
pub use costing_repo::CostingRepository;
pub use customer_repo::CustomerRepository;
pub use inquiry_repo::InquiryRepository;
pub use notification_repo::NotificationRepository;
pub use user_repo::UserRepository;
