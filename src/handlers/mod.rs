pub mod approvals;
pub mod auth;
pub mod costs;
pub mod customers;
pub mod inquiries;
pub mod notifications;
pub mod search;
