pub mod approval;
pub mod auth;
pub mod costing;
pub mod notifier;
pub mod search;
pub mod workflow;
