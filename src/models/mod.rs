pub mod approval;
pub mod audit;
pub mod auth;
pub mod costing;
pub mod customer;
pub mod inquiry;
pub mod notification;
