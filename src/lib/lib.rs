pub mod api;
pub mod calendar;
pub mod models;
pub mod notify;
pub mod session;
