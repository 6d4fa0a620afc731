pub mod attendance;
pub mod audit;
pub mod auth;
pub mod event;
pub mod guest;
pub mod senior;
pub mod statistics;
pub mod user;
