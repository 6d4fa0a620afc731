pub mod attendance;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod event;
pub mod guest;
pub mod health;
pub mod public;
pub mod senior;
pub mod statistics;
pub mod users;
