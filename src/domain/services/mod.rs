pub mod attendance_hub;
pub mod audit_service;
pub mod auth_service;
pub mod checkin_service;
pub mod statistics;
pub mod tokens;
