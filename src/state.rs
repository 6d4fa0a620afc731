use std::sync::Arc;
use crate::domain::ports::{
    AuditRepository, AuthRepository, EventRepository, GuestRepository, SeniorRepository, UserRepository,
};
use crate::domain::services::{
    attendance_hub::AttendanceHub, audit_service::AuditService, auth_service::AuthService,
    checkin_service::CheckinService,
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub event_repo: Arc<dyn EventRepository>,
    pub senior_repo: Arc<dyn SeniorRepository>,
    pub guest_repo: Arc<dyn GuestRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub audit_repo: Arc<dyn AuditRepository>,
    pub auth_service: Arc<AuthService>,
    pub audit_service: Arc<AuditService>,
    pub checkin_service: Arc<CheckinService>,
    pub hub: Arc<AttendanceHub>,
}

impl AppState {
    /// Wires services on top of a backend's repositories.
    pub fn assemble(
        config: &Config,
        event_repo: Arc<dyn EventRepository>,
        senior_repo: Arc<dyn SeniorRepository>,
        guest_repo: Arc<dyn GuestRepository>,
        user_repo: Arc<dyn UserRepository>,
        auth_repo: Arc<dyn AuthRepository>,
        audit_repo: Arc<dyn AuditRepository>,
    ) -> Self {
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));
        let audit_service = Arc::new(AuditService::new(audit_repo.clone()));
        let hub = Arc::new(AttendanceHub::new(config.dashboard_buffer));
        let checkin_service = Arc::new(CheckinService::new(
            guest_repo.clone(),
            senior_repo.clone(),
            event_repo.clone(),
            audit_service.clone(),
            hub.clone(),
        ));

        Self {
            config: config.clone(),
            event_repo,
            senior_repo,
            guest_repo,
            user_repo,
            auth_repo,
            audit_repo,
            auth_service,
            audit_service,
            checkin_service,
            hub,
        }
    }
}
