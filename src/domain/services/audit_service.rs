use std::sync::Arc;
use crate::domain::{
    models::{audit::AuditLog, user::Actor},
    ports::AuditRepository
};
use tracing::{error, info};

pub struct AuditService {
    repo: Arc<dyn AuditRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    /// Records one audit entry. A failing sink is logged, never surfaced:
    /// the audited change has already been persisted by the caller.
    pub async fn log(&self, action: &str, entity_name: &str, entity_id: &str, actor: &Actor, details: String) {
        let entry = AuditLog::new(action, entity_name, entity_id, &actor.username, details);

        match self.repo.record(&entry).await {
            Ok(()) => info!(action, entity = entity_name, entity_id, username = %actor.username, "Audit recorded"),
            Err(e) => error!("Failed to record audit entry {} {} {}: {:?}", action, entity_name, entity_id, e),
        }
    }
}
