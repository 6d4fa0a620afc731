//! Guest check-in state machine.
//!
//! A guest is either pending (`is_attended = false`, no time) or attended
//! (`is_attended = true`, time of the latest mark). Mark and AutoMark are
//! gated on the owning event being active; Unmark is not. Seniors without an
//! event skip the gate entirely.
//!
//! Every accepted transition writes the store first, then audits, then
//! recomputes the event's attended count and publishes it. No application
//! lock is taken: concurrent scans of one guest both write the same logical
//! state, and each broadcast carries a count read after its own write.

use std::sync::Arc;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::domain::{
    models::{
        attendance::{AttendanceUpdate, AutoMarkOutcome, CheckinAction, TIME_LABEL_JUST_NOW, TIME_LABEL_UNMARKED},
        event::Event,
        guest::Guest,
        senior::Senior,
        user::Actor,
    },
    ports::{EventRepository, GuestRepository, SeniorRepository},
    services::{attendance_hub::AttendanceHub, audit_service::AuditService},
};
use crate::error::AppError;

struct GuestScope {
    guest: Guest,
    senior: Senior,
    event: Option<Event>,
}

pub struct CheckinService {
    guest_repo: Arc<dyn GuestRepository>,
    senior_repo: Arc<dyn SeniorRepository>,
    event_repo: Arc<dyn EventRepository>,
    audit: Arc<AuditService>,
    hub: Arc<AttendanceHub>,
}

impl CheckinService {
    pub fn new(
        guest_repo: Arc<dyn GuestRepository>,
        senior_repo: Arc<dyn SeniorRepository>,
        event_repo: Arc<dyn EventRepository>,
        audit: Arc<AuditService>,
        hub: Arc<AttendanceHub>,
    ) -> Self {
        Self { guest_repo, senior_repo, event_repo, audit, hub }
    }

    /// Staff-initiated check-in. Re-marking an attended guest rewrites the
    /// time and re-broadcasts the current count.
    pub async fn mark(&self, guest_id: &str, actor: &Actor) -> Result<Guest, AppError> {
        actor.ensure_staff()?;
        let scope = self.load(guest_id).await?;
        ensure_checkin_open(scope.event.as_ref())?;
        self.apply(scope, CheckinAction::Mark, actor).await
    }

    /// Reverts a check-in. Allowed after the event has been closed.
    pub async fn unmark(&self, guest_id: &str, actor: &Actor) -> Result<Guest, AppError> {
        actor.ensure_staff()?;
        let scope = self.load(guest_id).await?;
        self.apply(scope, CheckinAction::Unmark, actor).await
    }

    /// Check-in triggered by opening a ticket target. The caller has already
    /// proven possession of the ticket, so no role is required. An attended
    /// guest is left untouched: no write, no audit entry, no broadcast.
    pub async fn auto_mark(&self, guest_id: &str, actor: &Actor) -> Result<AutoMarkOutcome, AppError> {
        let scope = self.load(guest_id).await?;

        if scope.guest.is_attended {
            debug!(guest_id = %guest_id, "AutoMark skipped, guest already attended");
            return Ok(AutoMarkOutcome::AlreadyAttended { guest: scope.guest });
        }

        ensure_checkin_open(scope.event.as_ref())?;
        let guest = self.apply(scope, CheckinAction::AutoMark, actor).await?;
        Ok(AutoMarkOutcome::Marked { guest })
    }

    async fn load(&self, guest_id: &str) -> Result<GuestScope, AppError> {
        let guest = self.guest_repo.find_by_id(guest_id).await?
            .ok_or(AppError::NotFound("Guest not found".into()))?;

        let senior = self.senior_repo.find_by_id(&guest.senior_id).await?
            .ok_or(AppError::NotFound("Senior not found".into()))?;

        let event = match senior.event_id.as_deref() {
            Some(event_id) => Some(
                self.event_repo.find_by_id(event_id).await?
                    .ok_or(AppError::NotFound("Event not found".into()))?
            ),
            None => None,
        };

        Ok(GuestScope { guest, senior, event })
    }

    async fn apply(&self, scope: GuestScope, action: CheckinAction, actor: &Actor) -> Result<Guest, AppError> {
        let attended = action != CheckinAction::Unmark;
        let attendance_time = attended.then(Utc::now);

        let guest = self.guest_repo.set_attendance(&scope.guest.id, attended, attendance_time).await?
            .ok_or(AppError::NotFound("Guest not found".into()))?;

        info!(
            guest_id = %guest.id,
            action = action.audit_action(),
            username = %actor.username,
            "Attendance updated"
        );

        let verb = if attended { "Marked" } else { "Unmarked" };
        self.audit.log(
            action.audit_action(),
            "Guest",
            &guest.id,
            actor,
            format!("{} attendance for guest '{}' (Senior: '{}')", verb, guest.name, scope.senior.name),
        ).await;

        match scope.event {
            Some(event) => self.broadcast(&event, &guest, action).await,
            None => debug!(guest_id = %guest.id, "Senior has no event, nothing to broadcast"),
        }

        Ok(guest)
    }

    async fn broadcast(&self, event: &Event, guest: &Guest, action: CheckinAction) {
        let attended_count = match self.guest_repo.count_attended_by_event(&event.id).await {
            Ok(count) => count,
            Err(e) => {
                error!("Failed to count attendance for event {}: {:?}", event.id, e);
                return;
            }
        };

        let (delta, time_label) = match action {
            CheckinAction::Unmark => (-1, TIME_LABEL_UNMARKED),
            CheckinAction::Mark | CheckinAction::AutoMark => (1, TIME_LABEL_JUST_NOW),
        };

        let update = AttendanceUpdate {
            attended_count,
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            guest_id: guest.id.clone(),
            guest_name: guest.name.clone(),
            delta,
            time_label: time_label.to_string(),
        };

        self.hub.publish(&event.id, update).await;
    }
}

fn ensure_checkin_open(event: Option<&Event>) -> Result<(), AppError> {
    match event {
        Some(event) if !event.is_active => {
            warn!(event_id = %event.id, "Check-in attempted for inactive event");
            Err(AppError::EventInactive(format!(
                "Event '{}' is not active. Check-in is closed.",
                event.name
            )))
        }
        _ => Ok(()),
    }
}
