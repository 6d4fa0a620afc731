use serde::{Deserialize, Serialize};
use std::fmt;
use super::guest::Guest;

pub const TIME_LABEL_JUST_NOW: &str = "Just now";
pub const TIME_LABEL_UNMARKED: &str = "UNMARKED";

/// Audience of a dashboard broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupKey {
    Event { id: String },
    Global,
}

impl GroupKey {
    pub fn event(id: impl Into<String>) -> Self {
        GroupKey::Event { id: id.into() }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Event { id } => write!(f, "event:{}", id),
            GroupKey::Global => f.write_str("global"),
        }
    }
}

/// Payload fanned out after every persisted mark/unmark.
///
/// `time_label` is a display hint ("Just now" or "UNMARKED"), not a closed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceUpdate {
    pub attended_count: i64,
    pub event_id: String,
    pub event_name: String,
    pub guest_id: String,
    pub guest_name: String,
    pub delta: i32,
    pub time_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckinAction {
    Mark,
    Unmark,
    AutoMark,
}

impl CheckinAction {
    pub fn audit_action(&self) -> &'static str {
        match self {
            CheckinAction::Mark => "Mark",
            CheckinAction::Unmark => "Unmark",
            CheckinAction::AutoMark => "AutoMark",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AutoMarkOutcome {
    Marked { guest: Guest },
    AlreadyAttended { guest: Guest },
}

impl AutoMarkOutcome {
    pub fn guest(&self) -> &Guest {
        match self {
            AutoMarkOutcome::Marked { guest } | AutoMarkOutcome::AlreadyAttended { guest } => guest,
        }
    }
}
