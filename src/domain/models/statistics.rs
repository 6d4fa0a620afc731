use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Clone, Default)]
pub struct StatisticsOverview {
    pub total_events: usize,
    pub active_events: usize,
    pub total_seniors: usize,
    pub total_guests: usize,
    pub total_attended_guests: usize,
    pub total_pending_guests: usize,
    pub overall_attendance_rate: f64,
    pub event_stats: Vec<EventStatistics>,
}

#[derive(Debug, Serialize, Clone)]
pub struct EventStatistics {
    pub event_id: String,
    pub event_name: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub is_active: bool,
    pub seniors_count: usize,
    pub guests_count: usize,
    pub attended_guests: usize,
    pub pending_guests: usize,
    pub attendance_rate: f64,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct AnalyticsDashboard {
    pub total_events: usize,
    pub active_events: usize,
    pub total_seniors: usize,
    pub total_guests: usize,
    pub total_attended: usize,
    pub attendance_rate: f64,
    pub selected_event_id: Option<String>,
    pub selected_event_name: Option<String>,
    pub hourly_attendance: Vec<HourlyAttendance>,
    pub events_comparison: Vec<EventComparison>,
    pub daily_attendance: Vec<DailyAttendance>,
    pub distribution: AttendanceDistribution,
    pub top_events: Vec<TopEvent>,
    pub recent_activity: Vec<RecentActivity>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HourlyAttendance {
    pub hour: String,
    pub count: usize,
    pub event_name: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct EventComparison {
    pub event_name: String,
    pub total_guests: usize,
    pub attended: usize,
    pub not_attended: usize,
    pub attendance_rate: f64,
    pub event_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DailyAttendance {
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct AttendanceDistribution {
    pub morning: usize,
    pub afternoon: usize,
    pub evening: usize,
    pub night: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct TopEvent {
    pub event_name: String,
    pub attendance_count: usize,
    pub attendance_rate: f64,
    pub event_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct RecentActivity {
    pub guest_name: String,
    pub senior_name: String,
    pub event_name: String,
    pub attendance_time: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct EventAttendanceCount {
    pub event_id: String,
    pub event_name: String,
    pub attended_count: i64,
}
