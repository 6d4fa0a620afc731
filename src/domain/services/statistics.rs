use std::collections::{BTreeMap, HashMap, HashSet};
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};

use crate::domain::models::{
    event::Event,
    guest::GuestWithContext,
    senior::Senior,
    statistics::{
        AnalyticsDashboard, AttendanceDistribution, DailyAttendance, EventComparison, EventStatistics,
        HourlyAttendance, RecentActivity, StatisticsOverview, TopEvent,
    },
};

const COMPARISON_EVENTS: usize = 10;
const TOP_EVENTS: usize = 5;
const RECENT_ACTIVITY: usize = 20;
const DAILY_WINDOW_DAYS: i64 = 30;

/// Percentage with one decimal; zero when there is nothing to divide by.
pub fn attendance_rate(attended: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (attended as f64 / total as f64 * 1000.0).round() / 10.0
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;

    if elapsed < Duration::minutes(1) {
        "Just now".to_string()
    } else if elapsed < Duration::hours(1) {
        format!("{} min ago", elapsed.num_minutes())
    } else if elapsed < Duration::hours(24) {
        format!("{} hr ago", elapsed.num_hours())
    } else if elapsed < Duration::days(7) {
        format!("{} days ago", elapsed.num_days())
    } else {
        then.format("%b %d, %Y").to_string()
    }
}

fn guests_by_event(guests: &[GuestWithContext]) -> HashMap<&str, Vec<&GuestWithContext>> {
    let mut map: HashMap<&str, Vec<&GuestWithContext>> = HashMap::new();
    for guest in guests {
        if let Some(event_id) = guest.event_id.as_deref() {
            map.entry(event_id).or_default().push(guest);
        }
    }
    map
}

fn seniors_by_event(seniors: &[Senior]) -> HashMap<&str, usize> {
    let mut map = HashMap::new();
    for senior in seniors {
        if let Some(event_id) = senior.event_id.as_deref() {
            *map.entry(event_id).or_insert(0) += 1;
        }
    }
    map
}

pub fn build_overview(events: &[Event], seniors: &[Senior], guests: &[GuestWithContext]) -> StatisticsOverview {
    let guest_map = guests_by_event(guests);
    let senior_map = seniors_by_event(seniors);

    let mut ordered: Vec<&Event> = events.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));

    let event_stats: Vec<EventStatistics> = ordered.into_iter().map(|event| {
        let event_guests = guest_map.get(event.id.as_str()).map_or(&[][..], Vec::as_slice);
        let attended = event_guests.iter().filter(|g| g.is_attended).count();

        EventStatistics {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            event_date: event.date,
            location: event.location.clone(),
            is_active: event.is_active,
            seniors_count: senior_map.get(event.id.as_str()).copied().unwrap_or(0),
            guests_count: event_guests.len(),
            attended_guests: attended,
            pending_guests: event_guests.len() - attended,
            attendance_rate: attendance_rate(attended, event_guests.len()),
        }
    }).collect();

    let total_seniors = event_stats.iter().map(|s| s.seniors_count).sum();
    let total_guests: usize = event_stats.iter().map(|s| s.guests_count).sum();
    let total_attended: usize = event_stats.iter().map(|s| s.attended_guests).sum();

    StatisticsOverview {
        total_events: events.len(),
        active_events: events.iter().filter(|e| e.is_active).count(),
        total_seniors,
        total_guests,
        total_attended_guests: total_attended,
        total_pending_guests: total_guests - total_attended,
        overall_attendance_rate: attendance_rate(total_attended, total_guests),
        event_stats,
    }
}

pub fn build_dashboard(
    events: &[Event],
    seniors: &[Senior],
    guests: &[GuestWithContext],
    scope: Option<&str>,
    now: DateTime<Utc>,
) -> AnalyticsDashboard {
    let scope_events: Vec<&Event> = events.iter()
        .filter(|e| scope.map_or(true, |id| e.id == id))
        .collect();
    let scope_ids: HashSet<&str> = scope_events.iter().map(|e| e.id.as_str()).collect();

    let in_scope = |event_id: &Option<String>| event_id.as_deref().is_some_and(|id| scope_ids.contains(id));

    let total_seniors = seniors.iter().filter(|s| in_scope(&s.event_id)).count();
    let scope_guests: Vec<&GuestWithContext> = guests.iter().filter(|g| in_scope(&g.event_id)).collect();
    let total_attended = scope_guests.iter().filter(|g| g.is_attended).count();

    let selected_event = scope.and_then(|id| events.iter().find(|e| e.id == id));

    let mut attended: Vec<(&GuestWithContext, DateTime<Utc>)> = scope_guests.iter()
        .filter(|g| g.is_attended)
        .filter_map(|g| g.attendance_time.map(|t| (*g, t)))
        .collect();

    let hourly_label = match (scope, selected_event) {
        (Some(_), Some(event)) => event.name.clone(),
        (Some(_), None) => String::new(),
        (None, _) => "All Events".to_string(),
    };
    let mut hours: BTreeMap<u32, usize> = BTreeMap::new();
    for (_, time) in &attended {
        *hours.entry(time.hour()).or_insert(0) += 1;
    }
    let hourly_attendance = hours.into_iter()
        .map(|(hour, count)| HourlyAttendance {
            hour: format!("{:02}:00", hour),
            count,
            event_name: hourly_label.clone(),
        })
        .collect();

    let window_start = now - Duration::days(DAILY_WINDOW_DAYS);
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (_, time) in attended.iter().filter(|(_, t)| *t >= window_start) {
        *days.entry(time.date_naive()).or_insert(0) += 1;
    }
    let daily_attendance = days.into_iter()
        .map(|(date, count)| DailyAttendance { date: date.format("%b %d").to_string(), count })
        .collect();

    let mut distribution = AttendanceDistribution::default();
    for (_, time) in &attended {
        match time.hour() {
            6..=11 => distribution.morning += 1,
            12..=17 => distribution.afternoon += 1,
            18..=23 => distribution.evening += 1,
            _ => distribution.night += 1,
        }
    }

    // Comparison and top events always use every event for context
    let guest_map = guests_by_event(guests);
    let mut by_date: Vec<&Event> = events.iter().collect();
    by_date.sort_by(|a, b| b.date.cmp(&a.date));
    let events_comparison: Vec<EventComparison> = by_date.into_iter()
        .take(COMPARISON_EVENTS)
        .map(|event| {
            let event_guests = guest_map.get(event.id.as_str()).map_or(&[][..], Vec::as_slice);
            let attended_count = event_guests.iter().filter(|g| g.is_attended).count();
            EventComparison {
                event_name: event.name.clone(),
                total_guests: event_guests.len(),
                attended: attended_count,
                not_attended: event_guests.len() - attended_count,
                attendance_rate: attendance_rate(attended_count, event_guests.len()),
                event_date: event.date,
            }
        })
        .collect();

    let mut ranked = events_comparison.clone();
    ranked.sort_by(|a, b| b.attended.cmp(&a.attended));
    let top_events = ranked.into_iter()
        .take(TOP_EVENTS)
        .map(|e| TopEvent {
            event_name: e.event_name,
            attendance_count: e.attended,
            attendance_rate: e.attendance_rate,
            event_date: e.event_date,
        })
        .collect();

    attended.sort_by(|a, b| b.1.cmp(&a.1));
    let recent_activity = attended.iter()
        .take(RECENT_ACTIVITY)
        .map(|(g, time)| RecentActivity {
            guest_name: g.name.clone(),
            senior_name: g.senior_name.clone(),
            event_name: g.event_name.clone().unwrap_or_else(|| "Unknown".to_string()),
            attendance_time: *time,
            time_ago: time_ago(*time, now),
        })
        .collect();

    AnalyticsDashboard {
        total_events: scope_events.len(),
        active_events: scope_events.iter().filter(|e| e.is_active).count(),
        total_seniors,
        total_guests: scope_guests.len(),
        total_attended,
        attendance_rate: attendance_rate(total_attended, scope_guests.len()),
        selected_event_id: selected_event.map(|e| e.id.clone()),
        selected_event_name: selected_event.map(|e| e.name.clone()),
        hourly_attendance,
        events_comparison,
        daily_attendance,
        distribution,
        top_events,
        recent_activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, name: &str, days_ago: i64, active: bool, now: DateTime<Utc>) -> Event {
        let mut e = Event::new(name.into(), now - Duration::days(days_ago), "Hall".into(), active);
        e.id = id.into();
        e
    }

    fn senior(id: &str, event_id: Option<&str>) -> Senior {
        let mut s = Senior::new(event_id.map(String::from), format!("Senior {}", id), None, 3);
        s.id = id.into();
        s
    }

    fn guest(name: &str, senior_id: &str, event: Option<(&str, &str)>, attended_at: Option<DateTime<Utc>>) -> GuestWithContext {
        GuestWithContext {
            id: format!("g-{}", name),
            name: name.into(),
            phone_number: None,
            is_attended: attended_at.is_some(),
            attendance_time: attended_at,
            senior_id: senior_id.into(),
            senior_name: format!("Senior {}", senior_id),
            senior_phone_number: None,
            event_id: event.map(|(id, _)| id.to_string()),
            event_name: event.map(|(_, name)| name.to_string()),
        }
    }

    #[test]
    fn test_attendance_rate_rounds_to_one_decimal() {
        assert_eq!(attendance_rate(0, 0), 0.0);
        assert_eq!(attendance_rate(1, 3), 33.3);
        assert_eq!(attendance_rate(2, 3), 66.7);
        assert_eq!(attendance_rate(4, 4), 100.0);
    }

    #[test]
    fn test_time_ago_labels() {
        let now = Utc.with_ymd_and_hms(2025, 12, 20, 18, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(20), now), "Just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5 min ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3 hr ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2 days ago");
        assert_eq!(time_ago(now - Duration::days(30), now), "Nov 20, 2025");
    }

    #[test]
    fn test_overview_counts_only_event_guests() {
        let now = Utc::now();
        let events = vec![event("e1", "Gala", 1, true, now), event("e2", "Old", 40, false, now)];
        let seniors = vec![senior("s1", Some("e1")), senior("s2", Some("e2")), senior("s3", None)];
        let guests = vec![
            guest("a", "s1", Some(("e1", "Gala")), Some(now)),
            guest("b", "s1", Some(("e1", "Gala")), None),
            guest("c", "s2", Some(("e2", "Old")), None),
            guest("d", "s3", None, Some(now)),
        ];

        let overview = build_overview(&events, &seniors, &guests);

        assert_eq!(overview.total_events, 2);
        assert_eq!(overview.active_events, 1);
        assert_eq!(overview.total_seniors, 2);
        assert_eq!(overview.total_guests, 3);
        assert_eq!(overview.total_attended_guests, 1);
        assert_eq!(overview.total_pending_guests, 2);
        assert_eq!(overview.overall_attendance_rate, 33.3);
        assert_eq!(overview.event_stats[0].event_id, "e1");
        assert_eq!(overview.event_stats[0].attendance_rate, 50.0);
    }

    #[test]
    fn test_dashboard_scoped_to_event() {
        let now = Utc.with_ymd_and_hms(2025, 12, 20, 20, 0, 0).unwrap();
        let events = vec![event("e1", "Gala", 0, true, now), event("e2", "Picnic", 3, true, now)];
        let seniors = vec![senior("s1", Some("e1")), senior("s2", Some("e2"))];
        let guests = vec![
            guest("a", "s1", Some(("e1", "Gala")), Some(now - Duration::minutes(10))),
            guest("b", "s1", Some(("e1", "Gala")), Some(now - Duration::hours(11))),
            guest("c", "s2", Some(("e2", "Picnic")), Some(now - Duration::days(3))),
            guest("d", "s2", Some(("e2", "Picnic")), Some(now - Duration::days(3))),
        ];

        let dash = build_dashboard(&events, &seniors, &guests, Some("e1"), now);

        assert_eq!(dash.total_events, 1);
        assert_eq!(dash.total_guests, 2);
        assert_eq!(dash.total_attended, 2);
        assert_eq!(dash.selected_event_name.as_deref(), Some("Gala"));
        assert_eq!(dash.hourly_attendance, vec![
            HourlyAttendance { hour: "09:00".into(), count: 1, event_name: "Gala".into() },
            HourlyAttendance { hour: "19:00".into(), count: 1, event_name: "Gala".into() },
        ]);
        assert_eq!(dash.distribution, AttendanceDistribution { morning: 1, afternoon: 0, evening: 1, night: 0 });
        assert_eq!(dash.recent_activity[0].guest_name, "a");
        assert_eq!(dash.recent_activity[0].time_ago, "10 min ago");

        // Comparison ignores the scope
        assert_eq!(dash.events_comparison.len(), 2);
        assert_eq!(dash.top_events[0].attendance_count, 2);
    }

    #[test]
    fn test_dashboard_daily_window_excludes_old_checkins() {
        let now = Utc.with_ymd_and_hms(2025, 12, 20, 12, 0, 0).unwrap();
        let events = vec![event("e1", "Gala", 0, true, now)];
        let seniors = vec![senior("s1", Some("e1"))];
        let guests = vec![
            guest("a", "s1", Some(("e1", "Gala")), Some(now - Duration::days(45))),
            guest("b", "s1", Some(("e1", "Gala")), Some(now - Duration::days(1))),
        ];

        let dash = build_dashboard(&events, &seniors, &guests, None, now);

        assert_eq!(dash.daily_attendance, vec![DailyAttendance { date: "Dec 19".into(), count: 1 }]);
        assert_eq!(dash.hourly_attendance[0].event_name, "All Events");
    }
}
