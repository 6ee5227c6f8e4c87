//! Presentation data computed from fetched courses and tasks.
//!
//! All functions are pure; views call them at render time with the current lists.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::models::{Course, Task};

/// Number of deadlines the dashboard lists.
pub const UPCOMING_LIMIT: usize = 3;
/// Events drawn inside one calendar cell before collapsing into "+N more".
pub const EVENTS_PER_CELL: usize = 2;
const GRID_CELLS: usize = 42;
const MS_PER_DAY: i64 = 86_400_000;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Assignment,
    Exam,
    Project,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Assignment, EventKind::Exam, EventKind::Project];

    /// Buckets a free-text tag; matching is by case-insensitive substring.
    pub fn for_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        if tag.contains("exam") || tag.contains("test") {
            EventKind::Exam
        } else if tag.contains("project") {
            EventKind::Project
        } else {
            EventKind::Assignment
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            EventKind::Assignment => "var(--color-accent3)",
            EventKind::Exam => "var(--color-accent2)",
            EventKind::Project => "var(--color-accent4)",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventKind::Assignment => "Assignments",
            EventKind::Exam => "Exams",
            EventKind::Project => "Projects",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            EventKind::Assignment => "assignment",
            EventKind::Exam => "exam",
            EventKind::Project => "project",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub kind: EventKind,
    pub color: &'static str,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub tag: String,
}

/// Incomplete, dated tasks as calendar entries, titled `"<code>: <title>"` when the
/// course has a code.
pub fn calendar_events(tasks: &[Task], courses: &[Course]) -> Vec<CalendarEvent> {
    let by_id: HashMap<&str, &Course> = courses.iter().map(|c| (c.id.as_str(), c)).collect();

    tasks
        .iter()
        .filter(|task| !task.completed)
        .filter_map(|task| {
            let date = task.due_date?;
            let course = by_id.get(task.course_id.as_str());
            let course_code = course
                .and_then(|c| c.code())
                .or_else(|| {
                    task.course
                        .as_ref()
                        .and_then(|c| c.course_code.as_deref())
                        .filter(|code| !code.trim().is_empty())
                })
                .map(str::to_string);
            let course_name = course
                .map(|c| c.name.clone())
                .or_else(|| task.course_name().map(str::to_string));
            let kind = EventKind::for_tag(&task.tag);
            let title = match &course_code {
                Some(code) => format!("{}: {}", code, task.title),
                None => task.title.clone(),
            };

            Some(CalendarEvent {
                id: task.id.clone(),
                title,
                date,
                kind,
                color: kind.color(),
                course_code,
                course_name,
                tag: task.tag.clone(),
            })
        })
        .collect()
}

pub fn events_on(events: &[CalendarEvent], date: NaiveDate) -> Vec<&CalendarEvent> {
    events.iter().filter(|e| e.date == date).collect()
}

/// Detail text shown when an event is selected.
pub fn describe_event(event: &CalendarEvent) -> String {
    let course = event
        .course_code
        .as_deref()
        .or(event.course_name.as_deref())
        .unwrap_or("Unknown Course");
    format!(
        "{}: {}\nCourse: {}\nDate: {}",
        event.kind.as_str().to_uppercase(),
        event.title,
        course,
        event.date.format("%Y-%m-%d")
    )
}

fn due_instant(due: NaiveDate) -> DateTime<Utc> {
    due.and_time(NaiveTime::MIN).and_utc()
}

fn ceil_days(ms: i64) -> i64 {
    (ms + MS_PER_DAY - 1).div_euclid(MS_PER_DAY)
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "day" } else { "days" }
}

/// Relative label for a due date. The due instant is the start of the day (UTC),
/// so a task due today reads "1 day overdue" from just after midnight and
/// "Due today" only at midnight itself.
pub fn format_due_date(due: Option<NaiveDate>, now: DateTime<Utc>) -> String {
    let Some(due) = due else {
        return "No due date".to_string();
    };

    let diff_ms = (due_instant(due) - now).num_milliseconds();
    if diff_ms < 0 {
        let overdue = ceil_days(-diff_ms);
        return format!("{} {} overdue", overdue, plural(overdue));
    }

    match ceil_days(diff_ms) {
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        n => format!("Due in {} days", n),
    }
}

/// The `limit` nearest incomplete tasks that have a due date, soonest first.
pub fn upcoming_deadlines(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut upcoming: Vec<&Task> = tasks
        .iter()
        .filter(|t| !t.completed && t.due_date.is_some())
        .collect();
    upcoming.sort_by_key(|t| t.due_date);
    upcoming.truncate(limit);
    upcoming
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub active: usize,
    pub exams: usize,
    pub projects: usize,
    pub completed: usize,
}

/// Exam and project counts cover open tasks only.
pub fn summarize(tasks: &[Task]) -> TaskSummary {
    tasks.iter().fold(TaskSummary::default(), |mut summary, task| {
        if task.completed {
            summary.completed += 1;
            return summary;
        }
        summary.active += 1;
        match EventKind::for_tag(&task.tag) {
            EventKind::Exam => summary.exams += 1,
            EventKind::Project => summary.projects += 1,
            EventKind::Assignment => {}
        }
        summary
    })
}

/// Tasks ordered by due date with undated ones last; ties keep their input order.
pub fn sort_by_due(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| (t.due_date.is_none(), t.due_date));
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn shift_month(month: NaiveDate, by: i32) -> NaiveDate {
    let index = month.year() * 12 + month.month0() as i32 + by;
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
        .unwrap_or(month)
}

pub fn month_title(month: NaiveDate) -> String {
    format!("{} {}", MONTH_NAMES[month.month0() as usize], month.year())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub is_today: bool,
    pub in_month: bool,
    /// First [`EVENTS_PER_CELL`] events of the day.
    pub events: Vec<CalendarEvent>,
    /// Events left out of `events`.
    pub more: usize,
}

/// Six Sunday-first weeks starting on or before the 1st of `month`.
pub fn month_grid(month: NaiveDate, today: NaiveDate, events: &[CalendarEvent]) -> Vec<DayCell> {
    let first = first_of_month(month);
    let lead = first.weekday().num_days_from_sunday() as i64;
    let start = first - Duration::days(lead);

    (0..GRID_CELLS as i64)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let day_events = events_on(events, date);
            DayCell {
                date,
                day: date.day(),
                is_today: date == today,
                in_month: date.month() == first.month() && date.year() == first.year(),
                more: day_events.len().saturating_sub(EVENTS_PER_CELL),
                events: day_events.into_iter().take(EVENTS_PER_CELL).cloned().collect(),
            }
        })
        .collect()
}

