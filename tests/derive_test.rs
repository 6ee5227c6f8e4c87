use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use termtracker::models::{Course, Task, TaskCourse};
use termtracker::views::derive::{
    EventKind, calendar_events, describe_event, format_due_date, month_grid, month_title,
    shift_month, summarize, upcoming_deadlines,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn task(id: &str, tag: &str, due: Option<NaiveDate>, completed: bool) -> Task {
    Task {
        id: id.to_string(),
        course_id: "c1".to_string(),
        title: format!("Task {}", id),
        tag: tag.to_string(),
        due_date: due,
        completed,
        course: None,
    }
}

fn course(id: &str, name: &str, code: Option<&str>) -> Course {
    Course {
        id: id.to_string(),
        name: name.to_string(),
        course_code: code.map(str::to_string),
        professor: None,
        semester: None,
        notes: None,
        created_at: None,
    }
}

#[test]
fn overdue_counts_started_days() {
    let due = Some(day(2025, 9, 1));
    assert_eq!(format_due_date(due, at(2025, 9, 1, 0, 1)), "1 day overdue");
    assert_eq!(format_due_date(due, at(2025, 9, 2, 0, 0)), "1 day overdue");
    assert_eq!(format_due_date(due, at(2025, 9, 2, 6, 0)), "2 days overdue");
    assert_eq!(format_due_date(due, at(2025, 9, 11, 12, 0)), "11 days overdue");
}

#[test]
fn future_due_dates_round_up() {
    let due = Some(day(2025, 9, 10));
    assert_eq!(format_due_date(due, at(2025, 9, 10, 0, 0)), "Due today");
    assert_eq!(format_due_date(due, at(2025, 9, 9, 8, 0)), "Due tomorrow");
    assert_eq!(format_due_date(due, at(2025, 9, 9, 0, 0)), "Due tomorrow");
    assert_eq!(format_due_date(due, at(2025, 9, 8, 23, 0)), "Due in 2 days");
    assert_eq!(format_due_date(due, at(2025, 9, 1, 12, 0)), "Due in 9 days");
    assert_eq!(format_due_date(None, at(2025, 9, 1, 12, 0)), "No due date");
}

#[test]
fn tags_bucket_case_insensitively() {
    assert_eq!(EventKind::for_tag("Midterm Exam"), EventKind::Exam);
    assert_eq!(EventKind::for_tag("Final Exam"), EventKind::Exam);
    assert_eq!(EventKind::for_tag("TEST"), EventKind::Exam);
    assert_eq!(EventKind::for_tag("final project"), EventKind::Project);
    assert_eq!(EventKind::for_tag("Final Project"), EventKind::Project);
    assert_eq!(EventKind::for_tag("Midterm"), EventKind::Assignment);
    assert_eq!(EventKind::for_tag("Reading"), EventKind::Assignment);
    assert_eq!(EventKind::for_tag(""), EventKind::Assignment);
    assert_ne!(EventKind::Exam.color(), EventKind::Assignment.color());
}

#[test]
fn upcoming_deadlines_takes_three_open_dated_tasks() {
    let tasks = vec![
        task("late", "Lab", Some(day(2025, 10, 30)), false),
        task("done", "Quiz", Some(day(2025, 9, 1)), true),
        task("undated", "Reading", None, false),
        task("second", "Test", Some(day(2025, 9, 12)), false),
        task("first", "Homework", Some(day(2025, 9, 5)), false),
        task("third", "Lab", Some(day(2025, 9, 20)), false),
    ];

    let upcoming: Vec<&str> = upcoming_deadlines(&tasks, 3)
        .into_iter()
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(upcoming, vec!["first", "second", "third"]);

    assert!(upcoming_deadlines(&tasks[..3], 3).len() == 1);
    assert!(upcoming_deadlines(&[], 3).is_empty());
}

#[test]
fn summary_counts_open_exams_and_projects() {
    let tasks = vec![
        task("a", "Assignment", Some(day(2025, 9, 5)), false),
        task("b", "Final Exam", Some(day(2025, 12, 5)), false),
        task("c", "Test", None, true),
        task("d", "Group Project", None, false),
        task("e", "Quiz", None, true),
    ];

    let summary = summarize(&tasks);
    assert_eq!(summary.active, 3);
    assert_eq!(summary.exams, 1);
    assert_eq!(summary.projects, 1);
    assert_eq!(summary.completed, 2);
}

#[test]
fn calendar_events_skip_done_and_undated_and_prefix_codes() {
    let courses = vec![course("c1", "Intro to CS", Some("CS101")), course("c2", "Poetry", None)];
    let mut on_poetry = task("p", "Reading", Some(day(2025, 9, 3)), false);
    on_poetry.course_id = "c2".to_string();
    let tasks = vec![
        task("a", "Assignment", Some(day(2025, 8, 20)), false),
        task("m", "Midterm Exam", Some(day(2025, 9, 5)), false),
        task("x", "Quiz", Some(day(2025, 9, 6)), true),
        task("u", "Lab", None, false),
        on_poetry,
    ];

    let events = calendar_events(&tasks, &courses);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].title, "CS101: Task a");
    assert_eq!(events[0].kind, EventKind::Assignment);
    assert_eq!(events[1].kind, EventKind::Exam);
    assert_eq!(events[1].color, EventKind::Exam.color());
    assert_eq!(events[2].title, "Task p");
    assert_eq!(events[2].course_code, None);

    let details = describe_event(&events[1]);
    assert_eq!(details, "EXAM: CS101: Task m\nCourse: CS101\nDate: 2025-09-05");
    assert!(describe_event(&events[2]).contains("Course: Poetry"));
}

#[test]
fn calendar_events_fall_back_to_embedded_course() {
    let mut joined = task("j", "Homework", Some(day(2025, 9, 3)), false);
    joined.course = Some(TaskCourse {
        name: "Linear Algebra".to_string(),
        course_code: Some("MATH221".to_string()),
    });

    let events = calendar_events(&[joined], &[]);
    assert_eq!(events[0].title, "MATH221: Task j");
    assert_eq!(events[0].course_name.as_deref(), Some("Linear Algebra"));
}

#[test]
fn month_grid_is_six_sunday_first_weeks() {
    let tasks: Vec<Task> = (0..4)
        .map(|i| task(&i.to_string(), "Lab", Some(day(2025, 8, 20)), false))
        .collect();
    let events = calendar_events(&tasks, &[]);

    let cells = month_grid(day(2025, 8, 14), day(2025, 8, 14), &events);
    assert_eq!(cells.len(), 42);
    assert_eq!(cells[0].date.weekday(), Weekday::Sun);
    assert_eq!(cells[0].date, day(2025, 7, 27));
    assert!(!cells[0].in_month);

    let in_month: Vec<_> = cells.iter().filter(|c| c.in_month).collect();
    assert_eq!(in_month.len(), 31);
    assert_eq!(cells.iter().filter(|c| c.is_today).count(), 1);

    let busy = cells.iter().find(|c| c.date == day(2025, 8, 20)).unwrap();
    assert_eq!(busy.events.len(), 2);
    assert_eq!(busy.more, 2);
}

#[test]
fn month_navigation_wraps_years() {
    assert_eq!(shift_month(day(2025, 1, 1), -1), day(2024, 12, 1));
    assert_eq!(shift_month(day(2025, 12, 1), 1), day(2026, 1, 1));
    assert_eq!(shift_month(day(2025, 3, 1), 14), day(2026, 5, 1));
    assert_eq!(month_title(day(2025, 8, 1)), "August 2025");
}
