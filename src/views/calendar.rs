use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{Course, Task};
use crate::repository;
use crate::session::SessionContext;
use crate::store::RemoteStore;

use super::derive::{
    self, CalendarEvent, DayCell, EventKind, WEEKDAY_LABELS, calendar_events, describe_event,
};
use super::{Screen, report, signed_in};

/// One month laid out as a grid, shared by the calendar page and the dashboard widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthView {
    pub title: String,
    pub weekdays: [&'static str; 7],
    pub cells: Vec<DayCell>,
}

impl MonthView {
    pub fn build(month: NaiveDate, today: NaiveDate, events: &[CalendarEvent]) -> Self {
        Self {
            title: derive::month_title(month),
            weekdays: WEEKDAY_LABELS,
            cells: derive::month_grid(month, today, events),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub kind: EventKind,
    pub label: &'static str,
    pub color: &'static str,
}

pub fn legend() -> Vec<LegendEntry> {
    EventKind::ALL
        .into_iter()
        .map(|kind| LegendEntry {
            kind,
            label: kind.label(),
            color: kind.color(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarPage {
    pub month: MonthView,
    /// Every event dated inside the displayed month, in date order.
    pub events: Vec<CalendarEvent>,
    pub legend: Vec<LegendEntry>,
    pub loading: bool,
}

pub struct CalendarView {
    store: Arc<dyn RemoteStore>,
    session: SessionContext,
    courses: Vec<Course>,
    tasks: Vec<Task>,
    month: NaiveDate,
    loading: bool,
    alert: Option<String>,
}

impl CalendarView {
    pub fn new(store: Arc<dyn RemoteStore>, session: SessionContext, today: NaiveDate) -> Self {
        Self {
            store,
            session,
            courses: Vec::new(),
            tasks: Vec::new(),
            month: derive::first_of_month(today),
            loading: true,
            alert: None,
        }
    }

    pub async fn load(&mut self) {
        self.loading = true;
        let store = self.store.as_ref();
        match tokio::try_join!(repository::get_tasks(store), repository::get_courses(store)) {
            Ok((tasks, courses)) => {
                self.tasks = tasks;
                self.courses = courses;
            }
            Err(err) => report(&mut self.alert, "load the calendar", &err),
        }
        self.loading = false;
    }

    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn previous_month(&mut self) {
        self.month = derive::shift_month(self.month, -1);
    }

    pub fn next_month(&mut self) {
        self.month = derive::shift_month(self.month, 1);
    }

    pub fn go_to_today(&mut self, today: NaiveDate) {
        self.month = derive::first_of_month(today);
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        calendar_events(&self.tasks, &self.courses)
    }

    /// Detail text for the clicked event.
    pub fn event_details(&self, id: &str) -> Option<String> {
        self.events()
            .iter()
            .find(|e| e.id == id)
            .map(describe_event)
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn render(&self, now: DateTime<Utc>) -> Screen<CalendarPage> {
        if let Err(screen) = signed_in(&self.session) {
            return screen;
        }

        let events = self.events();
        let mut in_month: Vec<CalendarEvent> = events
            .iter()
            .filter(|e| e.date.year() == self.month.year() && e.date.month() == self.month.month())
            .cloned()
            .collect();
        in_month.sort_by_key(|e| e.date);

        Screen::Ready(CalendarPage {
            month: MonthView::build(self.month, now.date_naive(), &events),
            events: in_month,
            legend: legend(),
            loading: self.loading,
        })
    }
}
