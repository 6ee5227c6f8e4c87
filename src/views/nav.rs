use std::borrow::Cow;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    /// `/courses?id=<id>&name=<name>`; both parameters are needed to show a course.
    Courses {
        id: Option<String>,
        name: Option<String>,
    },
    Tasks,
    Calendar,
    Auth,
    Unknown(String),
}

fn decode(value: &str) -> String {
    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .unwrap_or(spaced)
}

impl Route {
    pub fn course(id: impl Into<String>, name: impl Into<String>) -> Self {
        Route::Courses {
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }

    /// Parses a path with an optional query string, e.g. `/courses?id=7&name=Calculus`.
    pub fn parse(target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        match path {
            "/" => Route::Dashboard,
            "/tasks" => Route::Tasks,
            "/calendar" => Route::Calendar,
            "/auth" => Route::Auth,
            "/courses" => {
                let mut id = None;
                let mut name = None;
                for pair in query.split('&').filter(|p| !p.is_empty()) {
                    let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                    let value = Some(decode(value)).filter(|v| !v.is_empty());
                    match key {
                        "id" => id = value,
                        "name" => name = value,
                        _ => {}
                    }
                }
                Route::Courses { id, name }
            }
            other => Route::Unknown(other.to_string()),
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Dashboard => "/".to_string(),
            Route::Tasks => "/tasks".to_string(),
            Route::Calendar => "/calendar".to_string(),
            Route::Auth => "/auth".to_string(),
            Route::Courses { id, name } => {
                let params: Vec<String> = [("id", id), ("name", name)]
                    .into_iter()
                    .filter_map(|(key, value)| {
                        value
                            .as_ref()
                            .map(|v| format!("{}={}", key, urlencoding::encode(v)))
                    })
                    .collect();
                if params.is_empty() {
                    "/courses".to_string()
                } else {
                    format!("/courses?{}", params.join("&"))
                }
            }
            Route::Unknown(path) => path.clone(),
        }
    }

    pub fn section(&self) -> Option<Section> {
        match self {
            Route::Dashboard => Some(Section::Dashboard),
            Route::Courses { .. } => Some(Section::Courses),
            Route::Tasks => Some(Section::Tasks),
            Route::Calendar => Some(Section::Calendar),
            Route::Auth | Route::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    Dashboard,
    Courses,
    Tasks,
    Calendar,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Dashboard,
        Section::Courses,
        Section::Tasks,
        Section::Calendar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Courses => "Courses",
            Section::Tasks => "Tasks",
            Section::Calendar => "Calendar",
        }
    }

    pub fn href(self) -> &'static str {
        match self {
            Section::Dashboard => "/",
            Section::Courses => "/courses",
            Section::Tasks => "/tasks",
            Section::Calendar => "/calendar",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Section::Dashboard => "📊",
            Section::Courses => "📚",
            Section::Tasks => "✅",
            Section::Calendar => "📅",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub section: Section,
    pub label: &'static str,
    pub href: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

/// Sidebar entries with the one for `current` marked active.
pub fn sidebar(current: &Route) -> Vec<NavItem> {
    let active = current.section();
    Section::ALL
        .into_iter()
        .map(|section| NavItem {
            section,
            label: section.label(),
            href: section.href(),
            icon: section.icon(),
            active: active == Some(section),
        })
        .collect()
}
