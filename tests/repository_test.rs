use chrono::NaiveDate;
use termtracker::error::AppError;
use termtracker::memory::MemoryStore;
use termtracker::models::{NewCourse, NewTask, UpdateCourse, UpdateTask};
use termtracker::repository;
use termtracker::store::{COURSES, TASKS};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_course(name: &str, code: Option<&str>) -> NewCourse {
    NewCourse {
        name: name.to_string(),
        course_code: code.map(str::to_string),
        ..NewCourse::default()
    }
}

fn new_task(course_id: &str, title: &str, due: Option<NaiveDate>) -> NewTask {
    NewTask {
        course_id: course_id.to_string(),
        title: title.to_string(),
        tag: "Assignment".to_string(),
        due_date: due,
    }
}

#[tokio::test]
async fn courses_come_back_in_creation_order() {
    let store = MemoryStore::new();

    let first = repository::add_course(&store, new_course("Intro to CS", Some("CS101")))
        .await
        .expect("Failed to add course");
    repository::add_course(&store, new_course("Poetry", None))
        .await
        .expect("Failed to add course");

    assert!(!first.id.is_empty());
    assert!(first.created_at.is_some());
    assert_eq!(first.code(), Some("CS101"));

    let courses = repository::get_courses(&store).await.expect("Failed to list courses");
    let names: Vec<&str> = courses.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Intro to CS", "Poetry"]);
}

#[tokio::test]
async fn tasks_are_ordered_by_due_date_and_carry_their_course() {
    let store = MemoryStore::new();
    let course = repository::add_course(&store, new_course("Intro to CS", Some("CS101")))
        .await
        .expect("Failed to add course");

    for (title, due) in [
        ("Lab 2", Some(day(2025, 9, 20))),
        ("Reading", None),
        ("Lab 1", Some(day(2025, 9, 5))),
    ] {
        repository::add_task(&store, new_task(&course.id, title, due))
            .await
            .expect("Failed to add task");
    }

    let tasks = repository::get_tasks(&store).await.expect("Failed to list tasks");
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Lab 1", "Lab 2", "Reading"]);

    let first = &tasks[0];
    assert!(!first.completed);
    assert_eq!(first.course_name(), Some("Intro to CS"));
    assert_eq!(
        first.course.as_ref().and_then(|c| c.course_code.as_deref()),
        Some("CS101")
    );
}

#[tokio::test]
async fn course_tasks_only_include_that_course() {
    let store = MemoryStore::new();
    let cs = repository::add_course(&store, new_course("Intro to CS", None))
        .await
        .expect("Failed to add course");
    let math = repository::add_course(&store, new_course("Calculus", None))
        .await
        .expect("Failed to add course");

    repository::add_task(&store, new_task(&cs.id, "Lab 1", Some(day(2025, 9, 5))))
        .await
        .expect("Failed to add task");
    repository::add_task(&store, new_task(&math.id, "Problem Set", Some(day(2025, 9, 1))))
        .await
        .expect("Failed to add task");

    let tasks = repository::get_course_tasks(&store, &cs.id)
        .await
        .expect("Failed to list course tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Lab 1");

    let none = repository::get_course_tasks(&store, "missing")
        .await
        .expect("Failed to list course tasks");
    assert!(none.is_empty());
}

#[tokio::test]
async fn updates_return_the_changed_row() {
    let store = MemoryStore::new();
    let course = repository::add_course(
        &store,
        NewCourse {
            name: "Intro to CS".to_string(),
            professor: Some("Dr. Smith".to_string()),
            ..NewCourse::default()
        },
    )
    .await
    .expect("Failed to add course");

    let updated = repository::update_course(
        &store,
        &course.id,
        UpdateCourse {
            name: Some("Intro to Computer Science".to_string()),
            professor: Some(None),
            ..UpdateCourse::default()
        },
    )
    .await
    .expect("Failed to update course");
    assert_eq!(updated.name, "Intro to Computer Science");
    assert_eq!(updated.professor, None);

    let task = repository::add_task(&store, new_task(&course.id, "Lab 1", None))
        .await
        .expect("Failed to add task");
    let done = repository::update_task(&store, &task.id, UpdateTask::completed(true))
        .await
        .expect("Failed to update task");
    assert!(done.completed);
    assert_eq!(done.title, "Lab 1");
}

#[tokio::test]
async fn updating_a_missing_row_is_not_found() {
    let store = MemoryStore::new();

    let result = repository::update_task(&store, "missing", UpdateTask::completed(true)).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    let result = repository::update_course(&store, "missing", UpdateCourse::default()).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn deleting_a_course_leaves_its_tasks() {
    let store = MemoryStore::new();
    let course = repository::add_course(&store, new_course("Intro to CS", None))
        .await
        .expect("Failed to add course");
    let task = repository::add_task(&store, new_task(&course.id, "Lab 1", None))
        .await
        .expect("Failed to add task");

    repository::delete_course(&store, &course.id)
        .await
        .expect("Failed to delete course");
    assert!(store.is_empty(COURSES));
    assert_eq!(store.len(TASKS), 1);

    let tasks = repository::get_tasks(&store).await.expect("Failed to list tasks");
    assert_eq!(tasks[0].id, task.id);
    assert_eq!(tasks[0].course_name(), None);

    repository::delete_task(&store, &task.id)
        .await
        .expect("Failed to delete task");
    assert!(store.is_empty(TASKS));
}

#[tokio::test]
async fn malformed_rows_fail_to_decode() {
    use serde_json::json;
    use termtracker::store::RemoteStore;

    let store = MemoryStore::new();
    store
        .insert(COURSES, json!({ "title": "no name column" }))
        .await
        .expect("Failed to insert row");

    let result = repository::get_courses(&store).await;
    assert!(matches!(result, Err(AppError::Decode { entity: "course", .. })));
}
