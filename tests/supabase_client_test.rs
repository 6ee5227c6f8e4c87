use serde_json::{Value, json};
use termtracker::error::AppError;
use termtracker::models::{AuthEvent, NewCourse, SignUpOutcome};
use termtracker::repository;
use termtracker::store::AuthProvider;
use termtracker::supabase::{SupabaseConfig, SupabaseHttpClient};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON_KEY: &str = "anon-key";

fn client(server: &MockServer) -> SupabaseHttpClient {
    let config = SupabaseConfig::new(format!("{}/", server.uri()), ANON_KEY);
    SupabaseHttpClient::new(config).expect("Failed to build client")
}

fn session_body(access_token: &str, expires_in: i64) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": "refresh-1",
        "token_type": "bearer",
        "expires_in": expires_in,
        "user": {
            "id": "user-1",
            "email": "student@example.com",
            "user_metadata": { "full_name": "Sam Student" }
        }
    })
}

async fn mount_password_grant(server: &MockServer, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", ANON_KEY))
        .and(body_json(json!({
            "email": "student@example.com",
            "password": "hunter22"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("token-1", expires_in)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn sign_in_stores_session_and_authorizes_data_requests() {
    let server = MockServer::start().await;
    mount_password_grant(&server, 3600).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tasks"))
        .and(query_param("select", "*,courses(name,course_code)"))
        .and(query_param("order", "due_date.asc"))
        .and(header("apikey", ANON_KEY))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 7,
                "course_id": 3,
                "title": "Assignment 1",
                "tag": "Assignment",
                "due_date": "2025-09-05",
                "completed": false,
                "courses": { "name": "Intro to CS", "course_code": "CS101" }
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let mut events = client.subscribe();

    let session = client
        .sign_in("student@example.com", "hunter22")
        .await
        .expect("Sign in failed");
    assert_eq!(session.access_token, "token-1");
    assert!(session.expires_at.is_some());
    assert_eq!(session.user.display_name(), "Sam Student");

    let change = events.try_recv().expect("No auth event");
    assert_eq!(change.event, AuthEvent::SignedIn);
    assert_eq!(change.session.map(|s| s.access_token).as_deref(), Some("token-1"));

    let stored = client.get_session().await.expect("Failed to read session");
    assert_eq!(stored.map(|s| s.access_token).as_deref(), Some("token-1"));

    let tasks = repository::get_tasks(&client).await.expect("Failed to list tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "7");
    assert_eq!(tasks[0].course_id, "3");
    assert_eq!(tasks[0].course_name(), Some("Intro to CS"));
}

#[tokio::test]
async fn wrong_password_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let result = client.sign_in("student@example.com", "wrong").await;

    match result {
        Err(AppError::Auth { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid login credentials");
        }
        other => panic!("expected auth error, got {:?}", other),
    }
    assert!(client.get_session().await.expect("Failed to read session").is_none());
}

#[tokio::test]
async fn sign_up_without_session_waits_for_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(query_param("redirect_to", "http://localhost:3000/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-2",
            "email": "new@example.com",
            "email_confirmed_at": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let outcome = client
        .sign_up("new@example.com", "hunter22", None)
        .await
        .expect("Sign up failed");

    match outcome {
        SignUpOutcome::ConfirmationSent(user) => assert_eq!(user.id, "user-2"),
        other => panic!("expected confirmation, got {:?}", other),
    }
    assert!(client.get_session().await.expect("Failed to read session").is_none());
}

#[tokio::test]
async fn insert_asks_for_the_created_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/courses"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!([{ "name": "Intro to CS", "course_code": "CS101" }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "course-1",
            "name": "Intro to CS",
            "course_code": "CS101",
            "professor": null,
            "semester": null,
            "notes": null,
            "created_at": "2025-08-20T10:00:00+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let course = repository::add_course(
        &client,
        NewCourse {
            name: "Intro to CS".to_string(),
            course_code: Some("CS101".to_string()),
            ..NewCourse::default()
        },
    )
    .await
    .expect("Failed to add course");

    assert_eq!(course.id, "course-1");
    assert!(course.created_at.is_some());
}

#[tokio::test]
async fn update_and_delete_filter_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/tasks"))
        .and(query_param("id", "eq.task-1"))
        .and(body_json(json!({ "completed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "task-1",
            "course_id": "course-1",
            "title": "Lab 1",
            "tag": "Lab",
            "due_date": null,
            "completed": true
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/courses"))
        .and(query_param("id", "eq.course-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let task = repository::update_task(
        &client,
        "task-1",
        termtracker::models::UpdateTask::completed(true),
    )
    .await
    .expect("Failed to update task");
    assert!(task.completed);

    repository::delete_course(&client, "course-1")
        .await
        .expect("Failed to delete course");
}

#[tokio::test]
async fn rest_errors_surface_as_store_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/courses"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "42501",
            "message": "permission denied for table courses",
            "details": null,
            "hint": null
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let result = repository::get_courses(&client).await;

    match result {
        Err(AppError::Store { status, code, message }) => {
            assert_eq!(status, 401);
            assert_eq!(code.as_deref(), Some("42501"));
            assert_eq!(message, "permission denied for table courses");
        }
        other => panic!("expected store error, got {:?}", other),
    }
}

#[tokio::test]
async fn expiring_session_is_refreshed() {
    let server = MockServer::start().await;
    mount_password_grant(&server, 5).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({ "refresh_token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("token-2", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .sign_in("student@example.com", "hunter22")
        .await
        .expect("Sign in failed");
    let mut events = client.subscribe();

    let session = client
        .get_session()
        .await
        .expect("Failed to refresh")
        .expect("Session dropped");
    assert_eq!(session.access_token, "token-2");
    assert_eq!(events.try_recv().expect("No auth event").event, AuthEvent::TokenRefreshed);
}

#[tokio::test]
async fn failed_refresh_drops_the_session() {
    let server = MockServer::start().await;
    mount_password_grant(&server, 5).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": "refresh_token_not_found",
            "msg": "Invalid Refresh Token: Refresh Token Not Found"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .sign_in("student@example.com", "hunter22")
        .await
        .expect("Sign in failed");

    assert!(matches!(client.get_session().await, Err(AppError::Auth { .. })));
    assert!(client.get_session().await.expect("Failed to read session").is_none());
}

#[tokio::test]
async fn sign_out_clears_the_session() {
    let server = MockServer::start().await;
    mount_password_grant(&server, 3600).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .sign_in("student@example.com", "hunter22")
        .await
        .expect("Sign in failed");
    let mut events = client.subscribe();

    client.sign_out().await.expect("Sign out failed");
    assert_eq!(events.try_recv().expect("No auth event").event, AuthEvent::SignedOut);
    assert!(client.get_session().await.expect("Failed to read session").is_none());
}

#[tokio::test]
async fn data_requests_refresh_an_expiring_token_first() {
    let server = MockServer::start().await;
    mount_password_grant(&server, 5).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("token-2", 3600)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/courses"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "PGRST301",
            "message": "JWT expired"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/courses"))
        .and(header("Authorization", "Bearer token-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .sign_in("student@example.com", "hunter22")
        .await
        .expect("Sign in failed");
    let mut events = client.subscribe();

    let courses = repository::get_courses(&client)
        .await
        .expect("Failed to list courses");
    assert!(courses.is_empty());
    assert_eq!(events.try_recv().expect("No auth event").event, AuthEvent::TokenRefreshed);

    let stored = client.get_session().await.expect("Failed to read session");
    assert_eq!(stored.map(|s| s.access_token).as_deref(), Some("token-2"));
}
