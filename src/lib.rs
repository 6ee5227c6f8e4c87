//! TermTracker: courses, tasks and deadlines for students.
//!
//! Courses and tasks live in a hosted Postgres behind a REST data API; accounts are
//! handled by the same service's auth API. This crate holds the client side (session
//! tracking, typed data access, page view models and forms) and the small health-check
//! server shipped as the `termtracker` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod memory;
pub mod models;
pub mod repository;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod supabase;
pub mod views;
