//! Screens: each owns ephemeral UI state (records, loading flag, error
//! indicator, form) and renders to text.
//!
//! Failures are caught inside the view, logged, and kept in the view's
//! `error` so a failed call never takes the process down.

pub mod dashboard;
pub mod projects;
pub mod tasks;

pub use dashboard::{DashboardStats, DashboardView};
pub use projects::{ProjectForm, ProjectsView, render_project};
pub use tasks::{TaskForm, TasksView, render_task};

use crate::errors::ClientError;

/// Log a failed view operation and return the text for the error indicator.
pub(crate) fn surface(action: &str, err: &ClientError) -> String {
    tracing::error!(error = %err, "Error {}", action);
    err.user_message()
}

pub(crate) fn format_date(value: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
