//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module       | Commands handled              |
//! |--------------|-------------------------------|
//! | `session`    | `Login`, `Logout`, `Whoami`   |
//! | `dashboard`  | `Dashboard`                   |
//! | `projects`   | `Projects`                    |
//! | `tasks`      | `Tasks`                       |
//! | `config`     | `Config`                      |
//!
//! Everything except `session` and `config` is a protected route and goes
//! through [`taskdesk::app::App::enter`] first.

pub mod config;
pub mod dashboard;
pub mod projects;
pub mod session;
pub mod tasks;

pub use config::cmd_config;
pub use dashboard::cmd_dashboard;
pub use projects::cmd_projects;
pub use session::{cmd_login, cmd_logout, cmd_whoami};
pub use tasks::cmd_tasks;

/// Ask before deleting unless `--force` was given.
fn confirm_delete(what: &str, force: bool) -> bool {
    if force {
        return true;
    }
    dialoguer::Confirm::new()
        .with_prompt(format!("Delete {}? This cannot be undone.", what))
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Fail the command with the view's error indicator, if it has one.
fn view_result(error: Option<&str>, action: &str) -> anyhow::Result<()> {
    match error {
        Some(message) => anyhow::bail!("Failed to {}: {}", action, message),
        None => Ok(()),
    }
}
