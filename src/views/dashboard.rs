use console::style;

use super::surface;
use crate::api::ApiClient;
use crate::models::{Project, Task, TaskFilter, TaskStatus};
use crate::ui::{error_banner, heading, icons};

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub projects: usize,
    pub tasks: usize,
    pub completed_tasks: usize,
}

impl DashboardStats {
    pub fn from_records(projects: &[Project], tasks: &[Task]) -> Self {
        Self {
            projects: projects.len(),
            tasks: tasks.len(),
            completed_tasks: tasks
                .iter()
                .filter(|task| task.status == TaskStatus::Done)
                .count(),
        }
    }

    /// Percentage of tasks done, rounded to the nearest whole number.
    pub fn completion_rate(&self) -> u32 {
        if self.tasks == 0 {
            return 0;
        }
        (self.completed_tasks as f64 / self.tasks as f64 * 100.0).round() as u32
    }
}

#[derive(Debug)]
pub struct DashboardView {
    stats: DashboardStats,
    loading: bool,
    error: Option<String>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self {
            stats: DashboardStats::default(),
            loading: true,
            error: None,
        }
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch projects and tasks concurrently and recompute the counts.
    pub async fn load(&mut self, api: &ApiClient) {
        self.loading = true;
        let filter = TaskFilter::default();
        let result = tokio::try_join!(api.list_projects(), api.list_tasks(&filter));
        match result {
            Ok((projects, tasks)) => {
                self.stats = DashboardStats::from_records(&projects, &tasks);
                self.error = None;
            }
            Err(e) => self.error = Some(surface("fetching dashboard stats", &e)),
        }
        self.loading = false;
    }

    pub fn render(&self) -> String {
        if self.loading {
            return "Loading dashboard...".to_string();
        }

        let mut out = vec![heading("Dashboard"), String::new()];
        if let Some(error) = &self.error {
            out.push(error_banner(error));
            out.push(String::new());
        }

        let rows = [
            ("Total Projects", self.stats.projects.to_string()),
            ("Total Tasks", self.stats.tasks.to_string()),
            ("Completed Tasks", self.stats.completed_tasks.to_string()),
            (
                "Completion Rate",
                format!("{}%", self.stats.completion_rate()),
            ),
        ];
        for (label, value) in rows {
            out.push(format!(
                "  {}{:<18}{}",
                icons::CHART,
                label,
                style(value).bold()
            ));
        }

        out.push(String::new());
        out.push(format!(
            "Quick actions: {} | {}",
            style("taskdesk projects").cyan(),
            style("taskdesk tasks").cyan()
        ));
        out.join("\n")
    }
}
